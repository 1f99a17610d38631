//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::net`. `SyncError` converts to
//! `anyhow::Error` via the `?` operator at the command layer.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed transport cause carried by [`SyncError::NetworkFailure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ── Sync errors ───────────────────────────────────────────────────────────────

/// Everything that can end a resolve, list or sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid repository '{0}': expected <owner>/<name>")]
    InvalidRepository(String),

    #[error("Release '{tag}' not found in {repository}")]
    ReleaseNotFound { repository: String, tag: String },

    #[error("Release '{tag}' of {repository} was rejected: {reason}")]
    ReleaseRejected {
        repository: String,
        tag: String,
        reason: String,
    },

    #[error("Asset '{asset}' not found in release {tag} of {repository} (available: {available})")]
    AssetNotFound {
        asset: String,
        repository: String,
        tag: String,
        available: String,
    },

    #[error("{call} failed: {source}")]
    NetworkFailure {
        call: String,
        #[source]
        source: BoxError,
    },

    #[error("Cannot read {}: {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", path.display())]
    UnwritableDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Kernel image adopted, but updating {} failed: {message}", path.display())]
    ConfigPersistFailure { path: PathBuf, message: String },

    #[error("Download interrupted. No changes were made.")]
    Interrupted,
}

impl SyncError {
    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRepository(_) => "INVALID_REPOSITORY",
            Self::ReleaseNotFound { .. } => "RELEASE_NOT_FOUND",
            Self::ReleaseRejected { .. } => "RELEASE_REJECTED",
            Self::AssetNotFound { .. } => "ASSET_NOT_FOUND",
            Self::NetworkFailure { .. } => "NETWORK_FAILURE",
            Self::UnreadableSource { .. } => "UNREADABLE_SOURCE",
            Self::UnwritableDestination { .. } => "UNWRITABLE_DESTINATION",
            Self::ConfigPersistFailure { .. } => "CONFIG_PERSIST_FAILURE",
            Self::Interrupted => "INTERRUPTED",
        }
    }

    /// Wrap a transport-level cause, naming the remote call that failed.
    pub fn network(call: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::NetworkFailure {
            call: call.into(),
            source: source.into(),
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
