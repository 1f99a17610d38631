//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::{Asset, Fingerprint, KernsyncConfig, Release, RepoId, SyncError};

// ── Release Source Port ───────────────────────────────────────────────────────

/// Read access to a repository's release feed.
pub trait ReleaseSource {
    /// The release the source itself considers latest.
    ///
    /// # Errors
    ///
    /// [`SyncError::ReleaseNotFound`] if the repository has no releases,
    /// [`SyncError::NetworkFailure`] on transport errors.
    fn latest_release(&self, repo: &RepoId) -> Result<Release, SyncError>;

    /// The release carrying exactly `tag`.
    ///
    /// # Errors
    ///
    /// [`SyncError::ReleaseNotFound`] for unknown tags,
    /// [`SyncError::NetworkFailure`] on transport errors.
    fn release_by_tag(&self, repo: &RepoId, tag: &str) -> Result<Release, SyncError>;

    /// All recent releases, newest first.
    ///
    /// # Errors
    ///
    /// [`SyncError::NetworkFailure`] on transport errors.
    fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>, SyncError>;

    /// Open a byte stream over the asset's content.
    ///
    /// # Errors
    ///
    /// [`SyncError::NetworkFailure`] if the download cannot be started.
    fn download_asset(&self, repo: &RepoId, asset: &Asset)
    -> Result<Box<dyn Read + Send>, SyncError>;
}

// ── Image Store Port ──────────────────────────────────────────────────────────

/// Local storage for kernel images: fingerprinting, staging and adoption.
pub trait ImageStore {
    /// A private, not yet adopted copy of a download. Dropping it discards it.
    type Staged: AsRef<Path>;

    /// Fingerprint the file at `path`; a missing file is [`Fingerprint::Absent`].
    ///
    /// # Errors
    ///
    /// [`SyncError::UnreadableSource`] if the file exists but cannot be read.
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, SyncError>;

    /// Stream `content` into a new staging file inside `dir`.
    ///
    /// `on_progress` receives the running byte count.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnwritableDestination`] for local write failures,
    /// [`SyncError::NetworkFailure`] if reading `content` fails,
    /// [`SyncError::Interrupted`] if the operator cancelled.
    fn stage(
        &self,
        dir: &Path,
        content: &mut dyn Read,
        on_progress: &dyn Fn(u64),
    ) -> Result<(Self::Staged, u64), SyncError>;

    /// Atomically move a staged file to `destination`.
    ///
    /// # Errors
    ///
    /// [`SyncError::UnwritableDestination`] if the rename fails; the staged
    /// file is discarded and `destination` is left as it was.
    /// [`SyncError::Interrupted`] if the operator cancelled after staging.
    fn adopt(&self, staged: Self::Staged, destination: &Path) -> Result<(), SyncError>;
}

// ── Configuration Ports ───────────────────────────────────────────────────────

/// The host's "current kernel" setting (WSL2 `.wslconfig`).
pub trait KernelConfigStore {
    /// Currently configured kernel path; `None` if unset or no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn kernel_path(&self) -> Result<Option<PathBuf>>;

    /// Point the configuration at `path`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    fn set_kernel_path(&self, path: &Path) -> Result<()>;

    /// Location of the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn location(&self) -> Result<PathBuf>;
}

/// Abstracts kernsync settings persistence.
pub trait ConfigStore {
    /// Load settings, returning defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<KernsyncConfig>;

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &KernsyncConfig) -> Result<()>;

    /// Location of the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// A download of `total` bytes (if known) is starting.
    fn download_started(&self, _total: Option<u64>) {}
    /// `bytes` have been received so far.
    fn download_progress(&self, _bytes: u64) {}
    /// The download stream ended, successfully or not.
    fn download_finished(&self) {}
}
