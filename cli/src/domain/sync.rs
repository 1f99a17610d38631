//! Sync decision, destination naming and the report produced by a run.
//!
//! Pure functions only. No I/O.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::fingerprint::Fingerprint;

/// What a run decided to do after comparing fingerprints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    /// Move the downloaded image to `destination`.
    Adopt { destination: PathBuf, tag: String },
    /// Local and remote content are identical.
    NoOpIdentical,
}

/// Compare fingerprints and decide.
///
/// `Absent` local state never matches, so a missing image is always adopted.
#[must_use]
pub fn decide(local: Fingerprint, remote: Fingerprint, destination: PathBuf, tag: &str) -> SyncDecision {
    if !local.is_absent() && local == remote {
        SyncDecision::NoOpIdentical
    } else {
        SyncDecision::Adopt {
            destination,
            tag: tag.to_string(),
        }
    }
}

/// Destination path for an adopted image.
///
/// `<dir>/<asset_name>`, suffixed with `.<tag>` when `tag_image` is set.
/// Path separators in the tag are replaced so the image always lands
/// directly inside `dir`.
#[must_use]
pub fn destination_path(dir: &Path, asset_name: &str, tag: &str, tag_image: bool) -> PathBuf {
    if tag_image {
        let safe_tag: String = tag
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
            .collect();
        dir.join(format!("{asset_name}.{safe_tag}"))
    } else {
        dir.join(asset_name)
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Terminal action of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The new image was moved into place.
    Adopted { destination: PathBuf },
    /// Nothing changed.
    Identical,
}

/// Result of the optional `.wslconfig` update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfigUpdate {
    /// Install was not requested, or nothing was adopted.
    NotRequested,
    /// The kernel path was written to `path`.
    Updated { path: PathBuf },
    /// Writing failed; the adopted image stays in place.
    Failed { path: PathBuf, message: String },
}

/// Everything a sync run did, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub repository: String,
    pub release_tag: String,
    pub asset: String,
    pub local_path: Option<PathBuf>,
    pub local: Fingerprint,
    pub remote: Fingerprint,
    /// Bytes downloaded into staging.
    pub bytes: u64,
    pub outcome: SyncOutcome,
    pub config: ConfigUpdate,
}
