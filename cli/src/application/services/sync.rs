//! Application service: the kernel image sync use-case.
//!
//! Imports only from `crate::domain`, `crate::application::ports` and sibling
//! services. All I/O is routed through injected port traits.
//!
//! The flow is strictly sequential: inspect local image, resolve, download
//! into staging, fingerprint, decide, adopt, then optionally persist the new
//! path. Image adoption and config persistence are separate steps; a failed
//! config write is reported, never rolled back.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::application::ports::{ImageStore, KernelConfigStore, ProgressReporter, ReleaseSource};
use crate::application::services::resolve::{Resolved, resolve};
use crate::domain::sync::{decide, destination_path};
use crate::domain::{
    ConfigUpdate, Fingerprint, PrereleasePolicy, ReleaseSelector, RepoId, SyncDecision,
    SyncError, SyncOutcome, SyncReport,
};

// ── Public types ──────────────────────────────────────────────────────────────

/// Policy switches for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Suffix the adopted image with the release tag.
    pub tag_image: bool,
    /// Write the adopted path into the kernel config.
    pub install: bool,
    /// What "latest" may resolve to.
    pub prerelease: PrereleasePolicy,
}

/// Everything `sync` needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Parsed before any I/O.
    pub repository: RepoId,
    pub selector: ReleaseSelector,
    /// Exact asset name to look for in the release.
    pub asset_name: String,
    /// Currently installed image, if any.
    pub local_image: Option<PathBuf>,
    /// Directory receiving the staging file and the adopted image.
    pub directory: PathBuf,
    pub options: SyncOptions,
}

// ── Local image ───────────────────────────────────────────────────────────────

/// The installed image and its fingerprint, computed at most once per path.
struct LocalImage {
    path: Option<PathBuf>,
    cached: Option<Fingerprint>,
}

impl LocalImage {
    fn new(path: Option<PathBuf>) -> Self {
        Self { path, cached: None }
    }

    fn fingerprint(&mut self, store: &impl ImageStore) -> Result<Fingerprint, SyncError> {
        if let Some(fp) = self.cached {
            return Ok(fp);
        }
        let fp = match &self.path {
            Some(path) => store.fingerprint(path)?,
            None => Fingerprint::Absent,
        };
        self.cached = Some(fp);
        Ok(fp)
    }

    /// The image now lives at `path`; any cached fingerprint is stale.
    fn replaced_by(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.cached = None;
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// Bring the local kernel image in line with the selected release.
///
/// # Errors
///
/// Any [`SyncError`] except `ConfigPersistFailure`, which is reported through
/// [`SyncReport::config`] instead because the image has already been adopted
/// at that point.
pub fn sync(
    source: &impl ReleaseSource,
    store: &impl ImageStore,
    kernel_config: &impl KernelConfigStore,
    reporter: &impl ProgressReporter,
    request: &SyncRequest,
) -> Result<SyncReport, SyncError> {
    let repo = &request.repository;

    let mut local = LocalImage::new(request.local_image.clone());
    let local_fp = local.fingerprint(store)?;
    if let Some(path) = &request.local_image {
        reporter.step(&format!("local kernel {} digest: {local_fp}", path.display()));
    }
    debug!(local = %local_fp, "inspected local image");

    let Resolved { release, asset } = resolve(
        source,
        repo,
        &request.selector,
        &request.asset_name,
        request.options.prerelease,
    )?;

    reporter.step(&format!("downloading {} from {repo} ({})", asset.name, release.tag));
    let (staged, bytes) = download(source, store, reporter, repo, &asset, &request.directory)?;
    let remote_fp = store.fingerprint(staged.as_ref())?;
    reporter.step(&format!("remote kernel tagged {} digest: {remote_fp}", release.tag));
    debug!(staging = %staged.as_ref().display(), bytes, remote = %remote_fp, "staged download");

    let destination = destination_path(
        &request.directory,
        &asset.name,
        &release.tag,
        request.options.tag_image,
    );

    let (outcome, config) = match decide(local_fp, remote_fp, destination, &release.tag) {
        SyncDecision::NoOpIdentical => {
            info!(tag = %release.tag, "local image already current");
            reporter.success(&format!(
                "latest release already in {}",
                request.directory.display()
            ));
            (SyncOutcome::Identical, ConfigUpdate::NotRequested)
        }
        SyncDecision::Adopt { destination, tag } => {
            reporter.step(&format!(
                "digests differ, copying new kernel to {}",
                destination.display()
            ));
            store.adopt(staged, &destination)?;
            local.replaced_by(destination.clone());
            verify_adopted(&mut local, store, remote_fp, &destination)?;
            info!(tag = %tag, destination = %destination.display(), "adopted kernel image");
            reporter.success(&format!("kernel {tag} installed at {}", destination.display()));

            let config = if request.options.install {
                persist_kernel_path(kernel_config, reporter, &destination)
            } else {
                ConfigUpdate::NotRequested
            };
            (SyncOutcome::Adopted { destination }, config)
        }
    };

    Ok(SyncReport {
        repository: repo.to_string(),
        release_tag: release.tag,
        asset: asset.name,
        local_path: request.local_image.clone(),
        local: local_fp,
        remote: remote_fp,
        bytes,
        outcome,
        config,
    })
}

fn download<S: ImageStore>(
    source: &impl ReleaseSource,
    store: &S,
    reporter: &impl ProgressReporter,
    repo: &RepoId,
    asset: &crate::domain::Asset,
    dir: &Path,
) -> Result<(S::Staged, u64), SyncError> {
    let mut stream = source.download_asset(repo, asset)?;
    reporter.download_started((asset.size > 0).then_some(asset.size));
    let staged = store.stage(dir, &mut stream, &|n| reporter.download_progress(n));
    reporter.download_finished();
    // The store only sees a byte stream; name the remote call here.
    staged.map_err(|e| match e {
        SyncError::NetworkFailure { source, .. } => SyncError::network(
            format!("GET asset {} ({}) of {repo}", asset.name, asset.release_tag),
            source,
        ),
        other => other,
    })
}

fn verify_adopted(
    local: &mut LocalImage,
    store: &impl ImageStore,
    expected: Fingerprint,
    destination: &Path,
) -> Result<(), SyncError> {
    let installed = local.fingerprint(store)?;
    if installed == expected {
        return Ok(());
    }
    Err(SyncError::UnwritableDestination {
        path: destination.to_path_buf(),
        source: std::io::Error::other(format!(
            "content changed while adopting: expected {expected}, found {installed}"
        )),
    })
}

fn persist_kernel_path(
    kernel_config: &impl KernelConfigStore,
    reporter: &impl ProgressReporter,
    destination: &Path,
) -> ConfigUpdate {
    let path = kernel_config
        .location()
        .unwrap_or_else(|_| PathBuf::from(".wslconfig"));
    match kernel_config.set_kernel_path(destination) {
        Ok(()) => {
            reporter.success("WSL configured to use new kernel (requires a WSL restart)");
            ConfigUpdate::Updated { path }
        }
        Err(e) => {
            warn!(config = %path.display(), error = %format!("{e:#}"), "kernel config not updated");
            reporter.warn(&format!("could not update {}: {e:#}", path.display()));
            ConfigUpdate::Failed {
                path,
                message: format!("{e:#}"),
            }
        }
    }
}
