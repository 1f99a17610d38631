//! Filesystem infrastructure: implements `ImageStore` on the local disk.
//!
//! Downloads are staged in a hidden sibling of the destination so adoption is
//! a same-directory rename, which never crosses a filesystem boundary.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::ports::ImageStore;
use crate::domain::{Fingerprint, SyncError};

const STAGING_PREFIX: &str = ".kernsync-";
const STAGING_SUFFIX: &str = ".partial";
const CHUNK_SIZE: usize = 64 * 1024;

// ── Interrupt handling ───────────────────────────────────────────────────────

/// Ctrl-C state shared between the signal handler and [`LocalFs`].
///
/// While any staged file exists, Ctrl-C only raises a flag; the store then
/// stops at its next checkpoint and the staged file is removed on drop.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<InterruptState>);

#[derive(Debug, Default)]
struct InterruptState {
    staged: AtomicUsize,
    requested: AtomicBool,
}

impl Interrupt {
    /// Record a Ctrl-C.
    ///
    /// Returns `false` when nothing is staged, in which case the caller may
    /// exit on the spot.
    #[must_use]
    pub fn request(&self) -> bool {
        if self.0.staged.load(Ordering::SeqCst) == 0 {
            return false;
        }
        self.0.requested.store(true, Ordering::SeqCst);
        true
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.requested.load(Ordering::SeqCst)
    }

    fn hold(&self) -> StagingHold {
        self.0.staged.fetch_add(1, Ordering::SeqCst);
        StagingHold(self.clone())
    }
}

/// Install the Ctrl-C handler.
///
/// While a staged file exists Ctrl-C cancels cooperatively so the file is
/// removed; at any other time it exits immediately with status 130.
///
/// # Errors
///
/// Returns an error if a handler is already installed.
pub fn install_interrupt_handler(interrupt: Interrupt) -> Result<()> {
    ctrlc::set_handler(move || {
        if !interrupt.request() {
            std::process::exit(130);
        }
    })
    .context("installing Ctrl-C handler")
}

#[derive(Debug)]
struct StagingHold(Interrupt);

impl Drop for StagingHold {
    fn drop(&mut self) {
        (self.0).0.staged.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A download that has been written to disk but not adopted yet.
///
/// Dropping it deletes the file. Ctrl-C stays cooperative for its lifetime.
#[derive(Debug)]
pub struct StagedImage {
    // Field order matters: the file is removed before the hold is released.
    file: NamedTempFile,
    _hold: StagingHold,
}

impl AsRef<Path> for StagedImage {
    fn as_ref(&self) -> &Path {
        self.file.path()
    }
}

// ── LocalFs ──────────────────────────────────────────────────────────────────

/// Production filesystem implementation of `ImageStore`.
#[derive(Debug, Clone, Default)]
pub struct LocalFs {
    interrupt: Interrupt,
}

impl LocalFs {
    #[must_use]
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }
}

impl ImageStore for LocalFs {
    type Staged = StagedImage;

    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, SyncError> {
        fingerprint_file(path)
    }

    fn stage(
        &self,
        dir: &Path,
        content: &mut dyn Read,
        on_progress: &dyn Fn(u64),
    ) -> Result<(StagedImage, u64), SyncError> {
        std::fs::create_dir_all(dir).map_err(|e| unwritable(dir, e))?;
        let hold = self.interrupt.hold();
        let mut file = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| unwritable(dir, e))?;
        debug!(staging = %file.path().display(), "created staging file");

        let path = file.path().to_path_buf();
        let bytes = copy_stream(content, file.as_file_mut(), &path, on_progress, &|| {
            self.interrupt.is_requested()
        })?;
        file.as_file()
            .sync_all()
            .map_err(|e| unwritable(&path, e))?;
        Ok((StagedImage { file, _hold: hold }, bytes))
    }

    fn adopt(&self, staged: StagedImage, destination: &Path) -> Result<(), SyncError> {
        if self.interrupt.is_requested() {
            return Err(SyncError::Interrupted);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| unwritable(staged.file.path(), e))?;
        }
        staged
            .file
            .persist(destination)
            .map_err(|e| unwritable(destination, e.error))?;
        sync_parent_dir(destination);
        Ok(())
    }
}

/// Fingerprint a file by streaming it through SHA-256.
///
/// # Errors
///
/// Returns [`SyncError::UnreadableSource`] if the path exists but cannot be
/// opened or read. A missing path is [`Fingerprint::Absent`], not an error.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, SyncError> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Fingerprint::Absent),
        Err(e) => return Err(unreadable(path, e)),
    };
    Fingerprint::from_reader(&mut file).map_err(|e| unreadable(path, e))
}

fn copy_stream(
    content: &mut dyn Read,
    out: &mut File,
    out_path: &Path,
    on_progress: &dyn Fn(u64),
    cancelled: &dyn Fn() -> bool,
) -> Result<u64, SyncError> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        if cancelled() {
            return Err(SyncError::Interrupted);
        }
        let n = match content.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SyncError::network("reading download stream", e)),
        };
        out.write_all(&buf[..n])
            .map_err(|e| unwritable(out_path, e))?;
        total += n as u64;
        on_progress(total);
    }
    out.flush().map_err(|e| unwritable(out_path, e))?;
    Ok(total)
}

fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        if let Some(parent) = path.parent() {
            if let Err(e) = File::open(parent).and_then(|d| d.sync_all()) {
                debug!(dir = %parent.display(), error = %e, "could not sync directory");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

fn unreadable(path: &Path, source: io::Error) -> SyncError {
    SyncError::UnreadableSource {
        path: path.to_path_buf(),
        source,
    }
}

fn unwritable(path: &Path, source: io::Error) -> SyncError {
    SyncError::UnwritableDestination {
        path: path.to_path_buf(),
        source,
    }
}
