//! Shared fake infrastructure for unit tests.
//!
//! Provides an in-memory [`ReleaseSource`], kernel config store and progress
//! reporters so each test file doesn't have to re-define the same boilerplate.

#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{TimeZone, Utc};
use kernsync_cli::application::ports::{KernelConfigStore, ProgressReporter, ReleaseSource};
use kernsync_cli::domain::{Asset, Release, RepoId, SyncError};

// ── Release source ───────────────────────────────────────────────────────────

/// Release feed held in memory. Counts every call so tests can assert that
/// nothing was fetched.
#[derive(Default)]
pub struct FakeReleaseSource {
    releases: Vec<Release>,
    contents: HashMap<u64, Vec<u8>>,
    latest: Option<String>,
    break_downloads: bool,
    next_id: Cell<u64>,
    pub metadata_calls: Cell<usize>,
    pub downloads: Cell<usize>,
}

impl FakeReleaseSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a published release on 2024-01-`day` carrying `assets`.
    #[must_use]
    pub fn with_release(self, tag: &str, day: u32, assets: &[(&str, &[u8])]) -> Self {
        self.push(tag, Some(day), false, false, assets)
    }

    #[must_use]
    pub fn with_prerelease(self, tag: &str, day: u32, assets: &[(&str, &[u8])]) -> Self {
        self.push(tag, Some(day), false, true, assets)
    }

    #[must_use]
    pub fn with_draft(self, tag: &str, assets: &[(&str, &[u8])]) -> Self {
        self.push(tag, None, true, false, assets)
    }

    /// Make `latest_release` return `tag` regardless of flags.
    #[must_use]
    pub fn latest_is(mut self, tag: &str) -> Self {
        self.latest = Some(tag.to_string());
        self
    }

    /// Download streams fail after delivering half of the content.
    #[must_use]
    pub fn breaking_downloads(mut self) -> Self {
        self.break_downloads = true;
        self
    }

    fn push(
        mut self,
        tag: &str,
        day: Option<u32>,
        draft: bool,
        prerelease: bool,
        assets: &[(&str, &[u8])],
    ) -> Self {
        let assets = assets
            .iter()
            .map(|(name, bytes)| {
                let id = self.next_id.get() + 1;
                self.next_id.set(id);
                self.contents.insert(id, bytes.to_vec());
                Asset {
                    id,
                    name: (*name).to_string(),
                    size: bytes.len() as u64,
                    download_url: format!("https://example.invalid/{tag}/{name}"),
                    release_tag: tag.to_string(),
                }
            })
            .collect();
        self.releases.push(Release {
            tag: tag.to_string(),
            draft,
            prerelease,
            published_at: day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()),
            body: String::new(),
            assets,
        });
        self
    }

    fn newest_first(&self) -> Vec<Release> {
        let mut releases = self.releases.clone();
        releases.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        releases
    }

    fn not_found(repo: &RepoId, tag: &str) -> SyncError {
        SyncError::ReleaseNotFound {
            repository: repo.to_string(),
            tag: tag.to_string(),
        }
    }
}

impl ReleaseSource for FakeReleaseSource {
    fn latest_release(&self, repo: &RepoId) -> Result<Release, SyncError> {
        self.metadata_calls.set(self.metadata_calls.get() + 1);
        let releases = self.newest_first();
        let found = match &self.latest {
            Some(tag) => releases.into_iter().find(|r| &r.tag == tag),
            None => releases.into_iter().find(Release::is_stable),
        };
        found.ok_or_else(|| Self::not_found(repo, "latest"))
    }

    fn release_by_tag(&self, repo: &RepoId, tag: &str) -> Result<Release, SyncError> {
        self.metadata_calls.set(self.metadata_calls.get() + 1);
        self.releases
            .iter()
            .find(|r| r.tag == tag)
            .cloned()
            .ok_or_else(|| Self::not_found(repo, tag))
    }

    fn list_releases(&self, _repo: &RepoId) -> Result<Vec<Release>, SyncError> {
        self.metadata_calls.set(self.metadata_calls.get() + 1);
        Ok(self.newest_first())
    }

    fn download_asset(
        &self,
        _repo: &RepoId,
        asset: &Asset,
    ) -> Result<Box<dyn Read + Send>, SyncError> {
        self.downloads.set(self.downloads.get() + 1);
        let bytes = self
            .contents
            .get(&asset.id)
            .cloned()
            .ok_or_else(|| SyncError::network("GET asset", "no such asset id"))?;
        if self.break_downloads {
            let half = bytes[..bytes.len() / 2].to_vec();
            return Ok(Box::new(BreakingReader(Cursor::new(half))));
        }
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// Yields its content, then fails like a dropped connection.
struct BreakingReader(Cursor<Vec<u8>>);

impl Read for BreakingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
            n => Ok(n),
        }
    }
}

// ── Kernel config ────────────────────────────────────────────────────────────

/// In-memory `.wslconfig` kernel setting.
#[derive(Default)]
pub struct MemoryKernelConfig {
    pub kernel: RefCell<Option<PathBuf>>,
    pub fail_writes: bool,
}

impl MemoryKernelConfig {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

impl KernelConfigStore for MemoryKernelConfig {
    fn kernel_path(&self) -> Result<Option<PathBuf>> {
        Ok(self.kernel.borrow().clone())
    }

    fn set_kernel_path(&self, path: &Path) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("permission denied");
        }
        *self.kernel.borrow_mut() = Some(path.to_path_buf());
        Ok(())
    }

    fn location(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/mem/.wslconfig"))
    }
}

// ── Reporters ────────────────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

/// Records every message for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: RefCell<Vec<String>>,
    pub downloaded: Cell<u64>,
}

impl RecordingReporter {
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(needle))
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
    fn success(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(format!("warn: {message}"));
    }
    fn download_progress(&self, bytes: u64) {
        self.downloaded.set(bytes);
    }
}

// ── Filesystem helpers ───────────────────────────────────────────────────────

/// Names of all entries in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
