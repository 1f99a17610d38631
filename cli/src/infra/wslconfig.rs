//! Infrastructure implementation of the `KernelConfigStore` port for WSL2.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::KernelConfigStore;
use crate::domain::wslconfig::{KERNEL_KEY, WSL2_SECTION, read_value, upsert_value};

/// `.wslconfig` in the user's home directory, or `KERNSYNC_WSLCONFIG`.
#[derive(Debug, Clone, Default)]
pub struct WslConfigStore {
    path: Option<PathBuf>,
}

impl WslConfigStore {
    /// A store backed by an explicit file, ignoring the environment.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn read(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }
}

impl KernelConfigStore for WslConfigStore {
    fn kernel_path(&self) -> Result<Option<PathBuf>> {
        let path = self.location()?;
        let Some(text) = self.read(&path)? else {
            return Ok(None);
        };
        Ok(read_value(&text, WSL2_SECTION, KERNEL_KEY).map(PathBuf::from))
    }

    fn set_kernel_path(&self, kernel: &Path) -> Result<()> {
        let path = self.location()?;
        let current = self.read(&path)?.unwrap_or_default();
        let updated = upsert_value(
            &current,
            WSL2_SECTION,
            KERNEL_KEY,
            &kernel.to_string_lossy(),
        );
        // Same-directory rename so WSL never sees a half-written file.
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::Builder::new()
            .prefix(".wslconfig-")
            .tempfile_in(dir)
            .with_context(|| format!("cannot write {}", path.display()))?;
        std::io::Write::write_all(&mut staged, updated.as_bytes())
            .with_context(|| format!("cannot write {}", path.display()))?;
        staged
            .persist(&path)
            .with_context(|| format!("cannot replace {}", path.display()))?;
        debug!(config = %path.display(), kernel = %kernel.display(), "updated kernel path");
        Ok(())
    }

    fn location(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var("KERNSYNC_WSLCONFIG") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".wslconfig"))
    }
}
