//! Application service: configuration use-cases.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, KernelConfigStore};
use crate::domain::KernsyncConfig;
use crate::domain::config::DEFAULT_KERNEL_DIR;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the settings file exists but is unreadable.
pub fn load_config(store: &impl ConfigStore) -> Result<KernsyncConfig> {
    store.load()
}

/// Validate, apply and save a single `key = value` setting.
///
/// # Errors
///
/// Returns an error if the key or value is invalid or saving fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<KernsyncConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}

/// Pick the download directory.
///
/// Explicit directory, then the settings file, then the directory of the
/// kernel currently configured for WSL, then `<home>/wsl2-kernels`.
///
/// # Errors
///
/// Returns an error if the kernel config cannot be read or, when falling
/// back to the default, the home directory is unknown.
pub fn download_directory(
    explicit: Option<PathBuf>,
    config: &KernsyncConfig,
    kernel_config: &impl KernelConfigStore,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit.or_else(|| config.sync.directory.clone()) {
        return Ok(dir);
    }
    let configured_parent = kernel_config
        .kernel_path()?
        .and_then(|p| p.parent().map(PathBuf::from))
        .filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = configured_parent {
        return Ok(dir);
    }
    let home = home.context("cannot determine home directory")?;
    Ok(home.join(DEFAULT_KERNEL_DIR))
}
