//! Domain types and validators for kernsync settings.
//!
//! Pure functions only. No I/O, no filesystem access.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::release::RepoId;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_REPOSITORY: &str = "nathanchance/WSL2-Linux-Kernel";
pub const DEFAULT_IMAGE_NAME: &str = "bzImage";
/// Download directory under the home directory when nothing else is set.
pub const DEFAULT_KERNEL_DIR: &str = "wsl2-kernels";

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "sync.repository",
    "sync.image_name",
    "sync.directory",
    "sync.tag_image",
    "sync.install",
    "release.allow_prerelease",
];
const BOOL_VALUES: &[&str] = &["true", "false"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level settings stored in `~/.kernsync/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KernsyncConfig {
    pub sync: SyncConfig,
    pub release: ReleaseConfig,
}

/// Defaults for `kernsync sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Release repository, `<owner>/<name>`.
    pub repository: String,
    /// Asset name to download from the release.
    pub image_name: String,
    /// Download directory; `None` derives it from `.wslconfig` or home.
    pub directory: Option<PathBuf>,
    /// Suffix adopted images with the release tag.
    pub tag_image: bool,
    /// Point `.wslconfig` at newly adopted images.
    pub install: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            image_name: DEFAULT_IMAGE_NAME.to_string(),
            directory: None,
            tag_image: true,
            install: false,
        }
    }
}

/// Release selection policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Let "latest" resolve to prereleases.
    pub allow_prerelease: bool,
}

impl KernsyncConfig {
    /// Validate and apply a `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "sync.repository" => self.sync.repository = value.to_string(),
            "sync.image_name" => self.sync.image_name = value.to_string(),
            "sync.directory" => {
                self.sync.directory = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "sync.tag_image" => self.sync.tag_image = value == "true",
            "sync.install" => self.sync.install = value == "true",
            "release.allow_prerelease" => self.release.allow_prerelease = value == "true",
            _ => unknown_key(key)?,
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> Result<()> {
    Err(ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
    .into())
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return unknown_key(key);
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| -> Result<()> {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid: valid.to_string(),
        }
        .into())
    };
    match key {
        "sync.tag_image" | "sync.install" | "release.allow_prerelease"
            if !BOOL_VALUES.contains(&value) =>
        {
            invalid(&BOOL_VALUES.join(", "))
        }
        "sync.repository" if RepoId::parse(value).is_err() => invalid("<owner>/<name>"),
        "sync.image_name" if !is_valid_image_name(value) => {
            invalid("a non-empty file name without path separators")
        }
        _ => Ok(()),
    }
}

fn is_valid_image_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

// ── Unit tests ───────────────────────────────────────────────────────────────
