//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed JSON document
//! to stdout, including failures.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{KernsyncConfig, ReleaseSummary, SyncReport};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen in
/// practice: `serde_json` only fails on non-finite floats and maps with
/// non-string keys, neither of which appear here).
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders domain types as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Render the outcome of `kernsync sync`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_sync_report(report: &SyncReport) -> Result<()> {
        print_json(report)
    }

    /// Render `kernsync list`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_releases(repository: &str, releases: &[ReleaseSummary]) -> Result<()> {
        print_json(&serde_json::json!({
            "repository": repository,
            "releases": releases,
        }))
    }

    /// Render `kernsync config show`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(config: &KernsyncConfig, path: &Path) -> Result<()> {
        print_json(&serde_json::json!({
            "path": path,
            "config": config,
        }))
    }

    /// Render `kernsync version`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(version: &str) -> Result<()> {
        print_json(&serde_json::json!({ "version": version }))
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
