//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::domain::{ConfigUpdate, KernsyncConfig, ReleaseSummary, SyncOutcome, SyncReport};
use crate::output::OutputContext;

/// Environment variables shown by `kernsync config show`.
const CONFIG_ENV_VARS: &[&str] = &[
    "KERNSYNC_CONFIG",
    "KERNSYNC_WSLCONFIG",
    "KERNSYNC_GITHUB_API_URL",
    "NO_COLOR",
];

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("kernsync {version}");
    }

    /// Render the summary of a sync run.
    pub fn render_sync_report(&self, report: &SyncReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.kv(
            "Release:   ",
            &format!("{} ({})", report.release_tag, report.repository),
        );
        let local = match &report.local_path {
            Some(path) => format!("{} ({})", report.local, path.display()),
            None => report.local.to_string(),
        };
        self.ctx.kv("Local:     ", &local);
        self.ctx.kv("Remote:    ", &report.remote.to_string());
        let action = match &report.outcome {
            SyncOutcome::Adopted { destination } => format!("installed {}", destination.display()),
            SyncOutcome::Identical => "already up to date".to_string(),
        };
        self.ctx.kv("Action:    ", &action);
        let config = match &report.config {
            ConfigUpdate::NotRequested => "unchanged".to_string(),
            ConfigUpdate::Updated { path } => format!("updated {}", path.display()),
            ConfigUpdate::Failed { path, .. } => format!(
                "{} {}",
                "not updated".style(self.ctx.styles.error),
                path.display()
            ),
        };
        self.ctx.kv("WSL config:", &config);
    }

    /// Render the release listing, one line per release.
    pub fn render_releases(&self, repository: &str, releases: &[ReleaseSummary]) {
        if releases.is_empty() {
            self.ctx.info(&format!("No releases found in {repository}"));
            return;
        }
        for release in releases {
            println!(
                "release {} published {} (draft: {}, pre-release: {})",
                release.tag.style(self.ctx.styles.bold),
                release.published_date(),
                release.draft,
                release.prerelease
            );
        }
    }

    /// Render the current kernsync configuration.
    pub fn render_config(&self, config: &KernsyncConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let directory = config
            .sync
            .directory
            .as_ref()
            .map_or_else(|| "(auto)".to_string(), |d| d.display().to_string());
        println!("  {:<26} {}", "sync.repository:", config.sync.repository);
        println!("  {:<26} {}", "sync.image_name:", config.sync.image_name);
        println!("  {:<26} {directory}", "sync.directory:");
        println!("  {:<26} {}", "sync.tag_image:", config.sync.tag_image);
        println!("  {:<26} {}", "sync.install:", config.sync.install);
        println!(
            "  {:<26} {}",
            "release.allow_prerelease:", config.release.allow_prerelease
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in CONFIG_ENV_VARS {
            println!(
                "    {:<26} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        let token = if std::env::var("GITHUB_TOKEN").is_ok_and(|t| !t.is_empty()) {
            "(set)"
        } else {
            "(not set)"
        };
        println!("    {:<26} {token}", "GITHUB_TOKEN:");
        println!();
    }
}
