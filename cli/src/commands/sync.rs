//! `kernsync sync`: bring the local kernel image up to date.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::KernelConfigStore;
use crate::application::services::config_service;
use crate::application::services::sync::{self, SyncOptions, SyncRequest};
use crate::domain::{ConfigUpdate, KernsyncConfig, PrereleasePolicy, ReleaseSelector, RepoId, SyncError};
use crate::infra::fs::LocalFs;
use crate::infra::github::GithubReleaseSource;

/// Arguments for the sync command.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Release repository, <owner>/<name>
    #[arg(long, value_name = "OWNER/NAME", env = "KERNSYNC_REPOSITORY")]
    pub repo: Option<String>,

    /// Directory for downloaded kernels
    #[arg(long, value_name = "PATH", env = "KERNSYNC_DIR")]
    pub dir: Option<PathBuf>,

    /// Release asset to download
    #[arg(long, value_name = "NAME", env = "KERNSYNC_IMAGE_NAME")]
    pub image_name: Option<String>,

    /// Release tag to install [default: latest]
    #[arg(long)]
    pub tag: Option<String>,

    /// Suffix the installed image with the release tag
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub tag_image: Option<bool>,

    /// Point .wslconfig at the new kernel
    #[arg(long)]
    pub install: bool,

    /// Kernel image to compare against [default: kernel in .wslconfig]
    #[arg(long, value_name = "PATH")]
    pub local: Option<PathBuf>,

    /// Let "latest" resolve to prereleases
    #[arg(long)]
    pub allow_prerelease: bool,
}

impl SyncArgs {
    /// The repository flag, else the configured one; parsed before any I/O.
    fn repository(&self, config: &KernsyncConfig) -> Result<RepoId, SyncError> {
        RepoId::parse(self.repo.as_deref().unwrap_or(&config.sync.repository))
    }

    /// Merge flags over the settings file.
    fn into_request(
        self,
        config: &KernsyncConfig,
        repository: RepoId,
        local_image: Option<PathBuf>,
        directory: PathBuf,
    ) -> SyncRequest {
        SyncRequest {
            repository,
            selector: ReleaseSelector::parse(self.tag.as_deref()),
            asset_name: self
                .image_name
                .unwrap_or_else(|| config.sync.image_name.clone()),
            local_image,
            directory,
            options: SyncOptions {
                tag_image: self.tag_image.unwrap_or(config.sync.tag_image),
                install: self.install || config.sync.install,
                prerelease: PrereleasePolicy::from_allow(
                    self.allow_prerelease || config.release.allow_prerelease,
                ),
            },
        }
    }
}

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if resolution, download or adoption fails.
pub fn run(app: &AppContext, args: SyncArgs) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let repository = args.repository(&config)?;

    let local_image = match args.local.clone() {
        Some(path) => Some(path),
        None => app.kernel_config.kernel_path()?,
    };
    let directory = config_service::download_directory(
        args.dir.clone(),
        &config,
        &app.kernel_config,
        dirs::home_dir(),
    )?;
    let request = args.into_request(&config, repository, local_image, directory);

    let source = GithubReleaseSource::from_env();
    let reporter = app.reporter();
    let store = LocalFs::new(app.interrupt.clone());
    let report = sync::sync(&source, &store, &app.kernel_config, &reporter, &request)?;
    app.renderer().render_sync_report(&report)?;

    if let ConfigUpdate::Failed { path, message } = report.config {
        let err = SyncError::ConfigPersistFailure { path, message };
        if !app.is_json() {
            app.output.error(&err.to_string());
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
