//! `kernsync list`: show the releases of a repository.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{config_service, resolve};
use crate::domain::RepoId;
use crate::infra::github::GithubReleaseSource;

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Release repository, <owner>/<name>
    #[arg(long, value_name = "OWNER/NAME", env = "KERNSYNC_REPOSITORY")]
    pub repo: Option<String>,
}

/// Run the list command. Reads release metadata only.
///
/// # Errors
///
/// Returns an error if the repository is invalid or the API call fails.
pub fn run(app: &AppContext, args: ListArgs) -> Result<ExitCode> {
    let repository = match args.repo {
        Some(repo) => repo,
        None => config_service::load_config(&app.config_store)?.sync.repository,
    };
    let repo = RepoId::parse(&repository)?;
    let releases = resolve::list_releases(&GithubReleaseSource::from_env(), &repo)?;
    app.renderer().render_releases(&repo.to_string(), &releases)?;
    Ok(ExitCode::SUCCESS)
}
