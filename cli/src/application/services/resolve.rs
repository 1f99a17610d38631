//! Application service: release resolution and listing use-cases.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Only metadata is inspected here; no asset bytes are fetched.

use tracing::debug;

use crate::application::ports::ReleaseSource;
use crate::domain::release::newest_published;
use crate::domain::{
    Asset, PrereleasePolicy, Release, ReleaseSelector, ReleaseSummary, RepoId, SyncError,
};

/// A release together with the asset chosen from it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub release: Release,
    pub asset: Asset,
}

/// Determine the release for `selector` and the asset named `asset_name`.
///
/// # Errors
///
/// - [`SyncError::ReleaseNotFound`] for unknown tags or an empty feed.
/// - [`SyncError::ReleaseRejected`] when "latest" yields a draft or
///   prerelease under [`PrereleasePolicy::Stable`].
/// - [`SyncError::AssetNotFound`] when no asset name matches exactly.
/// - [`SyncError::NetworkFailure`] from the source.
pub fn resolve(
    source: &impl ReleaseSource,
    repo: &RepoId,
    selector: &ReleaseSelector,
    asset_name: &str,
    policy: PrereleasePolicy,
) -> Result<Resolved, SyncError> {
    let release = find_release(source, repo, selector, policy)?;
    debug!(repository = %repo, tag = %release.tag, assets = release.assets.len(), "resolved release");
    let asset = release.asset(repo, asset_name)?.clone();
    debug!(asset = %asset.name, id = asset.id, size = asset.size, "resolved asset");
    Ok(Resolved { release, asset })
}

fn find_release(
    source: &impl ReleaseSource,
    repo: &RepoId,
    selector: &ReleaseSelector,
    policy: PrereleasePolicy,
) -> Result<Release, SyncError> {
    match (selector, policy) {
        (ReleaseSelector::Tag(tag), _) => source.release_by_tag(repo, tag),
        (ReleaseSelector::Latest, PrereleasePolicy::Stable) => {
            let release = source.latest_release(repo)?;
            if release.is_stable() {
                Ok(release)
            } else {
                let reason = if release.draft {
                    "it is a draft"
                } else {
                    "it is a prerelease (set release.allow_prerelease to accept)"
                };
                Err(SyncError::ReleaseRejected {
                    repository: repo.to_string(),
                    tag: release.tag,
                    reason: reason.to_string(),
                })
            }
        }
        (ReleaseSelector::Latest, PrereleasePolicy::IncludePrerelease) => {
            let releases = source.list_releases(repo)?;
            newest_published(&releases)
                .cloned()
                .ok_or_else(|| SyncError::ReleaseNotFound {
                    repository: repo.to_string(),
                    tag: selector.label().to_string(),
                })
        }
    }
}

/// Summaries of every release in the feed, newest first.
///
/// Read-only: nothing is downloaded and no local state is touched.
///
/// # Errors
///
/// Returns [`SyncError::NetworkFailure`] from the source.
pub fn list_releases(
    source: &impl ReleaseSource,
    repo: &RepoId,
) -> Result<Vec<ReleaseSummary>, SyncError> {
    let releases = source.list_releases(repo)?;
    debug!(repository = %repo, count = releases.len(), "listed releases");
    Ok(releases.iter().map(ReleaseSummary::from).collect())
}
