//! Release domain types and pure resolution helpers.
//!
//! Nothing here talks to the network; the release source adapters map their
//! wire formats onto these types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::SyncError;

/// Sentinel selector value meaning "the most recent release".
pub const LATEST: &str = "latest";

// ── Repository identifier ────────────────────────────────────────────────────

/// A repository identifier of the form `<owner>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Parse `<owner>/<name>`.
    ///
    /// Both components must be non-empty and consist of ASCII alphanumerics,
    /// `-`, `_` or `.`; the name may not be `.` or `..`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidRepository`] for any other shape.
    pub fn parse(repository: &str) -> Result<Self, SyncError> {
        let invalid = || SyncError::InvalidRepository(repository.to_string());
        let (owner, name) = repository.split_once('/').ok_or_else(invalid)?;
        if !is_valid_component(owner) || !is_valid_component(name) {
            return Err(invalid());
        }
        if matches!(name, "." | "..") || matches!(owner, "." | "..") {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn is_valid_component(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

// ── Selector and policy ──────────────────────────────────────────────────────

/// Which release the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    /// The most recent release, as defined by [`PrereleasePolicy`].
    Latest,
    /// A release carrying exactly this tag.
    Tag(String),
}

impl ReleaseSelector {
    /// Empty input or `latest` (any case) selects the latest release.
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("") => Self::Latest,
            Some(s) if s.eq_ignore_ascii_case(LATEST) => Self::Latest,
            Some(tag) => Self::Tag(tag.to_string()),
        }
    }

    /// Tag name, or `latest`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Latest => LATEST,
            Self::Tag(tag) => tag,
        }
    }
}

/// Whether "latest" may resolve to a prerelease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrereleasePolicy {
    /// Only non-draft, non-prerelease releases; anything else is rejected.
    #[default]
    Stable,
    /// Newest non-draft release, prereleases included.
    IncludePrerelease,
}

impl PrereleasePolicy {
    #[must_use]
    pub fn from_allow(allow_prerelease: bool) -> Self {
        if allow_prerelease {
            Self::IncludePrerelease
        } else {
            Self::Stable
        }
    }
}

// ── Release and asset ────────────────────────────────────────────────────────

/// A published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub draft: bool,
    pub prerelease: bool,
    /// `None` for drafts that were never published.
    pub published_at: Option<DateTime<Utc>>,
    pub body: String,
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub download_url: String,
    /// Tag of the owning release.
    pub release_tag: String,
}

impl Release {
    /// Find the asset whose name equals `name` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AssetNotFound`] when no asset matches.
    pub fn asset(&self, repo: &RepoId, name: &str) -> Result<&Asset, SyncError> {
        self.assets
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| SyncError::AssetNotFound {
                asset: name.to_string(),
                repository: repo.to_string(),
                tag: self.tag.clone(),
                available: self.asset_names(),
            })
    }

    #[must_use]
    pub fn is_stable(&self) -> bool {
        !self.draft && !self.prerelease
    }

    fn asset_names(&self) -> String {
        if self.assets.is_empty() {
            return "none".to_string();
        }
        self.assets
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Pick the newest non-draft release by publish date.
///
/// Unpublished releases sort last; among equal dates the first in source
/// order wins.
#[must_use]
pub fn newest_published(releases: &[Release]) -> Option<&Release> {
    releases
        .iter()
        .filter(|r| !r.draft)
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| ib.cmp(ia))
        })
        .map(|(_, r)| r)
}

// ── Listing ──────────────────────────────────────────────────────────────────

/// One row of `kernsync list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub tag: String,
    pub published_at: Option<DateTime<Utc>>,
    pub draft: bool,
    pub prerelease: bool,
}

impl From<&Release> for ReleaseSummary {
    fn from(r: &Release) -> Self {
        Self {
            tag: r.tag.clone(),
            published_at: r.published_at,
            draft: r.draft,
            prerelease: r.prerelease,
        }
    }
}

impl ReleaseSummary {
    /// Publish date as `YYYY-MM-DD`, or `unpublished`.
    #[must_use]
    pub fn published_date(&self) -> String {
        self.published_at.map_or_else(
            || "unpublished".to_string(),
            |d| d.format("%Y-%m-%d").to_string(),
        )
    }
}
