//! Unit tests for release resolution and listing.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use kernsync_cli::application::services::resolve::{list_releases, resolve};
use kernsync_cli::domain::{PrereleasePolicy, ReleaseSelector, RepoId, SyncError};

use crate::mocks::FakeReleaseSource;

fn repo() -> RepoId {
    RepoId::parse("owner/kernels").unwrap()
}

fn feed() -> FakeReleaseSource {
    FakeReleaseSource::new()
        .with_release("v1", 1, &[("bzImage", b"one")])
        .with_release("v2", 2, &[("bzImage", b"two")])
}

#[test]
fn test_latest_resolves_newest_release() {
    let resolved = resolve(
        &feed(),
        &repo(),
        &ReleaseSelector::Latest,
        "bzImage",
        PrereleasePolicy::Stable,
    )
    .expect("resolve");
    assert_eq!(resolved.release.tag, "v2");
    assert_eq!(resolved.asset.release_tag, "v2");
}

#[test]
fn test_explicit_tag_resolves_that_release() {
    let resolved = resolve(
        &feed(),
        &repo(),
        &ReleaseSelector::Tag("v1".into()),
        "bzImage",
        PrereleasePolicy::Stable,
    )
    .expect("resolve");
    assert_eq!(resolved.release.tag, "v1");
}

#[test]
fn test_explicit_prerelease_tag_is_honored() {
    let source = feed().with_prerelease("v3-rc1", 3, &[("bzImage", b"rc")]);
    let resolved = resolve(
        &source,
        &repo(),
        &ReleaseSelector::Tag("v3-rc1".into()),
        "bzImage",
        PrereleasePolicy::Stable,
    )
    .expect("resolve");
    assert!(resolved.release.prerelease);
}

#[test]
fn test_latest_draft_is_rejected() {
    let source = feed().with_draft("next", &[("bzImage", b"wip")]).latest_is("next");
    let err = resolve(
        &source,
        &repo(),
        &ReleaseSelector::Latest,
        "bzImage",
        PrereleasePolicy::Stable,
    )
    .unwrap_err();
    match err {
        SyncError::ReleaseRejected { tag, reason, .. } => {
            assert_eq!(tag, "next");
            assert!(reason.contains("draft"));
        }
        other => panic!("expected ReleaseRejected, got: {other}"),
    }
}

#[test]
fn test_include_prerelease_skips_drafts() {
    let source = feed()
        .with_prerelease("v3-rc1", 3, &[("bzImage", b"rc")])
        .with_draft("next", &[("bzImage", b"wip")]);
    let resolved = resolve(
        &source,
        &repo(),
        &ReleaseSelector::Latest,
        "bzImage",
        PrereleasePolicy::IncludePrerelease,
    )
    .expect("resolve");
    assert_eq!(resolved.release.tag, "v3-rc1");
}

#[test]
fn test_include_prerelease_with_only_drafts_is_not_found() {
    let source = FakeReleaseSource::new().with_draft("next", &[("bzImage", b"wip")]);
    let err = resolve(
        &source,
        &repo(),
        &ReleaseSelector::Latest,
        "bzImage",
        PrereleasePolicy::IncludePrerelease,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::ReleaseNotFound { .. }), "got: {err}");
}

#[test]
fn test_empty_feed_latest_is_not_found() {
    let err = resolve(
        &FakeReleaseSource::new(),
        &repo(),
        &ReleaseSelector::Latest,
        "bzImage",
        PrereleasePolicy::Stable,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::ReleaseNotFound { .. }), "got: {err}");
}

#[test]
fn test_asset_name_must_match_exactly() {
    let err = resolve(
        &feed(),
        &repo(),
        &ReleaseSelector::Latest,
        "bzimage",
        PrereleasePolicy::Stable,
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::AssetNotFound { .. }), "got: {err}");
}

#[test]
fn test_list_releases_reports_every_release_without_download() {
    let source = feed()
        .with_prerelease("v3-rc1", 3, &[])
        .with_draft("next", &[]);
    let summaries = list_releases(&source, &repo()).expect("list");

    let tags: Vec<&str> = summaries.iter().map(|s| s.tag.as_str()).collect();
    assert_eq!(tags, vec!["v3-rc1", "v2", "v1", "next"]);
    assert!(summaries[0].prerelease);
    assert!(summaries[3].draft);
    assert_eq!(summaries[1].published_date(), "2024-01-02");
    assert_eq!(summaries[3].published_date(), "unpublished");
    assert_eq!(source.downloads.get(), 0);
}
