//! `GithubReleaseSource` against the fake release API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Read;
use std::time::{Duration, Instant};

use kernsync_cli::application::ports::ReleaseSource;
use kernsync_cli::domain::{RepoId, SyncError};
use kernsync_cli::infra::github::GithubReleaseSource;

use crate::fake_github::{FakeGithub, release_json};

fn repo() -> RepoId {
    RepoId::parse("owner/kernels").unwrap()
}

#[test]
fn test_latest_release_is_mapped() {
    let server = FakeGithub::builder()
        .json(
            "/repos/owner/kernels/releases/latest",
            &release_json("v2", "2024-05-01T10:00:00Z", false, &[(7, "bzImage", 4)]),
        )
        .start();
    let source = GithubReleaseSource::new(server.base_url(), None);

    let release = source.latest_release(&repo()).expect("latest");

    assert_eq!(release.tag, "v2");
    assert_eq!(release.assets[0].id, 7);
    assert_eq!(release.assets[0].size, 4);
}

#[test]
fn test_unknown_tag_is_release_not_found() {
    let server = FakeGithub::builder().start();
    let source = GithubReleaseSource::new(server.base_url(), None);

    let err = source.release_by_tag(&repo(), "v9").unwrap_err();

    assert!(matches!(err, SyncError::ReleaseNotFound { ref tag, .. } if tag == "v9"), "got: {err}");
    assert_eq!(server.requests(), vec!["/repos/owner/kernels/releases/tags/v9"]);
}

#[test]
fn test_rate_limit_is_network_failure_with_hint() {
    let server = FakeGithub::builder()
        .status("/repos/owner/kernels/releases/latest", 403)
        .start();
    let source = GithubReleaseSource::new(server.base_url(), None);

    let err = source.latest_release(&repo()).unwrap_err();

    assert!(matches!(err, SyncError::NetworkFailure { .. }), "got: {err}");
    assert!(err.to_string().contains("rate limited"), "got: {err}");
}

#[test]
fn test_list_releases_requests_one_page() {
    let server = FakeGithub::builder()
        .json(
            "/repos/owner/kernels/releases?per_page=30",
            &serde_json::json!([
                release_json("v2", "2024-05-01T10:00:00Z", false, &[]),
                release_json("v1", "2024-04-01T10:00:00Z", false, &[]),
            ]),
        )
        .start();
    let source = GithubReleaseSource::new(server.base_url(), None);

    let releases = source.list_releases(&repo()).expect("list");

    let tags: Vec<_> = releases.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(tags, vec!["v2", "v1"]);
}

#[test]
fn test_download_asset_streams_bytes() {
    let server = FakeGithub::builder()
        .json(
            "/repos/owner/kernels/releases/latest",
            &release_json("v2", "2024-05-01T10:00:00Z", false, &[(7, "bzImage", 6)]),
        )
        .bytes("/repos/owner/kernels/releases/assets/7", b"kernel")
        .start();
    let source = GithubReleaseSource::new(server.base_url(), None);
    let release = source.latest_release(&repo()).expect("latest");

    let mut body = Vec::new();
    source
        .download_asset(&repo(), &release.assets[0])
        .expect("download")
        .read_to_end(&mut body)
        .unwrap();

    assert_eq!(body, b"kernel");
}

#[test]
fn test_unreachable_api_is_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source = GithubReleaseSource::new(format!("http://{addr}"), None);

    let err = source.latest_release(&repo()).unwrap_err();

    assert!(matches!(err, SyncError::NetworkFailure { .. }), "got: {err}");
    assert!(err.to_string().contains("owner/kernels"), "got: {err}");
}

#[test]
fn test_stalled_download_fails_after_stall_timeout() {
    let server = FakeGithub::builder()
        .json(
            "/repos/owner/kernels/releases/latest",
            &release_json("v2", "2024-05-01T10:00:00Z", false, &[(7, "bzImage", 20)]),
        )
        .stalling(
            "/repos/owner/kernels/releases/assets/7",
            &[1u8; 20],
            10,
            Duration::from_secs(4),
        )
        .start();
    let source =
        GithubReleaseSource::with_stall_timeout(server.base_url(), None, Duration::from_secs(1));
    let release = source.latest_release(&repo()).expect("latest");

    let started = Instant::now();
    let mut body = Vec::new();
    let result = source
        .download_asset(&repo(), &release.assets[0])
        .expect("download")
        .read_to_end(&mut body);

    assert!(result.is_err(), "stalled stream should fail, read {} bytes", body.len());
    assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
}
