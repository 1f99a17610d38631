//! Integration tests for `kernsync list`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::fake_github::{FakeGithub, release_json};

fn kernsync(api: &str, home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kernsync"));
    cmd.env("NO_COLOR", "1")
        .env("KERNSYNC_GITHUB_API_URL", api)
        .env("KERNSYNC_CONFIG", home.path().join("config.yaml"))
        .env("KERNSYNC_WSLCONFIG", home.path().join(".wslconfig"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("KERNSYNC_REPOSITORY");
    cmd
}

fn server() -> FakeGithub {
    let mut draft = release_json("next", "2024-06-01T00:00:00Z", false, &[]);
    draft["draft"] = serde_json::Value::Bool(true);
    draft["published_at"] = serde_json::Value::Null;
    FakeGithub::builder()
        .json(
            "/repos/owner/kernels/releases?per_page=30",
            &serde_json::json!([
                draft,
                release_json("v2-rc1", "2024-05-20T08:00:00Z", true, &[(2, "bzImage", 3)]),
                release_json("v1", "2024-04-01T08:00:00Z", false, &[(1, "bzImage", 3)]),
            ]),
        )
        .start()
}

#[test]
fn test_list_prints_one_line_per_release() {
    let home = TempDir::new().unwrap();
    let server = server();
    kernsync(server.base_url(), &home)
        .args(["list", "--repo", "owner/kernels"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "release next published unpublished (draft: true, pre-release: false)",
        ))
        .stdout(predicate::str::contains(
            "release v2-rc1 published 2024-05-20 (draft: false, pre-release: true)",
        ))
        .stdout(predicate::str::contains(
            "release v1 published 2024-04-01 (draft: false, pre-release: false)",
        ));
    assert_eq!(server.count("/assets/"), 0);
}

#[test]
fn test_list_json() {
    let home = TempDir::new().unwrap();
    let server = server();
    let output = kernsync(server.base_url(), &home)
        .args(["list", "--repo", "owner/kernels", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["repository"], "owner/kernels");
    assert_eq!(value["releases"].as_array().unwrap().len(), 3);
    assert_eq!(value["releases"][1]["prerelease"], true);
}

#[test]
fn test_list_uses_repository_from_config() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "sync:\n  repository: owner/kernels\n",
    )
    .unwrap();
    let server = server();
    kernsync(server.base_url(), &home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("release v1"));
}

#[test]
fn test_list_does_not_touch_local_state() {
    let home = TempDir::new().unwrap();
    let server = server();
    kernsync(server.base_url(), &home)
        .args(["list", "--repo", "owner/kernels"])
        .assert()
        .success();
    assert_eq!(std::fs::read_dir(home.path()).unwrap().count(), 0);
}
