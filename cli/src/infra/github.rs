//! GitHub infrastructure: implements `ReleaseSource` over the REST API.

use std::io::{self, Read};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::ports::ReleaseSource;
use crate::domain::{Asset, Release, RepoId, SyncError};

/// Default GitHub API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("kernsync/", env!("CARGO_PKG_VERSION"));
const RELEASES_PER_PAGE: u32 = 30;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest a single read may block before the stream counts as stalled.
const STALL_TIMEOUT: Duration = Duration::from_secs(30);
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_BASE_TIMEOUT: Duration = Duration::from_secs(60);
/// Slowest sustained transfer rate tolerated for asset downloads.
const MIN_THROUGHPUT_BYTES_PER_SEC: u64 = 256 * 1024;

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
    published_at: Option<DateTime<Utc>>,
    body: Option<String>,
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize)]
struct GithubAsset {
    id: u64,
    name: String,
    #[serde(default)]
    size: u64,
    browser_download_url: String,
}

impl From<GithubRelease> for Release {
    fn from(r: GithubRelease) -> Self {
        let tag = r.tag_name;
        let assets = r
            .assets
            .into_iter()
            .map(|a| Asset {
                id: a.id,
                name: a.name,
                size: a.size,
                download_url: a.browser_download_url,
                release_tag: tag.clone(),
            })
            .collect();
        Self {
            tag,
            draft: r.draft,
            prerelease: r.prerelease,
            published_at: r.published_at,
            body: r.body.unwrap_or_default(),
            assets,
        }
    }
}

// ── Release source ───────────────────────────────────────────────────────────

/// Uses the GitHub releases API to resolve and download release assets.
pub struct GithubReleaseSource {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl GithubReleaseSource {
    /// Create a source for `base_url`, authenticating with `token` if given.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_stall_timeout(base_url, token, STALL_TIMEOUT)
    }

    /// Like [`GithubReleaseSource::new`], failing any read that blocks
    /// longer than `stall`.
    #[must_use]
    pub fn with_stall_timeout(
        base_url: impl Into<String>,
        token: Option<String>,
        stall: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(stall)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Configure from `KERNSYNC_GITHUB_API_URL` and `GITHUB_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("KERNSYNC_GITHUB_API_URL")
            .unwrap_or_else(|_| GITHUB_API_URL.to_string());
        Self::new(base_url, std::env::var("GITHUB_TOKEN").ok())
    }

    fn repo_url(&self, repo: &RepoId, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{rest}",
            self.base_url,
            repo.owner(),
            repo.name()
        )
    }

    fn request(&self, url: &str, accept: &str) -> ureq::Request {
        let req = self
            .agent
            .get(url)
            .set("Accept", accept)
            .set("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => req.set("Authorization", &format!("Bearer {token}")),
            None => req,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ureq::Error> {
        debug!(%url, "github request");
        let body = self
            .request(url, "application/vnd.github+json")
            .timeout(METADATA_TIMEOUT)
            .call()?
            .into_string()?;
        serde_json::from_str(&body).map_err(|e| {
            ureq::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed response from {url}: {e}"),
            ))
        })
    }

    fn fetch_release(&self, repo: &RepoId, rest: &str, label: &str) -> Result<Release, SyncError> {
        let call = format!("GET release {label} of {repo}");
        match self.get_json::<GithubRelease>(&self.repo_url(repo, rest)) {
            Ok(release) => Ok(release.into()),
            Err(ureq::Error::Status(404, _)) => Err(SyncError::ReleaseNotFound {
                repository: repo.to_string(),
                tag: label.to_string(),
            }),
            Err(e) => Err(network_error(call, e)),
        }
    }
}

impl ReleaseSource for GithubReleaseSource {
    fn latest_release(&self, repo: &RepoId) -> Result<Release, SyncError> {
        self.fetch_release(repo, "releases/latest", crate::domain::release::LATEST)
    }

    fn release_by_tag(&self, repo: &RepoId, tag: &str) -> Result<Release, SyncError> {
        let rest = format!("releases/tags/{}", encode_path_segment(tag));
        self.fetch_release(repo, &rest, tag)
    }

    fn list_releases(&self, repo: &RepoId) -> Result<Vec<Release>, SyncError> {
        let call = format!("GET releases of {repo}");
        let url = self.repo_url(repo, &format!("releases?per_page={RELEASES_PER_PAGE}"));
        let releases: Vec<GithubRelease> =
            self.get_json(&url).map_err(|e| network_error(call, e))?;
        Ok(releases.into_iter().map(Release::from).collect())
    }

    fn download_asset(
        &self,
        repo: &RepoId,
        asset: &Asset,
    ) -> Result<Box<dyn Read + Send>, SyncError> {
        let call = format!("GET asset {} ({}) of {repo}", asset.name, asset.release_tag);
        let url = self.repo_url(repo, &format!("releases/assets/{}", asset.id));
        let budget = download_timeout(asset.size);
        debug!(%url, size = asset.size, budget_secs = budget.as_secs(), "downloading asset");
        // No request deadline here: in ureq it would replace the per-read
        // stall timeout. The overall budget is enforced on the body instead.
        let response = self
            .request(&url, "application/octet-stream")
            .call()
            .map_err(|e| network_error(call, e))?;
        Ok(Box::new(BudgetedReader::new(response.into_reader(), budget)))
    }
}

/// Fails the transfer once its overall time budget is spent.
struct BudgetedReader<R> {
    inner: R,
    budget: Duration,
    deadline: Instant,
}

impl<R> BudgetedReader<R> {
    fn new(inner: R, budget: Duration) -> Self {
        Self {
            inner,
            budget,
            deadline: Instant::now() + budget,
        }
    }
}

impl<R: Read> Read for BudgetedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if Instant::now() >= self.deadline {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("download exceeded its {}s time budget", self.budget.as_secs()),
            ));
        }
        self.inner.read(buf)
    }
}

/// Overall time budget for downloading `size` bytes.
#[must_use]
pub fn download_timeout(size: u64) -> Duration {
    DOWNLOAD_BASE_TIMEOUT + Duration::from_secs(size / MIN_THROUGHPUT_BYTES_PER_SEC)
}

fn network_error(call: String, err: ureq::Error) -> SyncError {
    match err {
        ureq::Error::Status(code @ (403 | 429), _) => SyncError::network(
            call,
            format!("HTTP {code}: rate limited. Try again in a few minutes, or set GITHUB_TOKEN."),
        ),
        ureq::Error::Status(code, response) => {
            SyncError::network(call, format!("HTTP {code} {}", response.status_text()))
        }
        ureq::Error::Transport(transport) => SyncError::network(call, transport),
    }
}

/// Percent-encode everything outside RFC 3986 unreserved characters.
fn encode_path_segment(segment: &str) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}
