//! GitHub release API interaction

use std::time::Duration;

use log::debug;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::error::FeedError;

/// Public GitHub REST endpoint.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Single-shot request timeout. There is no retry.
pub const FEED_TIMEOUT: Duration = Duration::from_secs(15);

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// `owner/name` pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Parse `owner/name`. Returns `None` for an empty or malformed value.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, name) = raw.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Repository page on github.com.
    pub fn homepage(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Latest-release payload. Everything is optional because the checker treats
/// a missing field as "no update" rather than as a parse failure.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GitHubRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zipball_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Source of "latest release" payloads.
#[allow(async_fn_in_trait)]
pub trait ReleaseFeed {
    async fn latest_release(&self, repo: &RepoId) -> Result<GitHubRelease, FeedError>;
}

/// reqwest-backed feed against the GitHub REST API (or a compatible mirror).
#[derive(Debug, Clone)]
pub struct GithubReleaseFeed {
    client: reqwest::Client,
    api_base: Url,
}

impl GithubReleaseFeed {
    /// Build a feed client with the fixed timeout and GitHub accept header.
    pub fn new(api_base: &str, user_agent: &str) -> Result<Self, FeedError> {
        Self::with_timeout(api_base, user_agent, FEED_TIMEOUT)
    }

    /// Same as [`GithubReleaseFeed::new`] with a caller-chosen timeout, for
    /// exercising the timeout path against a slow local server.
    pub fn with_timeout(
        api_base: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        // join() replaces the last path segment unless the base ends in '/'
        let mut base = api_base.trim_end_matches('/').to_string();
        base.push('/');
        let api_base = Url::parse(&base)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, api_base })
    }

    fn latest_release_url(&self, repo: &RepoId) -> Result<Url, FeedError> {
        Ok(self.api_base.join(&format!(
            "repos/{}/{}/releases/latest",
            repo.owner(),
            repo.name()
        ))?)
    }
}

impl ReleaseFeed for GithubReleaseFeed {
    async fn latest_release(&self, repo: &RepoId) -> Result<GitHubRelease, FeedError> {
        let url = self.latest_release_url(repo)?;
        debug!("Fetching latest release for {} from {}", repo, url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FeedError::Status(status));
        }

        // Parse from text so a non-JSON body is a payload error, not transport
        let body = response.text().await?;
        let release: GitHubRelease = serde_json::from_str(&body)?;
        Ok(release)
    }
}
