// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! HTTP client for the GitHub commits endpoint

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use reqwest::{Client, StatusCode};
use tracing::debug;

use repocard_core::{CommitFetcher, CommitRecord, FetchError, TrackedRepo};

use crate::wire::{error_message, parse_commits};

/// Public GitHub API root
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest `per_page` GitHub accepts
pub const MAX_PER_PAGE: usize = 100;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";

/// Connection settings for [`GithubFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    /// Personal access token; anonymous requests when `None`
    pub token: Option<String>,
    /// API root, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// `User-Agent` header (GitHub rejects requests without one)
    pub user_agent: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("repocard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GithubConfig {
    /// Authenticate with `token`; a blank token means anonymous
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        let token = token.trim();
        self.token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    /// Use a different API root (GitHub Enterprise, test servers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` header
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Rate limit headers from a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// `x-ratelimit-remaining`
    pub remaining: Option<u64>,
    /// `x-ratelimit-reset`, epoch seconds
    pub reset: Option<i64>,
}

impl RateLimit {
    /// Read the rate limit headers, ignoring malformed values
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            remaining: get("x-ratelimit-remaining").and_then(|s| s.parse().ok()),
            reset: get("x-ratelimit-reset").and_then(|s| s.parse().ok()),
        }
    }

    fn reset_time(&self) -> Option<DateTime<Utc>> {
        self.reset.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Map a non-success response to a [`FetchError`]
///
/// Returns `None` for statuses that carry a usable commit list.
#[must_use]
pub fn classify_status(
    status: u16,
    rate: RateLimit,
    body: &str,
    repo: &str,
) -> Option<FetchError> {
    if (200..300).contains(&status) {
        return None;
    }
    let exhausted = rate.remaining == Some(0);
    let error = match status {
        401 => FetchError::Unauthorized {
            message: error_message(body),
        },
        429 => FetchError::RateLimited {
            reset: rate.reset_time(),
        },
        403 if exhausted => FetchError::RateLimited {
            reset: rate.reset_time(),
        },
        403 => FetchError::Unauthorized {
            message: error_message(body),
        },
        404 => FetchError::NotFound {
            repo: repo.to_string(),
        },
        _ => FetchError::Api {
            status,
            message: error_message(body),
        },
    };
    Some(error)
}

/// Fetches commit windows from the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubFetcher {
    http: Client,
    config: GithubConfig,
}

impl GithubFetcher {
    /// Build a fetcher
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(config: GithubConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(network)?;
        Ok(Self { http, config })
    }

    /// Use a prebuilt HTTP client
    ///
    /// The client's own timeout and user agent take precedence over `config`.
    #[must_use]
    pub fn with_client(http: Client, config: GithubConfig) -> Self {
        Self { http, config }
    }

    /// Current settings
    #[must_use]
    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// Commits endpoint for a repository
    #[must_use]
    pub fn commits_url(&self, repo: &TrackedRepo) -> String {
        format!(
            "{}/repos/{}/{}/commits",
            self.config.base_url, repo.key.owner, repo.key.name
        )
    }

    /// Query parameters for a window of `limit` commits
    #[must_use]
    pub fn query(repo: &TrackedRepo, limit: usize) -> Vec<(&'static str, String)> {
        let mut query = vec![("per_page", limit.clamp(1, MAX_PER_PAGE).to_string())];
        if let Some(branch) = repo.branch.as_deref().filter(|b| !b.is_empty()) {
            query.push(("sha", branch.to_string()));
        }
        query
    }
}

fn network(e: reqwest::Error) -> FetchError {
    FetchError::Network(e.to_string())
}

#[async_trait]
impl CommitFetcher for GithubFetcher {
    async fn fetch(
        &self,
        repo: &TrackedRepo,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, FetchError> {
        let url = self.commits_url(repo);
        debug!(repo = %repo.key, %url, limit, "Fetching commits");

        let mut request = self
            .http
            .get(&url)
            .query(&Self::query(repo, limit))
            .header(ACCEPT, GITHUB_JSON);
        if let Some(token) = &self.config.token {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let rate = RateLimit::from_headers(response.headers());
        if let Some(remaining) = rate.remaining {
            debug!(repo = %repo.key, remaining, "GitHub rate limit");
        }
        let body = response.text().await.map_err(network)?;

        // GitHub answers 409 for a repository with no commits yet
        if status == StatusCode::CONFLICT {
            debug!(repo = %repo.key, "Repository is empty");
            return Ok(Vec::new());
        }
        if let Some(error) = classify_status(status.as_u16(), rate, &body, &repo.key.to_string()) {
            debug!(repo = %repo.key, status = status.as_u16(), error = %error, "GitHub request failed");
            return Err(error);
        }

        let mut records = parse_commits(&body)?;
        records.truncate(limit);
        debug!(repo = %repo.key, count = records.len(), "Fetched commits");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repocard_core::RepoKey;
    use similar_asserts::assert_eq;

    fn repo() -> TrackedRepo {
        TrackedRepo::new(RepoKey::new("octo", "cards"))
    }

    #[test]
    fn test_success_statuses() {
        assert!(classify_status(200, RateLimit::default(), "[]", "octo/cards").is_none());
        assert!(classify_status(204, RateLimit::default(), "", "octo/cards").is_none());
    }

    #[test]
    fn test_unauthorized() {
        let err = classify_status(401, RateLimit::default(), r#"{"message":"Bad credentials"}"#, "o/r");
        match err {
            Some(FetchError::Unauthorized { message }) => assert_eq!(message, "Bad credentials"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_forbidden_with_quota_left_is_unauthorized() {
        let rate = RateLimit {
            remaining: Some(10),
            reset: None,
        };
        assert!(matches!(
            classify_status(403, rate, "{}", "o/r"),
            Some(FetchError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_forbidden_with_exhausted_quota_is_rate_limited() {
        let rate = RateLimit {
            remaining: Some(0),
            reset: Some(1_768_618_800),
        };
        match classify_status(403, rate, "{}", "o/r") {
            Some(FetchError::RateLimited { reset: Some(reset) }) => {
                assert_eq!(reset.timestamp(), 1_768_618_800);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_too_many_requests() {
        assert!(matches!(
            classify_status(429, RateLimit::default(), "", "o/r"),
            Some(FetchError::RateLimited { reset: None })
        ));
    }

    #[test]
    fn test_not_found() {
        match classify_status(404, RateLimit::default(), "", "octo/cards") {
            Some(FetchError::NotFound { repo }) => assert_eq!(repo, "octo/cards"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_status_is_api_error() {
        assert!(matches!(
            classify_status(502, RateLimit::default(), "Bad Gateway", "o/r"),
            Some(FetchError::Api { status: 502, .. })
        ));
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-reset", "garbage".parse().unwrap());
        let rate = RateLimit::from_headers(&headers);
        assert_eq!(rate.remaining, Some(0));
        assert_eq!(rate.reset, None);
    }

    #[test]
    fn test_commits_url() {
        let fetcher = GithubFetcher::new(
            GithubConfig::default().with_base_url("https://ghe.example.com/api/v3/"),
        )
        .expect("client");
        assert_eq!(
            fetcher.commits_url(&repo()),
            "https://ghe.example.com/api/v3/repos/octo/cards/commits"
        );
    }

    #[test]
    fn test_query_clamps_limit_and_adds_branch() {
        assert_eq!(
            GithubFetcher::query(&repo(), 500),
            vec![("per_page", "100".to_string())]
        );
        assert_eq!(
            GithubFetcher::query(&repo().with_branch("dev"), 0),
            vec![("per_page", "1".to_string()), ("sha", "dev".to_string())]
        );
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        assert_eq!(GithubConfig::default().with_token("  ").token, None);
        assert_eq!(
            GithubConfig::default().with_token(" ghp_x ").token,
            Some("ghp_x".to_string())
        );
    }
}
