//! Blocking GitHub REST client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ContentsResponse, RepoResponse, TreeResponse};
use crate::{truncate_body, GithubError, MAX_ERROR_BODY_CHARS};

/// Public GitHub API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubClientConfig {
    /// Base URL of the API, without trailing path (GitHub Enterprise uses `/api/v3`).
    pub api_base_url: String,
    /// Value of the `User-Agent` header. GitHub rejects requests without one.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("grove/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

// ============================================================================
// RateLimitInfo
// ============================================================================

/// Rate-limit signals read from GitHub response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// `x-ratelimit-remaining`
    pub remaining: Option<u64>,
    /// `x-ratelimit-reset`, seconds since the Unix epoch.
    pub reset_epoch_secs: Option<u64>,
    /// `retry-after`, in seconds (secondary rate limits).
    pub retry_after_secs: Option<u64>,
}

impl RateLimitInfo {
    /// Extract rate-limit headers. Returns `None` when none are present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
        };

        let info = Self {
            remaining: read("x-ratelimit-remaining"),
            reset_epoch_secs: read("x-ratelimit-reset"),
            retry_after_secs: read("retry-after"),
        };

        if info == Self::default() {
            None
        } else {
            Some(info)
        }
    }

    /// Whether the response says no further requests are allowed right now.
    pub fn is_exhausted(&self) -> bool {
        self.retry_after_secs.is_some() || self.remaining == Some(0)
    }

    /// Seconds to wait before the next request, given the current epoch time.
    ///
    /// `retry-after` wins over `x-ratelimit-reset` when both are present.
    pub fn wait_secs(&self, now_epoch_secs: u64) -> Option<u64> {
        if let Some(secs) = self.retry_after_secs {
            return Some(secs);
        }
        self.reset_epoch_secs
            .map(|reset| reset.saturating_sub(now_epoch_secs))
    }
}

// ============================================================================
// GithubClient
// ============================================================================

/// Blocking client for the handful of GitHub endpoints Grove needs.
///
/// The client is `Send + Sync` and cheap to share by reference across the
/// import worker pool; `reqwest` pools connections internally.
#[derive(Debug, Clone)]
pub struct GithubClient {
    config: GithubClientConfig,
    base_url: Url,
    http: Client,
}

impl GithubClient {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::InvalidUrl`] if `api_base_url` does not parse, or
    /// [`GithubError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: GithubClientConfig) -> Result<Self, GithubError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| GithubError::InvalidUrl(format!("{}: {}", config.api_base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(GithubError::InvalidUrl(config.api_base_url.clone()));
        }

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GithubError::Transport(format!("build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    /// Fetch the full recursive tree of the default branch in one call.
    pub fn get_tree_recursive(
        &self,
        full_name: &str,
        token: &str,
    ) -> Result<TreeResponse, GithubError> {
        let (owner, repo) = split_full_name(full_name)?;
        let mut url = self.endpoint(["repos", owner, repo, "git", "trees", "HEAD"])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        self.get_json(url, token, "tree listing")
    }

    /// Fetch the contents payload of one file.
    ///
    /// Each path segment is percent-encoded on its own so nested paths keep
    /// their `/` separators.
    pub fn get_contents(
        &self,
        full_name: &str,
        path: &str,
        token: &str,
    ) -> Result<ContentsResponse, GithubError> {
        let (owner, repo) = split_full_name(full_name)?;
        let segments = ["repos", owner, repo, "contents"]
            .into_iter()
            .chain(path.split('/'));
        let url = self.endpoint(segments)?;
        self.get_json(url, token, "contents")
    }

    /// List up to 100 repositories visible to the token's user.
    pub fn list_user_repos(&self, token: &str) -> Result<Vec<RepoResponse>, GithubError> {
        let mut url = self.endpoint(["user", "repos"])?;
        url.query_pairs_mut().append_pair("per_page", "100");
        self.get_json(url, token, "repository listing")
    }

    fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, GithubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::InvalidUrl(self.config.api_base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
        label: &str,
    ) -> Result<T, GithubError> {
        debug!("GET {} ({})", url, label);

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .map_err(|e| GithubError::Transport(format!("{}: {}", label, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let rate_limit = RateLimitInfo::from_headers(resp.headers());
            let body = resp.text().unwrap_or_default();
            return Err(GithubError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, MAX_ERROR_BODY_CHARS),
                rate_limit,
            });
        }

        let bytes = resp
            .bytes()
            .map_err(|e| GithubError::Transport(format!("{}: read body: {}", label, e)))?;
        serde_json::from_slice(&bytes).map_err(|e| GithubError::Decode(format!("{}: {}", label, e)))
    }
}

/// Split `owner/repo` into its two parts.
fn split_full_name(full_name: &str) -> Result<(&str, &str), GithubError> {
    match full_name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(GithubError::InvalidUrl(format!(
            "repository name `{}` is not of the form owner/repo",
            full_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};

    use super::*;

    fn spawn_server(router: Router) -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("build runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind listener");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("send addr");
                axum::serve(listener, router).await.expect("serve");
            });
        });
        format!("http://{}", rx.recv().expect("server addr"))
    }

    fn client_for(base_url: String) -> GithubClient {
        GithubClient::new(GithubClientConfig {
            api_base_url: base_url,
            ..GithubClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_tree_listing_sends_auth_and_recursive_flag() {
        async fn tree(
            Path((owner, repo, reference)): Path<(String, String, String)>,
            Query(query): Query<HashMap<String, String>>,
            headers: AxumHeaders,
        ) -> impl IntoResponse {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer secret");
            let accept_ok = headers.get("accept").and_then(|v| v.to_str().ok())
                == Some("application/vnd.github+json");
            if !authorized || !accept_ok || query.get("recursive").map(String::as_str) != Some("1")
            {
                return (StatusCode::BAD_REQUEST, "bad request").into_response();
            }
            assert_eq!((owner.as_str(), repo.as_str(), reference.as_str()), ("octo", "demo", "HEAD"));
            Json(serde_json::json!({
                "sha": "abc",
                "tree": [{"path": "README.md", "type": "blob"}],
                "truncated": false
            }))
            .into_response()
        }

        let base = spawn_server(Router::new().route("/repos/:owner/:repo/git/trees/:reference", get(tree)));
        let listing = client_for(base).get_tree_recursive("octo/demo", "secret").unwrap();
        assert_eq!(listing.tree.len(), 1);
        assert_eq!(listing.tree[0].path, "README.md");
    }

    #[test]
    fn test_error_status_carries_body_and_rate_limit() {
        async fn limited() -> impl IntoResponse {
            (
                StatusCode::FORBIDDEN,
                [("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1700000100")],
                "x".repeat(2000),
            )
        }

        let base = spawn_server(Router::new().route("/repos/:owner/:repo/git/trees/:reference", get(limited)));
        let err = client_for(base).get_tree_recursive("octo/demo", "t").unwrap_err();
        match &err {
            GithubError::Status {
                status,
                body,
                rate_limit,
            } => {
                assert_eq!(*status, 403);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 3);
                let info = rate_limit.as_ref().expect("rate limit headers");
                assert_eq!(info.wait_secs(1_700_000_000), Some(100));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_contents_path_segments_are_encoded() {
        async fn contents(
            Path((_owner, _repo, path)): Path<(String, String, String)>,
        ) -> impl IntoResponse {
            Json(serde_json::json!({
                "path": path,
                "encoding": "base64",
                "content": "aGk="
            }))
        }

        let base = spawn_server(Router::new().route("/repos/:owner/:repo/contents/*path", get(contents)));
        let payload = client_for(base)
            .get_contents("octo/demo", "src/my file.ts", "t")
            .unwrap();
        assert_eq!(payload.path.as_deref(), Some("src/my file.ts"));
        assert_eq!(payload.encoding.as_deref(), Some("base64"));
    }

    #[test]
    fn test_malformed_full_name_is_rejected_without_request() {
        let client = client_for("http://127.0.0.1:9".to_string());
        for name in ["", "octo", "/demo", "octo/", "a/b/c"] {
            let err = client.get_tree_recursive(name, "t").unwrap_err();
            assert!(matches!(err, GithubError::InvalidUrl(_)), "{name}");
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let err = GithubClient::new(GithubClientConfig {
            api_base_url: "not a url".to_string(),
            ..GithubClientConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, GithubError::InvalidUrl(_)));
    }

    #[test]
    fn test_rate_limit_info_prefers_retry_after() {
        let info = RateLimitInfo {
            remaining: Some(10),
            reset_epoch_secs: Some(500),
            retry_after_secs: Some(7),
        };
        assert!(info.is_exhausted());
        assert_eq!(info.wait_secs(100), Some(7));

        let reset_passed = RateLimitInfo {
            remaining: Some(0),
            reset_epoch_secs: Some(50),
            retry_after_secs: None,
        };
        assert_eq!(reset_passed.wait_secs(100), Some(0));
    }
}
