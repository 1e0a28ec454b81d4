//! GitHub REST client for Grove.
//!
//! This crate talks to the GitHub REST API on behalf of `grove-core`. It
//! isolates the HTTP stack (`reqwest`) from the domain logic so the import
//! pipeline can be exercised against any implementation of its remote trait.
//!
//! Endpoints used:
//!
//! - `GET /repos/{owner}/{repo}/git/trees/HEAD?recursive=1` - recursive listing
//! - `GET /repos/{owner}/{repo}/contents/{path}` - one file payload
//! - `GET /user/repos?per_page=100` - repositories of the authenticated user

use thiserror::Error;

pub mod client;
pub mod types;

pub use client::{GithubClient, GithubClientConfig, RateLimitInfo, DEFAULT_API_BASE_URL};
pub use types::{ContentsResponse, OwnerResponse, RepoResponse, TreeEntry, TreeResponse};

/// Maximum number of characters of an error body kept for diagnostics.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Errors returned by the GitHub client.
#[derive(Debug, Error)]
pub enum GithubError {
    /// GitHub answered with a non-success status.
    #[error("GitHub returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated to [`MAX_ERROR_BODY_CHARS`].
        body: String,
        /// Rate-limit signals carried by the response, if any.
        rate_limit: Option<RateLimitInfo>,
    },

    /// The request could not be sent or the response could not be read.
    #[error("GitHub request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON shape.
    #[error("Failed to decode GitHub response: {0}")]
    Decode(String),

    /// The configured base URL or a request path is not a valid URL.
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),
}

impl GithubError {
    /// HTTP status of the failed response, if the failure came from GitHub.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error is GitHub signalling an exhausted rate limit.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Status {
                status, rate_limit, ..
            } => {
                *status == 429
                    || (*status == 403
                        && rate_limit.as_ref().is_some_and(RateLimitInfo::is_exhausted))
            }
            _ => false,
        }
    }
}

/// Truncate a response body to at most `max_chars` characters.
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
