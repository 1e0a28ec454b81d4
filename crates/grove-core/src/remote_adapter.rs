//! Adapter layer for grove-github.
//!
//! Bridges the GitHub REST client to the [`RemoteRepositoryService`] trait:
//!
//! - error conversion from `GithubError` to `RemoteError`
//! - wire-type projection into grove-core types
//! - client construction from [`GithubSection`]

use std::time::Duration;

use chrono::Utc;
use grove_github::{GithubClient, GithubClientConfig, GithubError, RepoResponse};

use crate::config::GithubSection;
use crate::errors::GroveError;
use crate::remote::{RemoteError, RemoteRepositoryService};
use crate::types::{
    EntryKind, RemoteContent, RemoteListing, RemotePathEntry, RepositoryOwner,
    RepositoryReference, RepositorySummary,
};

// ============================================================================
// Error Conversion
// ============================================================================

/// Convert a grove-github error to a remote call failure.
///
/// 429, and 403 with exhausted rate-limit headers, become `RateLimited` with
/// the wait GitHub asked for.
pub fn from_github_error(err: GithubError) -> RemoteError {
    if err.is_rate_limited() {
        let status = err.status().unwrap_or(429);
        let retry_after = match &err {
            GithubError::Status {
                rate_limit: Some(info),
                ..
            } => info
                .wait_secs(Utc::now().timestamp().max(0) as u64)
                .map(Duration::from_secs),
            _ => None,
        };
        return RemoteError::RateLimited {
            status,
            retry_after,
        };
    }

    match err {
        GithubError::Status { status, body, .. } => RemoteError::Status { status, body },
        GithubError::Transport(msg) => RemoteError::Transport(msg),
        GithubError::Decode(msg) | GithubError::InvalidUrl(msg) => RemoteError::Malformed(msg),
    }
}

// ============================================================================
// Client construction
// ============================================================================

/// Build a GitHub client from the `github` config section.
pub fn github_client(section: &GithubSection) -> Result<GithubClient, GroveError> {
    let mut config = GithubClientConfig {
        api_base_url: section.api_base_url.clone(),
        timeout: Duration::from_secs(section.timeout_secs),
        ..Default::default()
    };
    if let Some(agent) = &section.user_agent {
        config.user_agent = agent.clone();
    }
    GithubClient::new(config).map_err(|e| GroveError::InvalidConfiguration {
        message: e.to_string(),
        hint: "Check github.apiBaseUrl in the config file".to_string(),
    })
}

// ============================================================================
// Trait implementation
// ============================================================================

impl RemoteRepositoryService for GithubClient {
    fn list_tree(
        &self,
        repo: &RepositoryReference,
        token: &str,
    ) -> Result<RemoteListing, RemoteError> {
        let tree = self
            .get_tree_recursive(repo.full_name(), token)
            .map_err(from_github_error)?;
        Ok(RemoteListing {
            entries: tree
                .tree
                .into_iter()
                .map(|entry| RemotePathEntry {
                    kind: EntryKind::from_remote(&entry.entry_type),
                    path: entry.path,
                })
                .collect(),
            truncated: tree.truncated,
        })
    }

    fn fetch_content(
        &self,
        repo: &RepositoryReference,
        path: &str,
        token: &str,
    ) -> Result<RemoteContent, RemoteError> {
        let payload = self
            .get_contents(repo.full_name(), path, token)
            .map_err(from_github_error)?;
        Ok(RemoteContent {
            encoding: payload.encoding,
            content: payload.content,
        })
    }

    fn list_repositories(&self, token: &str) -> Result<Vec<RepositorySummary>, RemoteError> {
        let repos = self.list_user_repos(token).map_err(from_github_error)?;
        Ok(repos.into_iter().map(project_repository).collect())
    }
}

fn project_repository(repo: RepoResponse) -> RepositorySummary {
    let owner = repo
        .owner
        .map(|o| RepositoryOwner {
            login: o.login.unwrap_or_default(),
            avatar_url: o.avatar_url,
        })
        .unwrap_or_default();
    RepositorySummary {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        description: repo.description,
        html_url: repo.html_url,
        language: repo.language,
        private: repo.private,
        updated_at: repo.updated_at,
        owner,
    }
}
