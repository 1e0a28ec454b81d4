//! Remote repository service trait.
//!
//! The import pipeline talks to the hosting service only through
//! [`RemoteRepositoryService`]. The GitHub implementation lives in
//! [`crate::remote_adapter`]; tests substitute in-memory fakes.

use std::time::Duration;

use thiserror::Error;

use crate::types::{RemoteContent, RemoteListing, RepositoryReference, RepositorySummary};

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote asked us to slow down.
    #[error("rate limited (HTTP {status})")]
    RateLimited {
        status: u16,
        /// How long the remote asked us to wait, when it said.
        retry_after: Option<Duration>,
    },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// HTTP status if the remote answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Read-only access to a repository hosting service.
pub trait RemoteRepositoryService: Send + Sync {
    /// Recursive listing of the default-branch snapshot, in remote order.
    fn list_tree(
        &self,
        repo: &RepositoryReference,
        token: &str,
    ) -> Result<RemoteListing, RemoteError>;

    /// Payload of a single path.
    fn fetch_content(
        &self,
        repo: &RepositoryReference,
        path: &str,
        token: &str,
    ) -> Result<RemoteContent, RemoteError>;

    /// Repositories visible to the token's owner.
    fn list_repositories(&self, token: &str) -> Result<Vec<RepositorySummary>, RemoteError>;
}
