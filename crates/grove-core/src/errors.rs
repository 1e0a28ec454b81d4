//! Error types for grove-core.

use thiserror::Error;

/// Domain-specific errors for Grove operations.
#[derive(Error, Debug)]
pub enum GroveError {
    /// No access credential is available for the user.
    #[error("No GitHub access token available for user `{user_id}`.")]
    CredentialMissing {
        /// The user the credential was requested for.
        user_id: String,
    },

    /// The remote listing call failed.
    #[error("Repository listing failed with HTTP {status}: {body}")]
    UpstreamListing {
        /// HTTP status, or 0 when no response was received.
        status: u16,
        /// Response body, truncated for diagnostics.
        body: String,
    },

    /// The workspace or its template could not be stored.
    #[error("Failed to persist workspace: {0}")]
    Persistence(String),

    /// The import was cancelled before completion.
    #[error("Import cancelled.")]
    Cancelled,

    /// Invalid argument provided to an operation.
    #[error("{0}")]
    InvalidArgument(String),

    /// A requested record does not exist.
    #[error("Workspace `{0}` not found.")]
    WorkspaceNotFound(String),

    /// Global configuration file is invalid.
    #[error("Global config invalid: {0}")]
    InvalidGlobalConfig(String),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    /// Wrapper for standard I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for YAML serialization errors.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Catch-all for errors raised at construction seams.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GroveError {
    /// Short, actionable hint for the CLI to print under the error.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::CredentialMissing { .. } => {
                Some("Set GITHUB_TOKEN, pass --token, or link a GitHub account.")
            }
            Self::UpstreamListing { status: 401, .. } => {
                Some("The token was rejected. Check that it has not expired.")
            }
            Self::UpstreamListing { status: 404, .. } => {
                Some("Check the repository name and that the token can read it.")
            }
            Self::InvalidConfiguration { .. } | Self::InvalidGlobalConfig(_) => {
                Some("Run `grove config check` to see all configuration problems.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_message() {
        let err = GroveError::UpstreamListing {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Repository listing failed with HTTP 404: Not Found"
        );
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_credential_missing_has_hint() {
        let err = GroveError::CredentialMissing {
            user_id: "local".to_string(),
        };
        assert!(err.to_string().contains("local"));
        assert!(err.hint().unwrap().contains("GITHUB_TOKEN"));
        assert!(GroveError::Cancelled.hint().is_none());
    }
}
