//! Record types stored by grove-db.
//!
//! The store treats template content as an opaque string. It never parses the
//! serialized tree; that is the caller's business.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// ============================================================================
// WorkspaceId
// ============================================================================

/// Unique identifier of a workspace record (UUID v4 as a string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkspaceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

// ============================================================================
// Workspace records
// ============================================================================

/// Fields supplied when creating a workspace record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkspace {
    pub title: String,
    pub description: Option<String>,
    /// Editor template kind, e.g. `REACT`.
    pub template_kind: String,
    pub repository_full_name: String,
    pub repository_url: String,
    /// Owning user.
    pub user_id: String,
}

impl NewWorkspace {
    /// Reject records missing required fields.
    pub fn validate(&self) -> DbResult<()> {
        if self.title.trim().is_empty() {
            return Err(DbError::invalid("workspace title must not be empty"));
        }
        if self.user_id.trim().is_empty() {
            return Err(DbError::invalid("workspace owner must not be empty"));
        }
        Ok(())
    }
}

/// A stored workspace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    pub id: WorkspaceId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub template_kind: String,
    pub repository_full_name: String,
    pub repository_url: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl WorkspaceRecord {
    /// Materialize a new record with a fresh id and timestamp.
    pub fn from_new(new: NewWorkspace) -> Self {
        Self {
            id: WorkspaceId::generate(),
            title: new.title,
            description: new.description,
            template_kind: new.template_kind,
            repository_full_name: new.repository_full_name,
            repository_url: new.repository_url,
            user_id: new.user_id,
            created_at: Utc::now(),
        }
    }
}

/// The serialized template tree attached to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub workspace_id: WorkspaceId,
    /// Opaque serialized tree.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Linked accounts
// ============================================================================

/// An external account linked to a local user (e.g. a GitHub OAuth grant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub user_id: String,
    /// Provider key, e.g. `github`.
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}
