//! Common types used across grove-core.
//!
//! Request/response types for the import operation and the repository
//! listing, plus the intermediate values passed between pipeline stages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use grove_db::WorkspaceRecord;

use crate::errors::GroveError;

// ============================================================================
// TemplateKind
// ============================================================================

/// Editor template a workspace is opened with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateKind {
    #[default]
    React,
    Nextjs,
    Express,
    Vue,
    Hono,
    Angular,
}

impl TemplateKind {
    /// All kinds, in display order.
    pub const ALL: [TemplateKind; 6] = [
        Self::React,
        Self::Nextjs,
        Self::Express,
        Self::Vue,
        Self::Hono,
        Self::Angular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::React => "REACT",
            Self::Nextjs => "NEXTJS",
            Self::Express => "EXPRESS",
            Self::Vue => "VUE",
            Self::Hono => "HONO",
            Self::Angular => "ANGULAR",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown template kind: '{}'. Use one of: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

// ============================================================================
// RepositoryReference
// ============================================================================

/// Identifies a remote repository: `owner/repo` plus its canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryReference {
    full_name: String,
    url: String,
}

impl RepositoryReference {
    /// Build a reference, rejecting an empty full name or URL.
    pub fn new(full_name: impl Into<String>, url: impl Into<String>) -> Result<Self, GroveError> {
        let full_name = full_name.into().trim().to_string();
        let url = url.into().trim().to_string();
        if full_name.is_empty() {
            return Err(GroveError::InvalidArgument(
                "Repository full name is required (owner/repo).".to_string(),
            ));
        }
        if url.is_empty() {
            return Err(GroveError::InvalidArgument(
                "Repository URL is required.".to_string(),
            ));
        }
        Ok(Self { full_name, url })
    }

    /// Reference for a github.com repository, deriving the URL from the name.
    pub fn github(full_name: impl Into<String>) -> Result<Self, GroveError> {
        let full_name = full_name.into();
        let url = format!("https://github.com/{}", full_name.trim());
        Self::new(full_name, url)
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

// ============================================================================
// Pipeline values
// ============================================================================

/// Kind of a listing entry. Only blobs carry retrievable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Other,
}

impl EntryKind {
    /// Map the remote `type` field.
    pub fn from_remote(kind: &str) -> Self {
        match kind {
            "blob" => Self::Blob,
            "tree" => Self::Tree,
            _ => Self::Other,
        }
    }
}

/// One entry of the recursive repository listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePathEntry {
    pub path: String,
    pub kind: EntryKind,
}

impl RemotePathEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }
}

/// Complete listing of a repository snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteListing {
    pub entries: Vec<RemotePathEntry>,
    /// Set when the remote cut the listing short.
    pub truncated: bool,
}

/// Raw content payload of one path, as the remote returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteContent {
    pub encoding: Option<String>,
    pub content: Option<String>,
}

/// A path whose content was fetched and decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedFile {
    pub path: String,
    pub content: String,
}

// ============================================================================
// Filter and skip outcomes
// ============================================================================

/// Why a listing entry was dropped before any content fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterReason {
    /// Not a blob (directory or submodule).
    NotBlob,
    /// A segment matches an excluded directory name.
    ExcludedDir,
    /// The first segment starts with `.`.
    HiddenPath,
    /// The extension is in the binary set.
    BinaryExtension,
}

/// Per-reason counts of filtered entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCounts {
    pub not_blob: usize,
    pub excluded_dir: usize,
    pub hidden_path: usize,
    pub binary_extension: usize,
}

impl FilterCounts {
    pub fn record(&mut self, reason: FilterReason) {
        match reason {
            FilterReason::NotBlob => self.not_blob += 1,
            FilterReason::ExcludedDir => self.excluded_dir += 1,
            FilterReason::HiddenPath => self.hidden_path += 1,
            FilterReason::BinaryExtension => self.binary_extension += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.not_blob + self.excluded_dir + self.hidden_path + self.binary_extension
    }
}

/// Why a filtered path produced no file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum SkipReason {
    /// The request never got a response.
    Transport(String),
    /// The remote answered with a non-success status.
    Status(u16),
    /// The response could not be parsed.
    Malformed(String),
    /// Still rate limited after all retries.
    RateLimited,
    /// The payload used an encoding other than base64.
    UnsupportedEncoding(String),
    /// The payload had no content field.
    MissingContent,
    /// The base64 payload was malformed.
    InvalidBase64(String),
    /// The decoded bytes are not UTF-8 text.
    InvalidUtf8,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::Malformed(msg) => write!(f, "malformed response: {}", msg),
            Self::RateLimited => write!(f, "rate limited"),
            Self::UnsupportedEncoding(enc) => write!(f, "unsupported encoding `{}`", enc),
            Self::MissingContent => write!(f, "missing content"),
            Self::InvalidBase64(msg) => write!(f, "invalid base64: {}", msg),
            Self::InvalidUtf8 => write!(f, "content is not valid UTF-8"),
        }
    }
}

/// A path dropped during retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPath {
    pub path: String,
    pub reason: SkipReason,
}

// ============================================================================
// Import request / outcome
// ============================================================================

/// Input of [`crate::GroveEngine::import`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub repository_full_name: String,
    pub repository_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_kind: Option<TemplateKind>,
}

impl ImportRequest {
    /// Request for a github.com repository with all optional fields unset.
    pub fn github(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            repository_url: format!("https://github.com/{}", full_name),
            repository_full_name: full_name,
            ..Default::default()
        }
    }
}

/// Counters and diagnostics of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Entries in the remote listing.
    pub listed: usize,
    /// Entries dropped by the filter, per reason.
    pub filtered: FilterCounts,
    /// Paths that survived the filter.
    pub candidates: usize,
    /// Paths whose content became a file in the tree.
    pub retrieved: usize,
    /// Paths dropped during retrieval.
    pub skipped: Vec<SkippedPath>,
    /// The remote listing was truncated.
    pub truncated_listing: bool,
    /// Non-fatal problems worth showing to the user.
    pub warnings: Vec<String>,
    /// Wall-clock duration of the import.
    pub duration_ms: u64,
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub workspace: WorkspaceRecord,
    pub summary: ImportSummary,
}

// ============================================================================
// Repository listing
// ============================================================================

/// Owner of a listed repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryOwner {
    pub login: String,
    pub avatar_url: Option<String>,
}

/// Projection of one repository of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub private: bool,
    pub updated_at: Option<String>,
    pub owner: RepositoryOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_kind_parse() {
        assert_eq!("react".parse::<TemplateKind>().unwrap(), TemplateKind::React);
        assert_eq!("NEXTJS".parse::<TemplateKind>().unwrap(), TemplateKind::Nextjs);
        assert_eq!(" Hono ".parse::<TemplateKind>().unwrap(), TemplateKind::Hono);
        let err = "svelte".parse::<TemplateKind>().unwrap_err();
        assert!(err.contains("REACT, NEXTJS, EXPRESS, VUE, HONO, ANGULAR"));
    }

    #[test]
    fn test_template_kind_serde() {
        assert_eq!(
            serde_json::to_string(&TemplateKind::Angular).unwrap(),
            "\"ANGULAR\""
        );
        let kind: TemplateKind = serde_json::from_str("\"EXPRESS\"").unwrap();
        assert_eq!(kind, TemplateKind::Express);
    }

    #[test]
    fn test_repository_reference_requires_fields() {
        assert!(matches!(
            RepositoryReference::new("", "https://github.com/a/b"),
            Err(GroveError::InvalidArgument(_))
        ));
        assert!(matches!(
            RepositoryReference::new("a/b", "  "),
            Err(GroveError::InvalidArgument(_))
        ));
        let repo = RepositoryReference::github("octo/demo").unwrap();
        assert_eq!(repo.url(), "https://github.com/octo/demo");
        assert_eq!(repo.to_string(), "octo/demo");
    }

    #[test]
    fn test_entry_kind_from_remote() {
        assert_eq!(EntryKind::from_remote("blob"), EntryKind::Blob);
        assert_eq!(EntryKind::from_remote("tree"), EntryKind::Tree);
        assert_eq!(EntryKind::from_remote("commit"), EntryKind::Other);
    }

    #[test]
    fn test_skip_reason_serializes_tagged() {
        let skipped = SkippedPath {
            path: "a.txt".to_string(),
            reason: SkipReason::Status(404),
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["reason"]["kind"], "status");
        assert_eq!(json["reason"]["detail"], 404);
    }
}
