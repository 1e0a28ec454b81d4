//! # grove-core
//!
//! Core library of **Grove**: imports a GitHub repository into an editable
//! workspace.
//!
//! The pipeline lists every path of the repository's default branch, filters
//! out dependency folders, hidden top-level paths and binary files, retrieves
//! the remaining file contents on a bounded worker pool, and folds them into a
//! folder/file tree that is stored next to a new workspace record.
//!
//! ## Main Types
//!
//! - [`GroveEngine`] – entry point for imports and workspace queries
//! - [`GroveError`] – domain-specific error type
//! - [`TemplateFolder`] – the hierarchical tree stored with a workspace
//!
//! ## Modules
//!
//! - [`config`] – `GlobalConfig` loaded from `~/.grove/config.yaml`
//! - [`filter`] – path filtering policy
//! - [`listing`] – remote listing fetcher
//! - [`retrieval`] – concurrent content retrieval with rate-limit handling
//! - [`template`] – tree types and the arena tree builder
//! - [`credentials`] – access token providers
//! - [`remote`] / [`remote_adapter`] – hosting service trait and its GitHub binding
//! - [`store_adapter`] – bridge to the `grove-db` record store
//!
//! ## Example
//!
//! ```ignore
//! use grove_core::{GroveEngine, ImportRequest};
//!
//! let engine = GroveEngine::with_defaults()?;
//! let outcome = engine.import("local", ImportRequest::github("octocat/Hello-World"))?;
//! let tree = engine.load_tree(outcome.workspace.id.as_str())?;
//! println!("{} files", tree.file_count());
//! ```

// Modules
pub mod config;
pub mod constants;
pub mod credentials;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod listing;
pub mod remote;
pub mod remote_adapter;
pub mod retrieval;
pub mod store_adapter;
pub mod template;
pub mod types;

// Re-exports for convenience
pub use config::GlobalConfig;
pub use credentials::{AccessToken, CredentialProvider};
pub use engine::GroveEngine;
pub use errors::GroveError;
pub use filter::PathFilter;
pub use remote::{RemoteError, RemoteRepositoryService};
pub use retrieval::RetrievalOptions;
pub use tokio_util::sync::CancellationToken;
pub use template::{fold_tree, TemplateFile, TemplateFolder, TemplateItem};
pub use types::{
    ImportOutcome, ImportRequest, ImportSummary, RepositoryReference, RepositorySummary,
    SkipReason, SkippedPath, TemplateKind,
};

// Storage record types used in the public API.
pub use grove_db::{WorkspaceId, WorkspaceRecord};
