//! # grove-db
//!
//! Persistence layer for Grove: workspace records, their serialized
//! templates, and linked provider accounts.
//!
//! The domain logic in `grove-core` only sees the [`RecordStore`] trait, so
//! backends can be swapped without touching the import pipeline.
//!
//! ## Architecture
//!
//! ```text
//! grove-cli → grove-core → (traits)
//!                 ↑
//!              grove-db     (implements RecordStore)
//!              grove-github (implements the remote listing calls)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use grove_db::{open_record_store, StoreConfig};
//!
//! let store = open_record_store(&StoreConfig::file("/path/to/data"))?;
//! let workspace = store.create_workspace(new_workspace)?;
//! store.save_template(&workspace.id, &serialized_tree)?;
//! ```

pub mod backend;
pub mod error;
pub mod records;
pub mod store;

pub use backend::{
    available_backends, open_record_store, FileRecordStore, MemoryRecordStore, StoreConfig,
    DEFAULT_BACKEND,
};
pub use error::{DbError, DbResult};
pub use records::{LinkedAccount, NewWorkspace, TemplateRecord, WorkspaceId, WorkspaceRecord};
pub use store::RecordStore;
