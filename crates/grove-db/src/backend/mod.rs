//! Record store backend implementations.
//!
//! ## Available Backends
//!
//! - `file` (default): JSONL tables under a data directory
//! - `memory`: nothing persisted, for tests and dry runs

mod file;
mod memory;

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::RecordStore;

/// Default backend name.
pub const DEFAULT_BACKEND: &str = "file";

/// Configuration for opening a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend name (`file` or `memory`).
    pub backend: String,
    /// Data directory. Ignored by the memory backend.
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(backend: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            backend: backend.into(),
            path: path.into(),
        }
    }

    /// File-backed store at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(DEFAULT_BACKEND, path)
    }
}

/// Open a record store with the given configuration.
///
/// # Errors
///
/// Returns an error if the backend is unknown or the data directory cannot
/// be created or read.
pub fn open_record_store(config: &StoreConfig) -> DbResult<Arc<dyn RecordStore>> {
    debug!(
        "Opening record store (backend={}, path={:?})",
        config.backend, config.path
    );

    match config.backend.as_str() {
        "file" => Ok(Arc::new(FileRecordStore::open(&config.path)?)),
        "memory" => Ok(Arc::new(MemoryRecordStore::new())),
        backend => Err(DbError::Config {
            message: format!(
                "Unknown store backend: '{}'. Available backends: {}",
                backend,
                available_backends().join(", ")
            ),
        }),
    }
}

/// Names of the backends compiled into this crate.
pub fn available_backends() -> Vec<&'static str> {
    vec!["file", "memory"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_file_backend() {
        let temp = TempDir::new().unwrap();
        let store = open_record_store(&StoreConfig::file(temp.path().join("data"))).unwrap();
        assert_eq!(store.backend_name(), "file");
        assert!(temp.path().join("data").is_dir());
    }

    #[test]
    fn test_open_memory_backend() {
        let store = open_record_store(&StoreConfig::new("memory", "/unused")).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = open_record_store(&StoreConfig::new("postgres", "/tmp")).err().unwrap();
        assert!(err.to_string().contains("Available backends: file, memory"));
    }
}
