//! Adapter layer for grove-db.
//!
//! Converts storage errors into [`GroveError`] and opens the configured
//! record store.

use std::sync::Arc;

use grove_db::{open_record_store, DbError, RecordStore, StoreConfig};

use crate::config::StoreSection;
use crate::errors::GroveError;

/// Convert a grove-db error to a grove-core error.
pub fn from_db_error(err: DbError) -> GroveError {
    match err {
        DbError::RecordNotFound { kind, id } => {
            GroveError::Persistence(format!("{} record `{}` not found", kind, id))
        }
        DbError::Config { message } => GroveError::InvalidConfiguration {
            message,
            hint: "Check the store section of the config file".to_string(),
        },
        other => GroveError::Persistence(other.to_string()),
    }
}

/// Open the record store described by the `store` config section.
pub fn open_store(section: &StoreSection) -> Result<Arc<dyn RecordStore>, GroveError> {
    let config = StoreConfig::new(section.backend.clone(), section.resolved_data_dir());
    open_record_store(&config).map_err(from_db_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_store_from_section() {
        let temp = TempDir::new().unwrap();
        let section = StoreSection {
            backend: "file".to_string(),
            data_dir: Some(temp.path().join("data")),
        };
        let store = open_store(&section).unwrap();
        assert_eq!(store.backend_name(), "file");
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            from_db_error(DbError::not_found("workspace", "abc")),
            GroveError::Persistence(_)
        ));
        assert!(matches!(
            from_db_error(DbError::Config {
                message: "bad".to_string()
            }),
            GroveError::InvalidConfiguration { .. }
        ));
    }
}
