//! In-memory record store.
//!
//! Nothing is written to disk. Used by tests and by `--store memory` runs.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::trace;

use crate::error::{DbError, DbResult};
use crate::records::{LinkedAccount, NewWorkspace, TemplateRecord, WorkspaceId, WorkspaceRecord};
use crate::store::RecordStore;

#[derive(Default)]
struct Tables {
    workspaces: HashMap<WorkspaceId, WorkspaceRecord>,
    templates: HashMap<WorkspaceId, TemplateRecord>,
    accounts: Vec<LinkedAccount>,
}

/// Record store kept entirely in memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DbResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| DbError::internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> DbResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| DbError::internal(format!("Failed to acquire write lock: {}", e)))
    }
}

impl RecordStore for MemoryRecordStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn create_workspace(&self, new: NewWorkspace) -> DbResult<WorkspaceRecord> {
        new.validate()?;
        let record = WorkspaceRecord::from_new(new);
        trace!("memory: create workspace {}", record.id);
        self.write()?
            .workspaces
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn save_template(
        &self,
        workspace_id: &WorkspaceId,
        content: &str,
    ) -> DbResult<TemplateRecord> {
        let mut tables = self.write()?;
        if !tables.workspaces.contains_key(workspace_id) {
            return Err(DbError::not_found("workspace", workspace_id.as_str()));
        }
        let record = TemplateRecord {
            workspace_id: workspace_id.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        tables.templates.insert(workspace_id.clone(), record.clone());
        Ok(record)
    }

    fn delete_workspace(&self, workspace_id: &WorkspaceId) -> DbResult<bool> {
        let mut tables = self.write()?;
        tables.templates.remove(workspace_id);
        Ok(tables.workspaces.remove(workspace_id).is_some())
    }

    fn get_workspace(&self, workspace_id: &WorkspaceId) -> DbResult<Option<WorkspaceRecord>> {
        Ok(self.read()?.workspaces.get(workspace_id).cloned())
    }

    fn load_template(&self, workspace_id: &WorkspaceId) -> DbResult<Option<TemplateRecord>> {
        Ok(self.read()?.templates.get(workspace_id).cloned())
    }

    fn list_workspaces(&self, user_id: &str) -> DbResult<Vec<WorkspaceRecord>> {
        let tables = self.read()?;
        let mut records: Vec<WorkspaceRecord> = tables
            .workspaces
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    fn find_account(&self, user_id: &str, provider: &str) -> DbResult<Option<LinkedAccount>> {
        Ok(self
            .read()?
            .accounts
            .iter()
            .find(|a| a.user_id == user_id && a.provider == provider)
            .cloned())
    }

    fn upsert_account(&self, account: LinkedAccount) -> DbResult<()> {
        let mut tables = self.write()?;
        tables
            .accounts
            .retain(|a| !(a.user_id == account.user_id && a.provider == account.provider));
        tables.accounts.push(account);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_workspace(user: &str) -> NewWorkspace {
        NewWorkspace {
            title: "demo".to_string(),
            description: Some("imported".to_string()),
            template_kind: "REACT".to_string(),
            repository_full_name: "octo/demo".to_string(),
            repository_url: "https://github.com/octo/demo".to_string(),
            user_id: user.to_string(),
        }
    }

    #[test]
    fn test_create_then_save_template() {
        let store = MemoryRecordStore::new();
        let ws = store.create_workspace(new_workspace("u1")).unwrap();
        store.save_template(&ws.id, "{\"folderName\":\"Root\"}").unwrap();

        let loaded = store.load_template(&ws.id).unwrap().unwrap();
        assert_eq!(loaded.content, "{\"folderName\":\"Root\"}");
        assert_eq!(store.get_workspace(&ws.id).unwrap(), Some(ws));
    }

    #[test]
    fn test_save_template_requires_workspace() {
        let store = MemoryRecordStore::new();
        let err = store
            .save_template(&WorkspaceId::new("missing"), "{}")
            .unwrap_err();
        assert!(matches!(err, DbError::RecordNotFound { .. }));
    }

    #[test]
    fn test_delete_removes_template() {
        let store = MemoryRecordStore::new();
        let ws = store.create_workspace(new_workspace("u1")).unwrap();
        store.save_template(&ws.id, "{}").unwrap();

        assert!(store.delete_workspace(&ws.id).unwrap());
        assert!(store.load_template(&ws.id).unwrap().is_none());
        assert!(!store.delete_workspace(&ws.id).unwrap());
    }

    #[test]
    fn test_list_is_scoped_to_user() {
        let store = MemoryRecordStore::new();
        store.create_workspace(new_workspace("u1")).unwrap();
        store.create_workspace(new_workspace("u2")).unwrap();
        store.create_workspace(new_workspace("u1")).unwrap();

        assert_eq!(store.list_workspaces("u1").unwrap().len(), 2);
        assert_eq!(store.list_workspaces("u3").unwrap().len(), 0);
    }

    #[test]
    fn test_upsert_account_replaces() {
        let store = MemoryRecordStore::new();
        for token in ["a", "b"] {
            store
                .upsert_account(LinkedAccount {
                    user_id: "u1".to_string(),
                    provider: "github".to_string(),
                    access_token: Some(token.to_string()),
                })
                .unwrap();
        }
        let account = store.find_account("u1", "github").unwrap().unwrap();
        assert_eq!(account.access_token.as_deref(), Some("b"));
        assert!(store.find_account("u1", "gitlab").unwrap().is_none());
    }
}
