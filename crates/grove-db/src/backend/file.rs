//! File-based record store.
//!
//! Each table lives in a JSONL file under the store directory and is held in
//! memory between writes. Every mutation rewrites the affected table through a
//! temporary file followed by a rename, so a crash never leaves a half-written
//! table behind.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{DbError, DbResult};
use crate::records::{LinkedAccount, NewWorkspace, TemplateRecord, WorkspaceId, WorkspaceRecord};
use crate::store::RecordStore;

const WORKSPACES_FILENAME: &str = "workspaces.jsonl";
const TEMPLATES_FILENAME: &str = "templates.jsonl";
const ACCOUNTS_FILENAME: &str = "accounts.jsonl";

struct Tables {
    workspaces: HashMap<WorkspaceId, WorkspaceRecord>,
    templates: HashMap<WorkspaceId, TemplateRecord>,
    accounts: Vec<LinkedAccount>,
}

/// Record store persisted as JSONL files.
pub struct FileRecordStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FileRecordStore {
    /// Open the store at `path`, creating the directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        debug!("Opening FileRecordStore at {:?}", path);
        std::fs::create_dir_all(&path)
            .map_err(|e| DbError::record_io(&path, e.to_string()))?;

        let workspaces: Vec<WorkspaceRecord> = load_jsonl(&path.join(WORKSPACES_FILENAME))?;
        let templates: Vec<TemplateRecord> = load_jsonl(&path.join(TEMPLATES_FILENAME))?;
        let accounts: Vec<LinkedAccount> = load_jsonl(&path.join(ACCOUNTS_FILENAME))?;

        debug!(
            "Loaded {} workspaces, {} templates, {} accounts",
            workspaces.len(),
            templates.len(),
            accounts.len()
        );

        Ok(Self {
            path,
            tables: RwLock::new(Tables {
                workspaces: workspaces.into_iter().map(|w| (w.id.clone(), w)).collect(),
                templates: templates
                    .into_iter()
                    .map(|t| (t.workspace_id.clone(), t))
                    .collect(),
                accounts,
            }),
        })
    }

    /// Directory holding the table files.
    pub fn path(&self) -> &Path {
        &self.path
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

    fn save_workspaces(&self, tables: &Tables) -> DbResult<()> {
        let mut rows: Vec<&WorkspaceRecord> = tables.workspaces.values().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        write_jsonl(&self.path.join(WORKSPACES_FILENAME), rows)
    }

    fn save_templates(&self, tables: &Tables) -> DbResult<()> {
        let mut rows: Vec<&TemplateRecord> = tables.templates.values().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        write_jsonl(&self.path.join(TEMPLATES_FILENAME), rows)
    }

    fn save_accounts(&self, tables: &Tables) -> DbResult<()> {
        write_jsonl(&self.path.join(ACCOUNTS_FILENAME), tables.accounts.iter())
    }
}

impl RecordStore for FileRecordStore {
    fn backend_name(&self) -> &str {
        "file"
    }

    fn create_workspace(&self, new: NewWorkspace) -> DbResult<WorkspaceRecord> {
        new.validate()?;
        let record = WorkspaceRecord::from_new(new);
        trace!("file: create workspace {}", record.id);

        let mut tables = self.write()?;
        tables.workspaces.insert(record.id.clone(), record.clone());
        if let Err(e) = self.save_workspaces(&tables) {
            tables.workspaces.remove(&record.id);
            return Err(e);
        }
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
        let previous = tables.templates.insert(workspace_id.clone(), record.clone());
        if let Err(e) = self.save_templates(&tables) {
            match previous {
                Some(prev) => tables.templates.insert(workspace_id.clone(), prev),
                None => tables.templates.remove(workspace_id),
            };
            return Err(e);
        }
        Ok(record)
    }

    fn delete_workspace(&self, workspace_id: &WorkspaceId) -> DbResult<bool> {
        let mut tables = self.write()?;
        let had_template = tables.templates.remove(workspace_id).is_some();
        let existed = tables.workspaces.remove(workspace_id).is_some();
        if had_template {
            self.save_templates(&tables)?;
        }
        if existed {
            self.save_workspaces(&tables)?;
        }
        Ok(existed)
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
        self.save_accounts(&tables)
    }
}

/// Read every valid row of a JSONL file. A missing file is an empty table.
fn load_jsonl<T: DeserializeOwned>(path: &Path) -> DbResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).map_err(|e| DbError::record_io(path, e.to_string()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DbError::record_io(path, e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Skipping invalid line {} of {:?}: {}", line_num + 1, path, e);
            }
        }
    }
    Ok(rows)
}

fn write_jsonl<'a, T, I>(path: &Path, rows: I) -> DbResult<()>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let tmp_path = path.with_extension("jsonl.tmp");
    {
        let mut file =
            File::create(&tmp_path).map_err(|e| DbError::record_io(&tmp_path, e.to_string()))?;
        for row in rows {
            let line = serde_json::to_string(row)?;
            writeln!(file, "{}", line).map_err(|e| DbError::record_io(&tmp_path, e.to_string()))?;
        }
        file.sync_all()
            .map_err(|e| DbError::record_io(&tmp_path, e.to_string()))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| DbError::record_io(path, e.to_string()))?;
    Ok(())
}
