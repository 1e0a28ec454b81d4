//! Record store trait.
//!
//! This is the persistence seam used by `grove-core`. A workspace record and
//! its template are written by two separate calls; callers that need both or
//! neither remove the workspace again when the template write fails.

use crate::error::DbResult;
use crate::records::{LinkedAccount, NewWorkspace, TemplateRecord, WorkspaceId, WorkspaceRecord};

/// Trait for workspace/template persistence backends.
///
/// Implementations must be `Send + Sync` so a single store can be shared by
/// the engine and any worker threads.
pub trait RecordStore: Send + Sync {
    /// Backend name, e.g. `file` or `memory`.
    fn backend_name(&self) -> &str;

    /// Create a workspace record and return it with its assigned id.
    fn create_workspace(&self, new: NewWorkspace) -> DbResult<WorkspaceRecord>;

    /// Attach the serialized template tree to an existing workspace.
    ///
    /// Fails with `RecordNotFound` when the workspace does not exist.
    fn save_template(&self, workspace_id: &WorkspaceId, content: &str)
        -> DbResult<TemplateRecord>;

    /// Delete a workspace and its template. Returns whether a record existed.
    fn delete_workspace(&self, workspace_id: &WorkspaceId) -> DbResult<bool>;

    /// Fetch a workspace by id.
    fn get_workspace(&self, workspace_id: &WorkspaceId) -> DbResult<Option<WorkspaceRecord>>;

    /// Fetch the template attached to a workspace.
    fn load_template(&self, workspace_id: &WorkspaceId) -> DbResult<Option<TemplateRecord>>;

    /// List the workspaces owned by a user, oldest first.
    fn list_workspaces(&self, user_id: &str) -> DbResult<Vec<WorkspaceRecord>>;

    /// Look up the account a user linked for a provider.
    fn find_account(&self, user_id: &str, provider: &str) -> DbResult<Option<LinkedAccount>>;

    /// Insert or replace the linked account for `(user_id, provider)`.
    fn upsert_account(&self, account: LinkedAccount) -> DbResult<()>;
}
