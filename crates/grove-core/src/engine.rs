//! Grove Engine – the orchestrator of the import pipeline.
//!
//! [`GroveEngine`] wires the remote service, the record store and the
//! credential providers together and exposes the user-facing operations:
//! importing a repository, listing the user's repositories, and reading back
//! imported workspaces.

use std::sync::Arc;
use std::time::Instant;

use grove_db::{NewWorkspace, RecordStore, WorkspaceId, WorkspaceRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::GlobalConfig;
use crate::credentials::{
    require_token, AccessToken, ChainCredentials, CredentialProvider, EnvCredentials,
    LinkedAccountCredentials, StaticCredentials,
};
use crate::errors::GroveError;
use crate::filter::PathFilter;
use crate::listing::{fetch_listing, fetch_repositories};
use crate::remote::RemoteRepositoryService;
use crate::remote_adapter::github_client;
use crate::retrieval::{retrieve_contents, RetrievalOptions};
use crate::store_adapter::{from_db_error, open_store};
use crate::template::{fold_tree, TemplateFolder};
use crate::types::{
    ImportOutcome, ImportRequest, ImportSummary, RepositoryReference, RepositorySummary,
};

// ============================================================================
// GroveEngine
// ============================================================================

/// The main engine for Grove operations.
///
/// # Construction
///
/// Use [`GroveEngine::from_global_config`] for typical usage, or
/// [`GroveEngine::new`] to inject custom collaborators in tests.
///
/// # Example
///
/// ```ignore
/// use grove_core::{GroveEngine, GlobalConfig, ImportRequest};
///
/// let engine = GroveEngine::from_global_config(GlobalConfig::load_default()?, None)?;
/// let outcome = engine.import("local", ImportRequest::github("octocat/Hello-World"))?;
/// println!("Imported {} files", outcome.summary.retrieved);
/// ```
pub struct GroveEngine {
    config: GlobalConfig,
    remote: Arc<dyn RemoteRepositoryService>,
    store: Arc<dyn RecordStore>,
    credentials: Arc<dyn CredentialProvider>,
}

impl GroveEngine {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create an engine from explicit collaborators.
    pub fn new(
        config: GlobalConfig,
        remote: Arc<dyn RemoteRepositoryService>,
        store: Arc<dyn RecordStore>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            config,
            remote,
            store,
            credentials,
        }
    }

    /// Create an engine backed by GitHub and the configured record store.
    ///
    /// Credentials are looked up in order: `token_override` (e.g. `--token`),
    /// the environment variable named by `github.tokenEnv`, then the user's
    /// linked GitHub account.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client or the record store cannot be
    /// initialized.
    pub fn from_global_config(
        config: GlobalConfig,
        token_override: Option<String>,
    ) -> anyhow::Result<Self> {
        let remote = Arc::new(github_client(&config.github)?);
        let store = open_store(&config.store)?;

        let mut chain = ChainCredentials::new();
        if let Some(token) = token_override {
            chain = chain.with(StaticCredentials::new(token));
        }
        let chain = chain
            .with(EnvCredentials::new(config.github.token_env.clone()))
            .with(LinkedAccountCredentials::new(Arc::clone(&store)));

        Ok(Self::new(config, remote, store, Arc::new(chain)))
    }

    /// Create an engine with the default configuration file.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let config = GlobalConfig::load_default()?;
        Self::from_global_config(config, None)
    }

    // -------------------------------------------------------------------------
    // Import
    // -------------------------------------------------------------------------

    /// Import a repository into a new workspace owned by `user_id`.
    ///
    /// See [`GroveEngine::import_with_cancel`].
    pub fn import(
        &self,
        user_id: &str,
        request: ImportRequest,
    ) -> Result<ImportOutcome, GroveError> {
        self.import_with_cancel(user_id, request, &CancellationToken::new())
    }

    /// Import a repository, stopping early when `cancel` fires.
    ///
    /// Steps: validate the request, resolve the credential, list the
    /// repository, filter the listing, retrieve contents, fold the tree, then
    /// store the workspace record and its serialized tree.
    ///
    /// # Errors
    ///
    /// - [`GroveError::InvalidArgument`] for a missing user, full name or URL
    /// - [`GroveError::CredentialMissing`] when no token is available
    /// - [`GroveError::UpstreamListing`] when the listing call fails
    /// - [`GroveError::Cancelled`] when `cancel` fires; nothing is stored
    /// - [`GroveError::Persistence`] when storage fails; no partial workspace
    ///   is left behind
    pub fn import_with_cancel(
        &self,
        user_id: &str,
        request: ImportRequest,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, GroveError> {
        let started = Instant::now();

        if user_id.trim().is_empty() {
            return Err(GroveError::InvalidArgument("User id is required.".to_string()));
        }
        let repo = RepositoryReference::new(
            request.repository_full_name.as_str(),
            request.repository_url.as_str(),
        )?;
        let token = self.token_for(user_id)?;

        info!("Importing {} for user `{}`", repo, user_id);

        let listing = fetch_listing(self.remote.as_ref(), &repo, &token)?;
        if cancel.is_cancelled() {
            return Err(GroveError::Cancelled);
        }

        let filter = PathFilter::from_config(&self.config.import);
        let filtered = filter.apply(&listing.entries);
        debug!(
            "{} of {} entries survive the filter",
            filtered.kept.len(),
            listing.entries.len()
        );

        let options = RetrievalOptions::from_config(&self.config.import);
        let report = retrieve_contents(
            self.remote.as_ref(),
            &repo,
            &token,
            &filtered.kept,
            &options,
            cancel,
        )?;

        let mut summary = ImportSummary {
            listed: listing.entries.len(),
            filtered: filtered.counts,
            candidates: filtered.kept.len(),
            retrieved: report.files.len(),
            skipped: report.skipped,
            truncated_listing: listing.truncated,
            warnings: Vec::new(),
            duration_ms: 0,
        };
        if listing.truncated {
            summary.warnings.push(format!(
                "The listing of {} was truncated by GitHub; some files are missing.",
                repo
            ));
        }
        if summary.candidates > 0 && summary.retrieved == 0 {
            warn!("None of the {} files of {} could be retrieved", summary.candidates, repo);
            summary.warnings.push(format!(
                "None of the {} files could be retrieved; the workspace is empty.",
                summary.candidates
            ));
        } else if !summary.skipped.is_empty() {
            summary.warnings.push(format!(
                "{} of {} files were skipped.",
                summary.skipped.len(),
                summary.candidates
            ));
        }

        let tree = fold_tree(&self.config.import.root_folder_name, report.files);
        let serialized = tree.to_json()?;

        if cancel.is_cancelled() {
            return Err(GroveError::Cancelled);
        }

        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| repo.full_name().to_string());
        let template_kind = request
            .template_kind
            .unwrap_or(self.config.import.default_template);

        let workspace = self.persist(
            NewWorkspace {
                title,
                description: request.description.filter(|d| !d.trim().is_empty()),
                template_kind: template_kind.to_string(),
                repository_full_name: repo.full_name().to_string(),
                repository_url: repo.url().to_string(),
                user_id: user_id.to_string(),
            },
            &serialized,
        )?;

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Imported {} into workspace {} ({} files, {} skipped, {} filtered) in {}ms",
            repo,
            workspace.id,
            summary.retrieved,
            summary.skipped.len(),
            summary.filtered.total(),
            summary.duration_ms
        );

        Ok(ImportOutcome { workspace, summary })
    }

    /// Store the workspace and its tree as a unit.
    ///
    /// If the tree cannot be saved, the freshly created workspace is deleted.
    fn persist(
        &self,
        new: NewWorkspace,
        serialized: &str,
    ) -> Result<WorkspaceRecord, GroveError> {
        let workspace = self.store.create_workspace(new).map_err(from_db_error)?;

        if let Err(err) = self.store.save_template(&workspace.id, serialized) {
            warn!(
                "Saving the tree of workspace {} failed, removing the workspace: {}",
                workspace.id, err
            );
            if let Err(rollback) = self.store.delete_workspace(&workspace.id) {
                error!(
                    "Could not remove workspace {} after a failed save: {}",
                    workspace.id, rollback
                );
            }
            return Err(from_db_error(err));
        }

        Ok(workspace)
    }

    fn token_for(&self, user_id: &str) -> Result<AccessToken, GroveError> {
        require_token(user_id, self.credentials.access_token(user_id)?)
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    /// List up to 100 repositories visible to the user's GitHub account.
    pub fn list_repositories(&self, user_id: &str) -> Result<Vec<RepositorySummary>, GroveError> {
        let token = self.token_for(user_id)?;
        fetch_repositories(self.remote.as_ref(), &token)
    }

    // -------------------------------------------------------------------------
    // Workspaces
    // -------------------------------------------------------------------------

    /// Workspaces owned by `user_id`, oldest first.
    pub fn list_workspaces(&self, user_id: &str) -> Result<Vec<WorkspaceRecord>, GroveError> {
        self.store.list_workspaces(user_id).map_err(from_db_error)
    }

    /// Fetch one workspace record.
    pub fn get_workspace(&self, id: &str) -> Result<WorkspaceRecord, GroveError> {
        self.store
            .get_workspace(&WorkspaceId::new(id))
            .map_err(from_db_error)?
            .ok_or_else(|| GroveError::WorkspaceNotFound(id.to_string()))
    }

    /// Load and parse the template tree of a workspace.
    pub fn load_tree(&self, id: &str) -> Result<TemplateFolder, GroveError> {
        let template = self
            .store
            .load_template(&WorkspaceId::new(id))
            .map_err(from_db_error)?
            .ok_or_else(|| GroveError::WorkspaceNotFound(id.to_string()))?;
        Ok(TemplateFolder::from_json(&template.content)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
