//! The workspace store: the entry point callers use to create, read and
//! admit batch spec workspaces.

use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::clock::{Clock, SystemClock};
use crate::db::{batch_spec_repo, repository_repo, visibility, workspace_repo};
use crate::db::{Database, DatabaseError};
use crate::pagination::{Page, PageRequest};
use crate::types::{BatchSpec, BatchSpecPolicy, BatchSpecWorkspace, Repo};

pub use crate::db::workspace_repo::WorkspaceFilter;

/// Options for [`Store::get_batch_spec_workspace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetBatchSpecWorkspaceOpts {
    pub id: i64,
}

/// Options for [`Store::list_batch_spec_workspaces`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBatchSpecWorkspacesOpts {
    pub filter: WorkspaceFilter,
    pub page: PageRequest,
}

impl ListBatchSpecWorkspacesOpts {
    pub fn for_batch_spec(batch_spec_id: i64) -> Self {
        Self {
            filter: WorkspaceFilter {
                batch_spec_id: Some(batch_spec_id),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.page.limit = limit;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<i64>) -> Self {
        self.page.cursor = cursor;
        self
    }
}

/// Options for [`Store::count_batch_spec_workspaces`]. Pagination does not
/// apply to counting.
pub type CountBatchSpecWorkspacesOpts = WorkspaceFilter;

/// Cloneable handle over the database and the clock that stamps rows.
#[derive(Clone)]
pub struct Store {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Registers a repository.
    pub fn create_repo(
        &self,
        name: &str,
        external_service_kind: &str,
    ) -> Result<Repo, DatabaseError> {
        repository_repo::insert(&self.db, name, external_service_kind, self.clock.now())
    }

    /// Soft-deletes a repository. Its workspaces stay stored but disappear
    /// from every read.
    pub fn delete_repo(&self, id: i64) -> Result<(), DatabaseError> {
        repository_repo::soft_delete(&self.db, id, self.clock.now())?;
        info!(repo_id = id, "Repository soft-deleted");
        Ok(())
    }

    /// Clears a repository's deletion mark. Its workspaces become readable
    /// again.
    pub fn restore_repo(&self, id: i64) -> Result<(), DatabaseError> {
        repository_repo::restore(&self.db, id)?;
        info!(repo_id = id, "Repository restored");
        Ok(())
    }

    pub fn get_repo(&self, id: i64) -> Result<Repo, DatabaseError> {
        repository_repo::find_by_id(&self.db, id)?.ok_or(DatabaseError::NotFound)
    }

    pub fn is_repo_visible(&self, id: i64) -> Result<bool, DatabaseError> {
        visibility::is_repo_visible(&self.db, id)
    }

    pub fn create_batch_spec(&self, spec: &BatchSpec) -> Result<BatchSpec, DatabaseError> {
        batch_spec_repo::insert(&self.db, spec, self.clock.now())
    }

    pub fn get_batch_spec(&self, id: i64) -> Result<BatchSpec, DatabaseError> {
        batch_spec_repo::find_by_id(&self.db, id)?.ok_or(DatabaseError::NotFound)
    }

    pub fn get_batch_spec_policy(&self, id: i64) -> Result<BatchSpecPolicy, DatabaseError> {
        Ok(self.get_batch_spec(id)?.policy())
    }

    /// Persists a new workspace and returns it with `id`, `created_at` and
    /// `updated_at` filled in. Any `id` or `skipped` value on the input is
    /// ignored.
    pub fn create_batch_spec_workspace(
        &self,
        workspace: BatchSpecWorkspace,
    ) -> Result<BatchSpecWorkspace, DatabaseError> {
        let now = self.clock.now();
        let id = workspace_repo::insert(&self.db, &workspace, now)?;
        debug!(
            workspace_id = id,
            batch_spec_id = workspace.batch_spec_id,
            repo_id = workspace.repo_id,
            "Created batch spec workspace"
        );
        Ok(BatchSpecWorkspace {
            id,
            skipped: false,
            created_at: now,
            updated_at: now,
            ..workspace
        })
    }

    /// Returns the workspace, or `NotFound` if it does not exist or its
    /// repository is deleted.
    pub fn get_batch_spec_workspace(
        &self,
        opts: GetBatchSpecWorkspaceOpts,
    ) -> Result<BatchSpecWorkspace, DatabaseError> {
        workspace_repo::find_visible_by_id(&self.db, opts.id)?.ok_or(DatabaseError::NotFound)
    }

    pub fn list_batch_spec_workspaces(
        &self,
        opts: &ListBatchSpecWorkspacesOpts,
    ) -> Result<Page<BatchSpecWorkspace>, DatabaseError> {
        workspace_repo::list(&self.db, &opts.filter, opts.page)
    }

    pub fn count_batch_spec_workspaces(
        &self,
        opts: &CountBatchSpecWorkspacesOpts,
    ) -> Result<u64, DatabaseError> {
        workspace_repo::count(&self.db, opts)
    }

    /// Stamps every workspace of the batch spec with its skip decision.
    /// Safe to call repeatedly.
    pub fn mark_skipped_batch_spec_workspaces(
        &self,
        batch_spec_id: i64,
    ) -> Result<(), DatabaseError> {
        let _span = info_span!("mark_skipped_batch_spec_workspaces", batch_spec_id).entered();
        let changed = workspace_repo::mark_skipped(&self.db, batch_spec_id, self.clock.now())?;
        info!(changed, "Applied workspace skip decisions");
        Ok(())
    }
}
