//! Lazily resolved workspace listings.
//!
//! A [`WorkspaceConnection`] describes one page of a listing. Its nodes,
//! total count and page info are each loaded at most once, on first use,
//! and every caller (including concurrent ones) sees the same result. A
//! failed load is remembered too; the error is shared rather than retried.

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::db::DatabaseError;
use crate::pagination::Page;
use crate::store::{ListBatchSpecWorkspacesOpts, Store};
use crate::types::BatchSpecWorkspace;

pub type SharedError = Arc<DatabaseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    Pending,
    Ready,
    Failed,
}

/// A value computed at most once. Concurrent callers block on the first
/// computation instead of starting their own.
pub struct Memo<T> {
    cell: OnceLock<Result<T, SharedError>>,
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get_or_compute<F>(&self, compute: F) -> Result<&T, SharedError>
    where
        F: FnOnce() -> Result<T, DatabaseError>,
    {
        self.cell
            .get_or_init(|| compute().map_err(Arc::new))
            .as_ref()
            .map_err(Arc::clone)
    }

    pub fn state(&self) -> MemoState {
        match self.cell.get() {
            None => MemoState::Pending,
            Some(Ok(_)) => MemoState::Ready,
            Some(Err(_)) => MemoState::Failed,
        }
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    /// Opaque cursor to pass back for the following page.
    pub end_cursor: Option<String>,
}

pub struct WorkspaceConnection {
    store: Store,
    opts: ListBatchSpecWorkspacesOpts,
    page: Memo<Page<BatchSpecWorkspace>>,
    total: Memo<u64>,
}

impl WorkspaceConnection {
    pub fn new(store: Store, opts: ListBatchSpecWorkspacesOpts) -> Self {
        Self {
            store,
            opts,
            page: Memo::new(),
            total: Memo::new(),
        }
    }

    fn page(&self) -> Result<&Page<BatchSpecWorkspace>, SharedError> {
        self.page
            .get_or_compute(|| self.store.list_batch_spec_workspaces(&self.opts))
    }

    pub fn nodes(&self) -> Result<&[BatchSpecWorkspace], SharedError> {
        Ok(&self.page()?.items)
    }

    pub fn total_count(&self) -> Result<u64, SharedError> {
        self.total
            .get_or_compute(|| self.store.count_batch_spec_workspaces(&self.opts.filter))
            .copied()
    }

    pub fn page_info(&self) -> Result<PageInfo, SharedError> {
        let page = self.page()?;
        Ok(PageInfo {
            has_next_page: page.has_next_page(),
            end_cursor: page.next_cursor.map(|c| c.to_string()),
        })
    }

    pub fn page_state(&self) -> MemoState {
        self.page.state()
    }
}

/// Parses a cursor produced by [`PageInfo::end_cursor`].
pub fn parse_cursor(cursor: &str) -> Option<i64> {
    cursor.parse::<i64>().ok().filter(|c| *c > 0)
}
