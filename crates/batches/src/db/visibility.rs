//! Repository visibility.
//!
//! A workspace is readable only while its repository is not soft-deleted.
//! Every workspace read goes through [`VISIBLE_REPO_JOIN`] so the rule lives
//! in one place. The row itself is never touched; reads simply behave as if
//! it did not exist.

use rusqlite::{params, Connection, OptionalExtension};

use super::{Database, DatabaseError};

/// Inner join restricting `batch_spec_workspaces` rows to live repositories.
pub(crate) const VISIBLE_REPO_JOIN: &str =
    "JOIN repos ON repos.id = batch_spec_workspaces.repo_id AND repos.deleted_at IS NULL";

/// Whether `repo_id` currently denotes a non-deleted repository.
pub fn is_repo_visible(db: &Database, repo_id: i64) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let visible = conn
            .query_row(
                "SELECT 1 FROM repos WHERE id = ?1 AND deleted_at IS NULL",
                params![repo_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(visible)
    })
}

/// Whether a repository row exists at all, deleted or not. Used for the
/// write-time reference check.
pub(crate) fn repo_exists(conn: &Connection, repo_id: i64) -> Result<bool, DatabaseError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM repos WHERE id = ?1",
            params![repo_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(exists)
}
