//! Workspace repository — persistence for the `batch_spec_workspaces` table.
//!
//! Every read joins through [`VISIBLE_REPO_JOIN`]. The skip pass is the only
//! write besides insert and reads the table without that join.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::batch_spec_repo;
use super::columns::{format_timestamp, json, timestamp, to_json};
use super::filter::SqlFilter;
use super::visibility::{repo_exists, VISIBLE_REPO_JOIN};
use super::{Database, DatabaseError};
use crate::pagination::{Page, PageRequest};
use crate::skip::{should_skip, SkipInputs};
use crate::types::BatchSpecWorkspace;

const WORKSPACE_COLUMNS: &str = "batch_spec_workspaces.id AS id,
    batch_spec_workspaces.batch_spec_id AS batch_spec_id,
    batch_spec_workspaces.changeset_spec_ids AS changeset_spec_ids,
    batch_spec_workspaces.repo_id AS repo_id,
    batch_spec_workspaces.branch AS branch,
    batch_spec_workspaces.commit_hash AS commit_hash,
    batch_spec_workspaces.path AS path,
    batch_spec_workspaces.file_matches AS file_matches,
    batch_spec_workspaces.steps AS steps,
    batch_spec_workspaces.only_fetch_workspace AS only_fetch_workspace,
    batch_spec_workspaces.unsupported AS unsupported,
    batch_spec_workspaces.ignored AS ignored,
    batch_spec_workspaces.skipped AS skipped,
    batch_spec_workspaces.created_at AS created_at,
    batch_spec_workspaces.updated_at AS updated_at";

fn workspace_from_row(row: &Row<'_>) -> Result<BatchSpecWorkspace, rusqlite::Error> {
    Ok(BatchSpecWorkspace {
        id: row.get("id")?,
        batch_spec_id: row.get("batch_spec_id")?,
        changeset_spec_ids: json(row, "changeset_spec_ids")?,
        repo_id: row.get("repo_id")?,
        branch: row.get("branch")?,
        commit: row.get("commit_hash")?,
        path: row.get("path")?,
        file_matches: json(row, "file_matches")?,
        steps: json(row, "steps")?,
        only_fetch_workspace: row.get("only_fetch_workspace")?,
        unsupported: row.get("unsupported")?,
        ignored: row.get("ignored")?,
        skipped: row.get("skipped")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

/// Filters shared by listing and counting. Both are applied with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceFilter {
    pub batch_spec_id: Option<i64>,
    /// Empty means no restriction.
    #[serde(default)]
    pub ids: Vec<i64>,
}

impl WorkspaceFilter {
    fn apply(&self, filter: &mut SqlFilter) {
        if let Some(batch_spec_id) = self.batch_spec_id {
            filter.eq("batch_spec_workspaces.batch_spec_id", batch_spec_id);
        }
        filter.in_list("batch_spec_workspaces.id", &self.ids);
    }
}

/// Inserts a workspace after checking that its repository and batch spec
/// exist. Returns the assigned ID.
///
/// `skipped` is always stored as false; only [`mark_skipped`] writes it.
pub fn insert(
    db: &Database,
    workspace: &BatchSpecWorkspace,
    now: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    let changeset_spec_ids = to_json(&workspace.changeset_spec_ids, "changeset_spec_ids")?;
    let file_matches = to_json(&workspace.file_matches, "file_matches")?;
    let steps = to_json(&workspace.steps, "steps")?;

    db.with_conn(|conn| {
        if !repo_exists(conn, workspace.repo_id)? {
            return Err(DatabaseError::ReferentialIntegrity {
                entity: "repo",
                id: workspace.repo_id,
            });
        }
        if !batch_spec_repo::exists(conn, workspace.batch_spec_id)? {
            return Err(DatabaseError::ReferentialIntegrity {
                entity: "batch spec",
                id: workspace.batch_spec_id,
            });
        }

        let now = format_timestamp(now);
        conn.execute(
            "INSERT INTO batch_spec_workspaces (batch_spec_id, changeset_spec_ids, repo_id,
             branch, commit_hash, path, file_matches, steps, only_fetch_workspace,
             unsupported, ignored, skipped, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12, ?12)",
            params![
                workspace.batch_spec_id,
                changeset_spec_ids,
                workspace.repo_id,
                workspace.branch,
                workspace.commit,
                workspace.path,
                file_matches,
                steps,
                workspace.only_fetch_workspace,
                workspace.unsupported,
                workspace.ignored,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Finds a workspace by ID if its repository is not deleted.
pub fn find_visible_by_id(
    db: &Database,
    id: i64,
) -> Result<Option<BatchSpecWorkspace>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT {} FROM batch_spec_workspaces {} WHERE batch_spec_workspaces.id = ?1",
            WORKSPACE_COLUMNS, VISIBLE_REPO_JOIN
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], workspace_from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists visible workspaces in ascending ID order, one page at a time.
pub fn list(
    db: &Database,
    filter: &WorkspaceFilter,
    page: PageRequest,
) -> Result<Page<BatchSpecWorkspace>, DatabaseError> {
    db.with_conn(|conn| {
        let mut sql_filter = SqlFilter::default();
        filter.apply(&mut sql_filter);
        if let Some(cursor) = page.cursor {
            sql_filter.ge("batch_spec_workspaces.id", cursor);
        }

        let limit_clause = match page.fetch_limit() {
            Some(limit) => format!("LIMIT {}", sql_filter.bind(limit)),
            None => String::new(),
        };

        let sql = format!(
            "SELECT {} FROM batch_spec_workspaces {} {} ORDER BY batch_spec_workspaces.id ASC {}",
            WORKSPACE_COLUMNS,
            VISIBLE_REPO_JOIN,
            sql_filter.where_clause(),
            limit_clause
        );

        let params_ref = sql_filter.params();
        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<BatchSpecWorkspace> = stmt
            .query_map(params_ref.as_slice(), workspace_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(page.finish(rows, |w| w.id))
    })
}

/// Counts visible workspaces matching `filter`.
pub fn count(db: &Database, filter: &WorkspaceFilter) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let mut sql_filter = SqlFilter::default();
        filter.apply(&mut sql_filter);

        let sql = format!(
            "SELECT COUNT(*) FROM batch_spec_workspaces {} {}",
            VISIBLE_REPO_JOIN,
            sql_filter.where_clause()
        );
        let params_ref = sql_filter.params();
        let total: u64 = conn.query_row(&sql, params_ref.as_slice(), |r| r.get(0))?;
        Ok(total)
    })
}

/// Recomputes `skipped` for every workspace of a batch spec in one
/// transaction and returns how many rows changed.
///
/// Repository visibility is not applied here: admission is decided for
/// every workspace, hidden or not. Rows whose decision is unchanged keep
/// their `updated_at`, so running the pass twice is a no-op.
pub fn mark_skipped(
    db: &Database,
    batch_spec_id: i64,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    db.with_transaction(|tx| {
        let policy =
            batch_spec_repo::find_policy(tx, batch_spec_id)?.ok_or(DatabaseError::NotFound)?;

        let candidates = skip_candidates(tx, batch_spec_id)?;
        let now = format_timestamp(now);
        let mut update = tx.prepare(
            "UPDATE batch_spec_workspaces SET skipped = ?2, updated_at = ?3 WHERE id = ?1",
        )?;

        let mut changed = 0;
        for candidate in &candidates {
            let skip = should_skip(candidate.inputs, policy);
            if skip == candidate.skipped {
                continue;
            }
            debug!(
                workspace_id = candidate.id,
                skipped = skip,
                "Workspace skip decision changed"
            );
            update.execute(params![candidate.id, skip, now])?;
            changed += 1;
        }

        Ok(changed)
    })
}

struct SkipCandidate {
    id: i64,
    inputs: SkipInputs,
    skipped: bool,
}

fn skip_candidates(
    conn: &Connection,
    batch_spec_id: i64,
) -> Result<Vec<SkipCandidate>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, ignored, unsupported, json_array_length(steps), skipped
         FROM batch_spec_workspaces WHERE batch_spec_id = ?1 ORDER BY id ASC",
    )?;
    let candidates = stmt
        .query_map(params![batch_spec_id], |row| {
            Ok(SkipCandidate {
                id: row.get(0)?,
                inputs: SkipInputs {
                    ignored: row.get(1)?,
                    unsupported: row.get(2)?,
                    step_count: row.get::<_, i64>(3)?.max(0) as usize,
                },
                skipped: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(candidates)
}
