//! Repository rows — the minimal catalog the workspace store joins against.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use super::columns::{format_timestamp, timestamp, timestamp_opt};
use super::{Database, DatabaseError};
use crate::types::Repo;

fn repo_from_row(row: &Row<'_>) -> Result<Repo, rusqlite::Error> {
    Ok(Repo {
        id: row.get("id")?,
        name: row.get("name")?,
        external_service_kind: row.get("external_service_kind")?,
        created_at: timestamp(row, "created_at")?,
        deleted_at: timestamp_opt(row, "deleted_at")?,
    })
}

/// Inserts a repository row and returns it with its assigned ID.
pub fn insert(
    db: &Database,
    name: &str,
    external_service_kind: &str,
    now: DateTime<Utc>,
) -> Result<Repo, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO repos (name, external_service_kind, created_at) VALUES (?1, ?2, ?3)",
            params![name, external_service_kind, format_timestamp(now)],
        )?;
        Ok(Repo {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            external_service_kind: external_service_kind.to_string(),
            created_at: now,
            deleted_at: None,
        })
    })
}

/// Marks a repository as deleted. The row stays in place.
///
/// Deleting an already-deleted repository keeps the original timestamp.
pub fn soft_delete(db: &Database, id: i64, now: DateTime<Utc>) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE repos SET deleted_at = COALESCE(deleted_at, ?2) WHERE id = ?1",
            params![id, format_timestamp(now)],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    })
}

/// Clears `deleted_at`. Restoring a live repository is a no-op.
pub fn restore(db: &Database, id: i64) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE repos SET deleted_at = NULL WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    })
}

/// Finds a repository by ID, including soft-deleted ones.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<Repo>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM repos WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], repo_from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}
