//! Batch spec rows. Only the ownership and policy columns the workspace
//! store needs are kept here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::columns::{format_timestamp, timestamp};
use super::{Database, DatabaseError};
use crate::types::{BatchSpec, BatchSpecPolicy};

fn batch_spec_from_row(row: &Row<'_>) -> Result<BatchSpec, rusqlite::Error> {
    Ok(BatchSpec {
        id: row.get("id")?,
        namespace_user_id: row.get("namespace_user_id")?,
        user_id: row.get("user_id")?,
        allow_ignored: row.get("allow_ignored")?,
        allow_unsupported: row.get("allow_unsupported")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

/// Inserts a batch spec. `id` and the timestamps of `spec` are ignored;
/// the stored row is returned.
pub fn insert(
    db: &Database,
    spec: &BatchSpec,
    now: DateTime<Utc>,
) -> Result<BatchSpec, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO batch_specs (namespace_user_id, user_id, allow_ignored,
             allow_unsupported, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                spec.namespace_user_id,
                spec.user_id,
                spec.allow_ignored,
                spec.allow_unsupported,
                format_timestamp(now),
            ],
        )?;
        Ok(BatchSpec {
            id: conn.last_insert_rowid(),
            created_at: now,
            updated_at: now,
            ..spec.clone()
        })
    })
}

/// Finds a batch spec by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<BatchSpec>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM batch_specs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], batch_spec_from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Loads only the policy flags. Takes a connection so it can run inside
/// the skip pass's transaction.
pub(crate) fn find_policy(
    conn: &Connection,
    id: i64,
) -> Result<Option<BatchSpecPolicy>, DatabaseError> {
    let policy = conn
        .query_row(
            "SELECT allow_ignored, allow_unsupported FROM batch_specs WHERE id = ?1",
            params![id],
            |row| {
                Ok(BatchSpecPolicy {
                    allow_ignored: row.get(0)?,
                    allow_unsupported: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(policy)
}

pub(crate) fn exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM batch_specs WHERE id = ?1",
            params![id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        let spec = insert(
            &db,
            &BatchSpec {
                namespace_user_id: Some(1),
                user_id: 1,
                allow_unsupported: true,
                ..Default::default()
            },
            now(),
        )
        .unwrap();
        assert!(spec.id > 0);
        assert_eq!(spec.created_at, now());

        let found = find_by_id(&db, spec.id).unwrap().unwrap();
        assert_eq!(found, spec);
    }

    #[test]
    fn test_find_policy() {
        let db = test_db();
        let spec = insert(
            &db,
            &BatchSpec {
                user_id: 1,
                allow_ignored: true,
                ..Default::default()
            },
            now(),
        )
        .unwrap();

        let policy = db.with_conn(|conn| find_policy(conn, spec.id)).unwrap();
        assert_eq!(
            policy,
            Some(BatchSpecPolicy {
                allow_ignored: true,
                allow_unsupported: false,
            })
        );

        let missing = db.with_conn(|conn| find_policy(conn, spec.id + 1)).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_exists() {
        let db = test_db();
        let spec = insert(&db, &BatchSpec::default(), now()).unwrap();
        assert!(db.with_conn(|conn| exists(conn, spec.id)).unwrap());
        assert!(!db.with_conn(|conn| exists(conn, spec.id + 100)).unwrap());
    }
}
