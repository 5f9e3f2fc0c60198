//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// A JSON-encoded column could not be written.
    #[error("Failed to encode column '{column}': {source}")]
    Encode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The record does not exist, or exists but is hidden because its
    /// repository was deleted. Callers cannot tell the two apart.
    #[error("no results")]
    NotFound,

    /// A foreign reference on write points at a row that does not exist.
    #[error("{entity} {id} does not exist")]
    ReferentialIntegrity { entity: &'static str, id: i64 },
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound)
    }
}
