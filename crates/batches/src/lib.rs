pub mod clock;
pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod skip;
pub mod store;
pub mod types;

pub use clock::{Clock, SystemClock, TestClock};
pub use config::{load_config, StoreConfig};
pub use connection::{PageInfo, WorkspaceConnection};
pub use db::{Database, DatabaseError};
pub use error::{BatchesError, ConfigError, LoggingError, Result};
pub use pagination::{Page, PageRequest};
pub use skip::{should_skip, SkipInputs};
pub use store::{
    CountBatchSpecWorkspacesOpts, GetBatchSpecWorkspaceOpts, ListBatchSpecWorkspacesOpts, Store,
    WorkspaceFilter,
};
pub use types::{BatchSpec, BatchSpecPolicy, BatchSpecWorkspace, Repo, Step, StepOutput};

/// Opens the store described by `config`, creating the database file and
/// running migrations as needed.
pub fn open_store(config: &StoreConfig) -> Result<Store> {
    let path = config
        .resolved_database_path()
        .ok_or_else(|| ConfigError::Validation {
            message: "No database path configured and no home directory found".to_string(),
        })?;
    let db = Database::open(&path)?;
    Ok(Store::new(db))
}
