use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::default_database_path;
use crate::pagination::PageRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub version: String,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// The configured database path, falling back to the per-user default.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(default_database_path)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            list: ListConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    50
}

fn default_max_limit() -> u32 {
    1000
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl ListConfig {
    /// Builds a page request from caller input: a missing or zero limit
    /// becomes the default, anything above the maximum is clamped.
    pub fn page_request(&self, limit: Option<u32>, cursor: Option<i64>) -> PageRequest {
        let limit = match limit {
            None | Some(0) => self.default_limit,
            Some(limit) => limit.min(self.max_limit),
        };
        PageRequest::new(limit, cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
