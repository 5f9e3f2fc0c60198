//! Domain types for batch specs, repositories and workspaces.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single step of a workspace's execution plan.
///
/// Steps are stored verbatim; the store only ever counts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Shell command to run.
    pub run: String,
    /// Container image the command runs in.
    #[serde(default)]
    pub container: String,
    /// In-container file path to literal file contents.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, String>,
    /// Output name to output-capture expression.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, StepOutput>,
    /// Conditional expression gating the step.
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Step {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Policy flags of a batch spec that decide whether ignored or
/// unsupported workspaces may still run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSpecPolicy {
    pub allow_ignored: bool,
    pub allow_unsupported: bool,
}

/// The user-authored definition of a batch change, reduced to the fields
/// the workspace store needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSpec {
    pub id: i64,
    pub namespace_user_id: Option<i64>,
    pub user_id: i64,
    pub allow_ignored: bool,
    pub allow_unsupported: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchSpec {
    pub fn policy(&self) -> BatchSpecPolicy {
        BatchSpecPolicy {
            allow_ignored: self.allow_ignored,
            allow_unsupported: self.allow_unsupported,
        }
    }
}

/// A repository as seen by the workspace store. A repository with
/// `deleted_at` set is soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub external_service_kind: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A per-repository unit of planned execution within a batch change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSpecWorkspace {
    /// Assigned by the store on creation.
    pub id: i64,
    pub batch_spec_id: i64,
    /// Changeset specs produced by execution; empty until then.
    pub changeset_spec_ids: Vec<i64>,
    pub repo_id: i64,
    pub branch: String,
    pub commit: String,
    /// Sub-directory the workspace is scoped to. Empty means the root.
    pub path: String,
    pub file_matches: Vec<String>,
    pub steps: Vec<Step>,
    pub only_fetch_workspace: bool,
    pub unsupported: bool,
    pub ignored: bool,
    /// Written only by the skip pass.
    pub skipped: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
