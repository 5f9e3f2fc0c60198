//! Builders for test workspaces.

#![allow(dead_code)]

use std::collections::BTreeMap;

use batches::{BatchSpecWorkspace, Step, StepOutput};

pub struct WorkspaceBuilder {
    workspace: BatchSpecWorkspace,
}

impl WorkspaceBuilder {
    pub fn new(batch_spec_id: i64, repo_id: i64) -> Self {
        Self {
            workspace: BatchSpecWorkspace {
                batch_spec_id,
                repo_id,
                branch: "master".to_string(),
                commit: "d34db33f".to_string(),
                path: "sub/dir/ectory".to_string(),
                file_matches: Vec::new(),
                ..Default::default()
            },
        }
    }

    /// A workspace with every field populated, for round-trip checks.
    pub fn full(batch_spec_id: i64, repo_id: i64) -> Self {
        Self::new(batch_spec_id, repo_id)
            .changeset_spec_ids(vec![456, 678])
            .file_matches(&["a.go", "a/b/horse.go", "a/b/c.go"])
            .step(complex_step())
            .only_fetch_workspace(true)
            .unsupported(true)
            .ignored(true)
    }

    pub fn changeset_spec_ids(mut self, ids: Vec<i64>) -> Self {
        self.workspace.changeset_spec_ids = ids;
        self
    }

    pub fn file_matches(mut self, paths: &[&str]) -> Self {
        self.workspace.file_matches = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.workspace.steps.push(step);
        self
    }

    pub fn run(self, command: &str) -> Self {
        self.step(Step::new(command))
    }

    pub fn only_fetch_workspace(mut self, value: bool) -> Self {
        self.workspace.only_fetch_workspace = value;
        self
    }

    pub fn unsupported(mut self, value: bool) -> Self {
        self.workspace.unsupported = value;
        self
    }

    pub fn ignored(mut self, value: bool) -> Self {
        self.workspace.ignored = value;
        self
    }

    pub fn build(self) -> BatchSpecWorkspace {
        self.workspace
    }
}

pub fn complex_step() -> Step {
    let mut files = BTreeMap::new();
    files.insert("/tmp/foobar.go".to_string(), "package main".to_string());

    let mut outputs = BTreeMap::new();
    outputs.insert(
        "myOutput".to_string(),
        StepOutput {
            value: "${{ step.stdout }}".to_string(),
            format: None,
        },
    );

    Step {
        run: "complex command that changes code".to_string(),
        container: "alpine:3".to_string(),
        files,
        outputs,
        condition: Some(
            r#"${{ eq repository.name "github.com/sourcegraph/sourcegraph" }}"#.to_string(),
        ),
    }
}
