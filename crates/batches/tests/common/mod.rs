//! Shared test utilities for workspace store integration tests.
//!
//! This module provides:
//! - `TestHarness` for an isolated in-memory store with a frozen clock
//! - Builders for workspaces and batch specs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
