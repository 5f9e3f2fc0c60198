//! Skip admission for workspaces.
//!
//! A workspace is skipped when its repository was ignored or unsupported at
//! generation time and the batch spec does not explicitly allow that, or when
//! it has no steps to run at all.

use crate::types::BatchSpecPolicy;

/// The workspace facts the skip decision depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipInputs {
    pub ignored: bool,
    pub unsupported: bool,
    pub step_count: usize,
}

/// Decides whether a workspace must be skipped under `policy`.
pub fn should_skip(inputs: SkipInputs, policy: BatchSpecPolicy) -> bool {
    (inputs.ignored && !policy.allow_ignored)
        || (inputs.unsupported && !policy.allow_unsupported)
        || inputs.step_count == 0
}
