// src/engine/mod.rs

//! Sequential, fail-fast execution of a resolved build plan.
//!
//! Resolution (what to run, in which order) lives in [`crate::dag`]; this
//! module only walks the finished plan, hands commands to an
//! [`ExecutorBackend`](crate::exec::ExecutorBackend) and performs `remove`
//! lists.

pub mod runtime;

pub use runtime::Runtime;

use crate::types::TaskName;

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks whose command was executed, in order.
    pub executed: Vec<TaskName>,
    /// Best-effort tasks whose command failed without aborting the run.
    pub failed_best_effort: Vec<TaskName>,
    /// Number of `remove` paths that existed and were deleted.
    pub removed: usize,
}
