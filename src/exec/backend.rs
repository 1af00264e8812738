// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The engine talks to an `ExecutorBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation in [`process`](super::process).
//!
//! - `ProcessExecutor` is the default implementation used by `stalerun`.
//! - Tests can provide their own `ExecutorBackend` that records which steps
//!   were run and returns canned outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::dag::PlannedStep;
use crate::errors::Result;
use crate::types::StepOutcome;

/// Trait abstracting how a single planned step's command is executed.
///
/// The engine only calls this for steps that have a command, and awaits the
/// returned future to completion before starting the next step.
pub trait ExecutorBackend: Send {
    /// Run the step's command and report how it exited.
    ///
    /// Errors are reserved for failures to run the command at all (spawn
    /// errors, interrupts); a command that exits non-zero is
    /// `Ok(StepOutcome::Failed(..))`.
    fn run_step<'a>(
        &'a mut self,
        step: &'a PlannedStep,
    ) -> Pin<Box<dyn Future<Output = Result<StepOutcome>> + Send + 'a>>;
}
