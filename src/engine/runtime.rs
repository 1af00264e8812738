// src/engine/runtime.rs

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::dag::{BuildPlan, PlannedStep};
use crate::errors::{Result, StalerunError};
use crate::exec::{ExecutorBackend, Interrupt};
use crate::fs::FileSystem;
use crate::types::StepOutcome;

use super::RunSummary;

/// Executes a [`BuildPlan`] step by step and delegates actual command
/// execution to an `ExecutorBackend`.
///
/// Steps run strictly one after another. The first failing step that is not
/// `best_effort` aborts the run; nothing already done is rolled back.
pub struct Runtime<'f, E: ExecutorBackend> {
    executor: E,
    fs: &'f dyn FileSystem,
    interrupt: Interrupt,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<'f, E: ExecutorBackend> Runtime<'f, E> {
    pub fn new(executor: E, fs: &'f dyn FileSystem) -> Self {
        Self {
            executor,
            fs,
            interrupt: Interrupt::new(),
        }
    }

    /// Stop before the next step once `interrupt` fires.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Run every step of `plan` in order.
    pub async fn run(&mut self, plan: &BuildPlan) -> Result<RunSummary> {
        info!(target = %plan.target, steps = plan.steps.len(), "starting build");

        let mut summary = RunSummary::default();

        for step in plan.steps.iter() {
            if self.interrupt.is_triggered() {
                warn!(task = %step.task, "interrupted; not starting remaining steps");
                return Err(StalerunError::Interrupted);
            }

            debug!(task = %step.task, reason = %step.reason, "executing step");

            if step.cmd.is_some() {
                let outcome = self.run_command(step).await?;
                summary.executed.push(step.task.clone());
                if !outcome.is_success() {
                    summary.failed_best_effort.push(step.task.clone());
                }
            }

            summary.removed += self.remove_paths(step);
        }

        info!(
            target = %plan.target,
            executed = summary.executed.len(),
            removed = summary.removed,
            "build finished"
        );
        Ok(summary)
    }

    /// Run the step's command, turning failures into errors unless the step
    /// is best-effort. Returns the outcome that was tolerated.
    async fn run_command(&mut self, step: &PlannedStep) -> Result<StepOutcome> {
        match self.executor.run_step(step).await {
            Ok(StepOutcome::Success) => Ok(StepOutcome::Success),
            Ok(StepOutcome::Failed(code)) if step.best_effort => {
                warn!(task = %step.task, exit_code = ?code, "best-effort task failed; continuing");
                Ok(StepOutcome::Failed(code))
            }
            Ok(StepOutcome::Failed(code)) => {
                error!(task = %step.task, exit_code = ?code, "task failed; aborting run");
                Err(StalerunError::CommandFailed {
                    task: step.task.clone(),
                    code,
                })
            }
            Err(StalerunError::Interrupted) => Err(StalerunError::Interrupted),
            Err(err) if step.best_effort => {
                warn!(task = %step.task, error = %err, "best-effort task could not run; continuing");
                Ok(StepOutcome::Failed(None))
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the step's `remove` paths. Missing paths are silently skipped,
    /// other failures only warn. Returns how many paths were removed.
    fn remove_paths(&self, step: &PlannedStep) -> usize {
        let mut removed = 0;
        for path in step.remove.iter() {
            match self.fs.remove(path) {
                Ok(true) => {
                    debug!(task = %step.task, path = %path.display(), "removed");
                    removed += 1;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(task = %step.task, path = %path.display(), error = %e, "failed to remove path");
                }
            }
        }
        removed
    }
}
