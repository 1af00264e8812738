// src/types.rs

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Outcome of a single step's command as reported by an executor backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The command exited with status 0, or the step had no command.
    Success,
    /// The command exited non-zero. `None` means it was killed by a signal.
    Failed(Option<i32>),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}
