// src/dag/plan.rs

//! Ordered list of steps produced by resolution.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::dag::staleness::StaleReason;
use crate::dag::task::Task;
use crate::types::TaskName;

/// Description of a task that has to run, in the order it has to run.
#[derive(Debug, Clone)]
pub struct PlannedStep {
    pub task: TaskName,
    pub cmd: Option<String>,
    pub dir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub best_effort: bool,
    pub remove: Vec<PathBuf>,
    pub reason: StaleReason,
}

impl PlannedStep {
    pub fn from_task(task: &Task, reason: StaleReason) -> Self {
        Self {
            task: task.name.clone(),
            cmd: task.cmd.clone(),
            dir: task.dir.clone(),
            env: task.env.clone(),
            best_effort: task.best_effort,
            remove: task.remove.clone(),
            reason,
        }
    }
}

/// Result of resolving one target.
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    pub target: String,
    /// Steps in execution order; dependencies always come first.
    pub steps: Vec<PlannedStep>,
    /// Tasks visited during resolution whose outputs were current.
    pub up_to_date: Vec<TaskName>,
}

impl BuildPlan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the scheduled tasks, in order.
    pub fn task_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.task.as_str()).collect()
    }
}
