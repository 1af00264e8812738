// src/dag/task.rs

//! Static task information derived from config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::TaskName;

/// A single dependency of a task, classified once at graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The input names another task directly (e.g. `inputs = ["base"]`).
    Task(TaskName),
    /// The input is a declared output of task `by`.
    Produced { path: PathBuf, by: TaskName },
    /// No task produces this path; it is assumed to exist already.
    Leaf(PathBuf),
}

impl Input {
    /// Task that has to be resolved before this input is usable, if any.
    pub fn producer(&self) -> Option<&str> {
        match self {
            Input::Task(name) => Some(name),
            Input::Produced { by, .. } => Some(by),
            Input::Leaf(_) => None,
        }
    }
}

/// Immutable description of a task, with all paths resolved against the
/// project root.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: TaskName,
    pub cmd: Option<String>,
    /// Working directory for `cmd`.
    pub dir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub outputs: Vec<PathBuf>,
    pub inputs: Vec<Input>,
    pub best_effort: bool,
    pub remove: Vec<PathBuf>,
}

impl Task {
    /// Minimal task for tests and programmatic graphs.
    pub fn new(name: impl Into<TaskName>, dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            cmd: None,
            dir: dir.as_ref().to_path_buf(),
            env: BTreeMap::new(),
            outputs: Vec::new(),
            inputs: Vec::new(),
            best_effort: false,
            remove: Vec::new(),
        }
    }

    /// A task without declared outputs always runs.
    pub fn is_phony(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Tasks this one depends on, in declaration order (may repeat).
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().filter_map(Input::producer)
    }
}
