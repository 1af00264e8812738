// src/dag/staleness.rs

//! The rule deciding whether a task's command has to run.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::dag::graph::TaskGraph;
use crate::dag::task::{Input, Task};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::TaskName;

/// Why a task was scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// The task declares no outputs.
    Phony,
    /// A declared output does not exist.
    MissingOutput(PathBuf),
    /// A task this one depends on is scheduled earlier in the same plan.
    DependencyRebuilt(TaskName),
    /// The oldest output is older than the newest input.
    OutdatedOutput { output: PathBuf, input: PathBuf },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::Phony => write!(f, "phony"),
            StaleReason::MissingOutput(p) => write!(f, "output {} is missing", p.display()),
            StaleReason::DependencyRebuilt(t) => write!(f, "dependency '{t}' is rebuilt"),
            StaleReason::OutdatedOutput { output, input } => write!(
                f,
                "{} is older than {}",
                output.display(),
                input.display()
            ),
        }
    }
}

/// Decide whether `task` is stale.
///
/// `rebuilt` holds the tasks already scheduled in the current plan; their
/// outputs will change before `task` runs, so depending on any of them makes
/// `task` stale without looking at timestamps.
///
/// Missing leaf inputs are ignored: they are assumed to exist and only
/// surface when the command using them fails.
pub fn check_staleness(
    task: &Task,
    graph: &TaskGraph,
    fs: &dyn FileSystem,
    rebuilt: &HashSet<TaskName>,
) -> Result<Option<StaleReason>> {
    if task.is_phony() {
        return Ok(Some(StaleReason::Phony));
    }

    let mut oldest_output: Option<(SystemTime, &Path)> = None;
    for output in task.outputs.iter() {
        match fs.modified(output)? {
            None => return Ok(Some(StaleReason::MissingOutput(output.clone()))),
            Some(mtime) => {
                if oldest_output.is_none_or(|(t, _)| mtime < t) {
                    oldest_output = Some((mtime, output.as_path()));
                }
            }
        }
    }

    if let Some(dep) = task.dependency_names().find(|d| rebuilt.contains(*d)) {
        return Ok(Some(StaleReason::DependencyRebuilt(dep.to_string())));
    }

    let mut newest_input: Option<(SystemTime, &Path)> = None;
    for path in input_paths(task, graph) {
        if let Some(mtime) = fs.modified(path)? {
            if newest_input.is_none_or(|(t, _)| mtime > t) {
                newest_input = Some((mtime, path));
            }
        }
    }

    match (oldest_output, newest_input) {
        (Some((out_time, output)), Some((in_time, input))) if out_time < in_time => {
            Ok(Some(StaleReason::OutdatedOutput {
                output: output.to_path_buf(),
                input: input.to_path_buf(),
            }))
        }
        _ => Ok(None),
    }
}

/// Paths whose timestamps count as inputs of `task`.
///
/// A task-name input stands for all outputs of that task.
fn input_paths<'g>(task: &'g Task, graph: &'g TaskGraph) -> Vec<&'g Path> {
    let mut paths = Vec::new();
    for input in task.inputs.iter() {
        match input {
            Input::Leaf(path) | Input::Produced { path, .. } => paths.push(path.as_path()),
            Input::Task(name) => {
                if let Some(dep) = graph.task(name) {
                    paths.extend(dep.outputs.iter().map(PathBuf::as_path));
                }
            }
        }
    }
    paths
}
