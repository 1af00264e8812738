// src/dag/resolver.rs

//! Depth-first resolution of a target into a [`BuildPlan`].

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::dag::graph::{resolve_path, Target, TaskGraph};
use crate::dag::plan::{BuildPlan, PlannedStep};
use crate::dag::staleness::check_staleness;
use crate::errors::{Result, StalerunError};
use crate::fs::FileSystem;
use crate::types::TaskName;

/// Per-task outcome of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Scheduled,
    UpToDate,
}

/// Mutable state threaded through one resolution.
#[derive(Debug, Default)]
struct ResolveState {
    /// Tasks already decided; each task is decided at most once.
    visited: HashMap<TaskName, Decision>,
    /// Current DFS path, used to report cycles.
    in_progress: Vec<TaskName>,
    /// Same set as the `Scheduled` entries of `visited`, in the shape the
    /// staleness check wants.
    rebuilt: HashSet<TaskName>,
    plan: BuildPlan,
}

/// Resolves targets of one [`TaskGraph`] against a filesystem.
///
/// Resolution only reads timestamps; nothing is executed.
pub struct Resolver<'g> {
    graph: &'g TaskGraph,
    fs: &'g dyn FileSystem,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g TaskGraph, fs: &'g dyn FileSystem) -> Self {
        Self { graph, fs }
    }

    /// Produce the ordered steps needed to bring `target` up to date.
    ///
    /// - A target with no rule that exists on disk yields an empty plan.
    /// - A target with no rule that does not exist is
    ///   [`StalerunError::UnknownTarget`].
    /// - A dependency cycle is [`StalerunError::DagCycle`].
    pub fn resolve(&self, target: &str) -> Result<BuildPlan> {
        let mut state = ResolveState::default();
        state.plan.target = target.to_string();

        match self.graph.lookup_target(target) {
            Target::Task(task) => {
                self.visit(&task.name, &mut state)?;
            }
            Target::NoRule => {
                if self.fs.exists(&resolve_path(self.graph.root(), target)) {
                    info!(target = %target, "no rule for target, but it exists; nothing to be done");
                } else {
                    return Err(StalerunError::UnknownTarget(target.to_string()));
                }
            }
        }

        debug!(
            target = %target,
            scheduled = ?state.plan.task_names(),
            up_to_date = ?state.plan.up_to_date,
            "resolved build plan"
        );
        Ok(state.plan)
    }

    fn visit(&self, name: &str, state: &mut ResolveState) -> Result<()> {
        if state.visited.contains_key(name) {
            return Ok(());
        }

        if let Some(pos) = state.in_progress.iter().position(|n| n == name) {
            let mut cycle: Vec<&str> = state.in_progress[pos..].iter().map(String::as_str).collect();
            cycle.push(name);
            return Err(StalerunError::DagCycle(cycle.join(" -> ")));
        }

        let Some(task) = self.graph.task(name) else {
            return Err(StalerunError::UnknownTarget(name.to_string()));
        };

        state.in_progress.push(name.to_string());
        for dep in task.dependency_names() {
            self.visit(dep, state)?;
        }
        state.in_progress.pop();

        let decision = match check_staleness(task, self.graph, self.fs, &state.rebuilt)? {
            Some(reason) => {
                debug!(task = %name, reason = %reason, "task is stale");
                state.rebuilt.insert(name.to_string());
                state.plan.steps.push(PlannedStep::from_task(task, reason));
                Decision::Scheduled
            }
            None => {
                debug!(task = %name, "task is up to date");
                state.plan.up_to_date.push(name.to_string());
                Decision::UpToDate
            }
        };
        state.visited.insert(name.to_string(), decision);

        Ok(())
    }
}
