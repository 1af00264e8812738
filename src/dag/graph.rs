// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::dag::task::{Input, Task};
use crate::errors::Result;
use crate::fs::{expand_pattern, is_glob_pattern, match_paths, normalize_path, FileSystem};
use crate::types::TaskName;

/// What a target string refers to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'g> {
    /// A task, found by name or by one of its outputs.
    Task(&'g Task),
    /// No rule produces this path.
    NoRule,
}

/// Task graph keyed by task name, with an index from output path to the
/// producing task.
///
/// Built once per invocation and never mutated afterwards; acyclicity of the
/// name/path edges is validated in `config::validate`, and anything that
/// slips through (e.g. via glob inputs) is caught by the resolver.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    root: PathBuf,
    tasks: BTreeMap<TaskName, Task>,
    producers: HashMap<PathBuf, TaskName>,
}

/// Resolve a config path against the project root.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    normalize_path(&root.join(path))
}

impl TaskGraph {
    /// Build the graph from a validated [`ConfigFile`].
    ///
    /// Glob inputs are expanded here, against `fs`, and never again during
    /// the run.
    pub fn build(cfg: &ConfigFile, root: &Path, fs: &dyn FileSystem) -> Result<Self> {
        let defaults = cfg.default_section();

        let mut producers: HashMap<PathBuf, TaskName> = HashMap::new();
        for (name, tc) in cfg.tasks().iter() {
            for output in tc.outputs.iter() {
                producers.insert(resolve_path(root, output), name.clone());
            }
        }

        let mut tasks = BTreeMap::new();
        for (name, tc) in cfg.tasks().iter() {
            let outputs: Vec<PathBuf> = tc
                .outputs
                .iter()
                .map(|o| resolve_path(root, o))
                .collect();

            let mut inputs = Vec::new();
            for raw in tc.inputs.iter() {
                if cfg.tasks().contains_key(raw) {
                    inputs.push(Input::Task(raw.clone()));
                } else if is_glob_pattern(raw) {
                    // Files on disk plus declared outputs, so a pattern that
                    // names not-yet-built outputs still links to their producer.
                    let on_disk = expand_pattern(fs, root, raw)
                        .with_context(|| format!("expanding input '{raw}' of task '{name}'"))?;
                    let declared = match_paths(root, raw, producers.keys().map(PathBuf::as_path))
                        .with_context(|| format!("expanding input '{raw}' of task '{name}'"))?;
                    let mut matches: Vec<PathBuf> = on_disk
                        .iter()
                        .chain(declared.iter())
                        .map(|p| normalize_path(p))
                        .collect();
                    matches.sort();
                    matches.dedup();
                    debug!(
                        task = %name,
                        pattern = %raw,
                        on_disk = on_disk.len(),
                        declared = declared.len(),
                        "expanded input pattern"
                    );
                    for path in matches {
                        // A task never depends on its own outputs.
                        if outputs.contains(&path) {
                            continue;
                        }
                        inputs.push(classify(&producers, path));
                    }
                } else {
                    inputs.push(classify(&producers, resolve_path(root, raw)));
                }
            }

            let dir = match tc.effective_dir(defaults) {
                Some(dir) => resolve_path(root, dir),
                None => normalize_path(root),
            };

            tasks.insert(
                name.clone(),
                Task {
                    name: name.clone(),
                    cmd: tc.cmd.clone(),
                    dir,
                    env: tc.effective_env(defaults),
                    outputs,
                    inputs,
                    best_effort: tc.best_effort,
                    remove: tc.remove.iter().map(|r| resolve_path(root, r)).collect(),
                },
            );
        }

        Ok(Self {
            root: root.to_path_buf(),
            tasks,
            producers,
        })
    }

    /// Assemble a graph from already-resolved tasks.
    ///
    /// No validation happens here; callers get cycle detection from the
    /// resolver only.
    pub fn from_tasks(root: impl Into<PathBuf>, tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut map = BTreeMap::new();
        let mut producers = HashMap::new();
        for task in tasks {
            for output in task.outputs.iter() {
                producers.insert(normalize_path(output), task.name.clone());
            }
            map.insert(task.name.clone(), task);
        }
        Self {
            root: root.into(),
            tasks: map,
            producers,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// All tasks, ordered by name.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Task that declares `path` (already resolved against the root) as output.
    pub fn producer_of(&self, path: &Path) -> Option<&Task> {
        self.producers
            .get(&normalize_path(path))
            .and_then(|name| self.tasks.get(name))
    }

    /// Look up a target given on the command line or as `default_target`:
    /// first as a task name, then as an output path relative to the root.
    pub fn lookup_target(&self, target: &str) -> Target<'_> {
        if let Some(task) = self.tasks.get(target) {
            return Target::Task(task);
        }
        match self.producer_of(&resolve_path(&self.root, target)) {
            Some(task) => Target::Task(task),
            None => Target::NoRule,
        }
    }

    /// Immediate dependencies of a task (deduplicated, declaration order).
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        let mut deps: Vec<&str> = Vec::new();
        if let Some(task) = self.tasks.get(name) {
            for dep in task.dependency_names() {
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
        }
        deps
    }

    /// Immediate dependents of a task (tasks listing it, or one of its
    /// outputs, among their inputs).
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.tasks
            .values()
            .filter(|t| t.dependency_names().any(|d| d == name))
            .map(|t| t.name.as_str())
            .collect()
    }
}

fn classify(producers: &HashMap<PathBuf, TaskName>, path: PathBuf) -> Input {
    match producers.get(&path) {
        Some(by) => Input::Produced {
            path,
            by: by.clone(),
        },
        None => Input::Leaf(path),
    }
}
