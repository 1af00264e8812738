// src/config/validate.rs

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, StalerunError};
use crate::fs::{is_glob_pattern, normalize_path};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::StalerunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.default, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_fields(cfg)?;
    let producers = collect_producers(cfg)?;
    validate_global_config(cfg, &producers)?;
    validate_dag(cfg, &producers)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> StalerunError {
    StalerunError::ConfigError(msg.into())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(config_error(
            "config must contain at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_task_fields(cfg: &RawConfigFile) -> Result<()> {
    if let Some(dir) = &cfg.default.dir {
        if dir.trim().is_empty() {
            return Err(config_error("[default].dir must not be empty"));
        }
    }

    for (name, task) in cfg.task.iter() {
        if let Some(cmd) = &task.cmd {
            if cmd.trim().is_empty() {
                return Err(config_error(format!(
                    "task '{name}' has an empty `cmd`; omit it for tasks without a command"
                )));
            }
        }

        if let Some(dir) = &task.dir {
            if dir.trim().is_empty() {
                return Err(config_error(format!("task '{name}' has an empty `dir`")));
            }
        }

        let fields = [
            ("outputs", &task.outputs),
            ("inputs", &task.inputs),
            ("remove", &task.remove),
        ];
        for (field, entries) in fields {
            if entries.iter().any(|e| e.trim().is_empty()) {
                return Err(config_error(format!(
                    "task '{name}' has an empty entry in `{field}`"
                )));
            }
        }

        for output in task.outputs.iter() {
            if is_glob_pattern(output) {
                return Err(config_error(format!(
                    "task '{name}' output '{output}' is a glob pattern; outputs must be listed explicitly"
                )));
            }
        }
    }
    Ok(())
}

/// Map every declared output (normalised) to the task that produces it.
///
/// Rejects outputs declared by two tasks, and outputs that collide with the
/// name of a different task.
fn collect_producers(cfg: &RawConfigFile) -> Result<HashMap<PathBuf, &str>> {
    let mut producers: HashMap<PathBuf, &str> = HashMap::new();

    for (name, task) in cfg.task.iter() {
        for output in task.outputs.iter() {
            let path = normalize_path(Path::new(output));

            if let Some(other) = producers.insert(path.clone(), name.as_str()) {
                if other != name {
                    return Err(config_error(format!(
                        "output '{output}' is declared by both '{other}' and '{name}'"
                    )));
                }
            }

            if let Some(other) = path.to_str().filter(|p| cfg.task.contains_key(*p)) {
                if other != name {
                    return Err(config_error(format!(
                        "output '{output}' of task '{name}' shadows task '{other}'"
                    )));
                }
            }
        }
    }

    Ok(producers)
}

fn validate_global_config(cfg: &RawConfigFile, producers: &HashMap<PathBuf, &str>) -> Result<()> {
    // An implicit "all" target may legitimately be missing; it is only an
    // error once somebody asks for it.
    if let Some(target) = &cfg.config.default_target {
        let known = cfg.task.contains_key(target)
            || producers.contains_key(&normalize_path(Path::new(target)));
        if !known {
            return Err(config_error(format!(
                "[config].default_target '{target}' names neither a task nor a declared output"
            )));
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile, producers: &HashMap<PathBuf, &str>) -> Result<()> {
    // Edge direction: dependency -> dependent.
    //
    // For:
    //   [task.app]
    //   inputs = ["base.tar.xz"]
    // where `base.tar.xz` is an output of `archive`, we add archive -> app.
    //
    // Glob inputs are only expanded once the graph is built against the
    // filesystem; cycles they introduce are caught during resolution.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for input in task.inputs.iter() {
            if is_glob_pattern(input) {
                continue;
            }
            let dep = match cfg.task.get_key_value(input) {
                Some((dep, _)) => Some(dep.as_str()),
                None => producers.get(&normalize_path(Path::new(input))).copied(),
            };
            if let Some(dep) = dep {
                graph.add_edge(dep, name.as_str(), ());
            }
        }
    }

    // A topological sort fails on any cycle, self-loops included.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(StalerunError::DagCycle(describe_cycle(
            &graph,
            cycle.node_id(),
        ))),
    }
}

/// Render one cycle through `start` as `start -> dep -> ... -> start`,
/// following "depends on" edges, the same shape the resolver reports.
fn describe_cycle(graph: &DiGraphMap<&str, ()>, start: &str) -> String {
    let component: HashSet<&str> = kosaraju_scc(graph)
        .into_iter()
        .find(|scc| scc.contains(&start))
        .unwrap_or_default()
        .into_iter()
        .collect();

    // Breadth-first over dependencies (incoming edges), inside the strongly
    // connected component, until an edge leads back to `start`.
    let mut discovered_from: HashMap<&str, &str> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for dep in graph.neighbors_directed(node, Direction::Incoming) {
            if !component.contains(dep) {
                continue;
            }
            if dep == start {
                let mut path = vec![node];
                let mut current = node;
                while let Some(&prev) = discovered_from.get(current) {
                    path.push(prev);
                    current = prev;
                }
                path.reverse();
                path.push(start);
                return path.join(" -> ");
            }
            if !discovered_from.contains_key(dep) {
                discovered_from.insert(dep, node);
                queue.push_back(dep);
            }
        }
    }

    format!("{start} -> ... -> {start}")
}
