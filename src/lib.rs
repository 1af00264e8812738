// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::{load_and_validate, project_root};
use crate::config::model::ConfigFile;
use crate::dag::{BuildPlan, Input, Resolver, TaskGraph};
use crate::engine::{RunSummary, Runtime};
use crate::errors::Result;
use crate::exec::{ExecutorBackend, Interrupt, ProcessExecutor};
use crate::fs::{FileSystem, RealFileSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - graph construction (glob inputs expanded once, here)
/// - resolution of the requested target into a plan
/// - `--list` / `--dry-run` output, or sequential execution
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let root = project_root(&config_path);
    let fs = RealFileSystem;

    let graph = TaskGraph::build(&cfg, &root, &fs)?;

    if args.list {
        print_tasks(&graph);
        return Ok(());
    }

    let target = args
        .target
        .clone()
        .unwrap_or_else(|| cfg.default_target().to_string());
    let plan = Resolver::new(&graph, &fs).resolve(&target)?;

    if args.dry_run {
        print_plan(&plan, &root);
        return Ok(());
    }

    // Until here Ctrl-C keeps its default behaviour and ends the process.
    // From now on it is observed between and during steps.
    let interrupt = Interrupt::listen();
    let executor = ProcessExecutor::with_interrupt(interrupt.clone());
    execute_plan(&plan, executor, &fs, interrupt).await?;
    Ok(())
}

/// Resolve `target` in `cfg` and run the resulting plan.
///
/// This is the whole pipeline minus CLI handling, with the filesystem and
/// executor injectable for tests.
pub async fn build_target<E: ExecutorBackend>(
    cfg: &ConfigFile,
    root: &Path,
    target: &str,
    fs: &dyn FileSystem,
    executor: E,
) -> Result<(BuildPlan, RunSummary)> {
    let graph = TaskGraph::build(cfg, root, fs)?;
    let plan = Resolver::new(&graph, fs).resolve(target)?;
    let summary = execute_plan(&plan, executor, fs, Interrupt::new()).await?;
    Ok((plan, summary))
}

async fn execute_plan<E: ExecutorBackend>(
    plan: &BuildPlan,
    executor: E,
    fs: &dyn FileSystem,
    interrupt: Interrupt,
) -> Result<RunSummary> {
    if plan.is_empty() {
        info!(target = %plan.target, "nothing to be done");
        return Ok(RunSummary::default());
    }

    let mut runtime = Runtime::new(executor, fs).with_interrupt(interrupt);
    runtime.run(plan).await
}

/// `--dry-run` output: the steps that would run, with the reason for each.
fn print_plan(plan: &BuildPlan, root: &Path) {
    println!("stalerun dry-run: target '{}'", plan.target);
    if plan.is_empty() {
        println!("  nothing to be done");
    }
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, step.task, step.reason);
        if let Some(cmd) = &step.cmd {
            println!("       cmd: {cmd}");
            println!("       dir: {}", display_rel(root, &step.dir));
        }
        if !step.remove.is_empty() {
            let paths: Vec<String> = step.remove.iter().map(|p| display_rel(root, p)).collect();
            println!("       remove: {:?}", paths);
        }
        if step.best_effort {
            println!("       best_effort: true");
        }
    }
    if !plan.up_to_date.is_empty() {
        println!("  up to date: {:?}", plan.up_to_date);
    }

    debug!("dry-run complete (no execution)");
}

/// `--list` output: every task with its outputs, inputs and command.
fn print_tasks(graph: &TaskGraph) {
    let root = graph.root();
    println!("tasks ({}):", graph.tasks().count());
    for task in graph.tasks() {
        println!("  - {}{}", task.name, if task.is_phony() { " (phony)" } else { "" });
        if let Some(cmd) = &task.cmd {
            println!("      cmd: {cmd}");
            println!("      dir: {}", display_rel(root, &task.dir));
        }
        if !task.outputs.is_empty() {
            let outs: Vec<String> = task.outputs.iter().map(|p| display_rel(root, p)).collect();
            println!("      outputs: {:?}", outs);
        }
        if !task.inputs.is_empty() {
            let ins: Vec<String> = task
                .inputs
                .iter()
                .map(|input| match input {
                    Input::Task(name) => format!("task:{name}"),
                    Input::Produced { path, by } => format!("{} (by {by})", display_rel(root, path)),
                    Input::Leaf(path) => display_rel(root, path),
                })
                .collect();
            println!("      inputs: {:?}", ins);
        }
        if !task.remove.is_empty() {
            let paths: Vec<String> = task.remove.iter().map(|p| display_rel(root, p)).collect();
            println!("      remove: {:?}", paths);
        }
    }
}

fn display_rel(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    if rel.as_os_str().is_empty() {
        ".".to_string()
    } else {
        rel.display().to_string()
    }
}
