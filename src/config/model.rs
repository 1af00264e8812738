// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::TaskName;

/// Target used when neither the CLI nor `[config].default_target` names one.
pub const DEFAULT_TARGET: &str = "all";

/// Configuration exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// default_target = "all"
///
/// [default]
/// dir = "."
///
/// [task.base]
/// cmd = "snapcraft"
/// dir = "base"
/// outputs = ["base/base_1.0_amd64.snap"]
/// inputs = ["base/snap/snapcraft.yaml"]
///
/// [task.all]
/// inputs = ["base"]
/// ```
///
/// All sections are optional and have reasonable defaults; validation only
/// requires at least one task.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on the structural invariants checked there.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    default: DefaultSection,
    task: BTreeMap<TaskName, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        default: DefaultSection,
        task: BTreeMap<TaskName, TaskConfig>,
    ) -> Self {
        Self {
            config,
            default,
            task,
        }
    }

    pub fn default_section(&self) -> &DefaultSection {
        &self.default
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskConfig> {
        &self.task
    }

    /// Target to resolve when none is given on the command line.
    pub fn default_target(&self) -> &str {
        self.config
            .default_target
            .as_deref()
            .unwrap_or(DEFAULT_TARGET)
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Task name or output path built when no target is given.
    ///
    /// Falls back to [`DEFAULT_TARGET`].
    #[serde(default)]
    pub default_target: Option<String>,
}

/// `[default]` section: values inherited by tasks that do not set them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultSection {
    /// Working directory for tasks without their own `dir`, relative to the
    /// project root.
    #[serde(default)]
    pub dir: Option<String>,

    /// Environment variables added to every task's command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run. A task without a command only aggregates its
    /// inputs (and performs its `remove` list).
    #[serde(default)]
    pub cmd: Option<String>,

    /// Working directory, relative to the project root.
    #[serde(default)]
    pub dir: Option<String>,

    /// Files or directories this task produces. Empty means the task is
    /// phony and always runs.
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Paths, glob patterns or task names this task depends on.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// If true, a failing command is logged and the run continues.
    #[serde(default)]
    pub best_effort: bool,

    /// Paths deleted after the command has run. Missing paths are ignored.
    #[serde(default)]
    pub remove: Vec<String>,
}

impl TaskConfig {
    /// Effective working directory given the `[default]` section.
    pub fn effective_dir<'a>(&'a self, defaults: &'a DefaultSection) -> Option<&'a str> {
        self.dir.as_deref().or(defaults.dir.as_deref())
    }

    /// Effective environment: `[default].env` overlaid with the task's own.
    pub fn effective_env(&self, defaults: &DefaultSection) -> BTreeMap<String, String> {
        let mut env = defaults.env.clone();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    pub fn is_phony(&self) -> bool {
        self.outputs.is_empty()
    }
}
