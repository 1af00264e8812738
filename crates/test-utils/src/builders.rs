use std::collections::BTreeMap;
use stalerun::config::{ConfigFile, ConfigSection, DefaultSection, RawConfigFile, TaskConfig};
use stalerun::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                default: DefaultSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_default_target(mut self, target: &str) -> Self {
        self.config.config.default_target = Some(target.to_string());
        self
    }

    pub fn with_default_dir(mut self, dir: &str) -> Self {
        self.config.default.dir = Some(dir.to_string());
        self
    }

    /// Validate without panicking, for tests that expect a rejection.
    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    /// A task without a command (pure aggregate or remove-only).
    pub fn aggregate() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn output(mut self, path: &str) -> Self {
        self.task.outputs.push(path.to_string());
        self
    }

    pub fn input(mut self, path_or_task: &str) -> Self {
        self.task.inputs.push(path_or_task.to_string());
        self
    }

    pub fn dir(mut self, dir: &str) -> Self {
        self.task.dir = Some(dir.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn best_effort(mut self, val: bool) -> Self {
        self.task.best_effort = val;
        self
    }

    pub fn remove(mut self, path: &str) -> Self {
        self.task.remove.push(path.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
