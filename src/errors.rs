// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

use crate::types::TaskName;

/// Exit code used when the run is interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
pub enum StalerunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No rule to make target '{0}'")]
    UnknownTarget(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("{}", describe_failure(task, *code))]
    CommandFailed {
        task: TaskName,
        code: Option<i32>,
    },

    #[error("Interrupted")]
    Interrupted,

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StalerunError {
    /// Process exit code that should be reported for this error.
    ///
    /// A failing command's own exit code is passed through unchanged; a child
    /// killed by a signal (no exit code) and every other error map to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            StalerunError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            StalerunError::Interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

fn describe_failure(task: &str, code: Option<i32>) -> String {
    match code {
        Some(code) => format!("task '{task}' failed with exit code {code}"),
        None => format!("task '{task}' was terminated by a signal"),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StalerunError>;
