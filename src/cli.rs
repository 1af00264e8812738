// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::loader::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `stalerun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stalerun",
    version,
    about = "Run build steps whose outputs are missing or older than their inputs.",
    long_about = None
)]
pub struct CliArgs {
    /// Task name or output path to bring up to date.
    ///
    /// Default: `[config].default_target`, or `all`.
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Paths inside the config are relative to the directory containing it.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Resolve the target and print the plan, but don't run any commands.
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Print all tasks with their inputs, outputs and commands, then exit.
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STALERUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
