// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands of planned
//! steps, using `tokio::process::Command`.
//!
//! - [`backend`] provides the `ExecutorBackend` trait the engine drives, and
//!   which tests can replace with a fake implementation.
//! - [`process`] contains `ProcessExecutor`, the production backend.
//! - [`interrupt`] holds the run-wide Ctrl-C flag shared by the executor and
//!   the engine.

pub mod backend;
pub mod interrupt;
pub mod process;

pub use backend::ExecutorBackend;
pub use interrupt::Interrupt;
pub use process::ProcessExecutor;
