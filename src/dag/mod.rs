// src/dag/mod.rs

//! Task graph and resolution.
//!
//! - [`task`] holds the static, path-resolved description of one task.
//! - [`graph`] builds the immutable [`TaskGraph`] from a validated config.
//! - [`staleness`] decides whether a single task has to run.
//! - [`resolver`] walks the graph depth-first from a target and produces
//!   a [`BuildPlan`].
//! - [`plan`] defines the plan and step types handed to the engine.

pub mod graph;
pub mod plan;
pub mod resolver;
pub mod staleness;
pub mod task;

pub use graph::{Target, TaskGraph};
pub use plan::{BuildPlan, PlannedStep};
pub use resolver::Resolver;
pub use staleness::StaleReason;
pub use task::{Input, Task};
