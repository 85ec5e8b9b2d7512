//! Pipeline execution.
//!
//! This module provides:
//! - [`SharedContext`] threaded through the steps of one run
//! - [`Phase`] and [`StepSelection`] to carve the step range into phases
//! - [`Orchestrator`] which drives selected steps with per-phase retries
//! - [`RunReport`] summarizing one run for the terminal

pub mod context;
pub mod orchestrator;
pub mod phase;
pub mod report;

pub use context::{ListingCopy, RunOptions, SharedContext, TaskId};
pub use orchestrator::{Orchestrator, PostCommitHook};
pub use phase::{phases, Phase, StepSelection};
pub use report::{RunReport, StepReport};
