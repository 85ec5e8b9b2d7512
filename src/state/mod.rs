//! Durable per-task state.
//!
//! Every pipeline task keeps a small record of which steps have reached
//! which status, persisted between runs so an operator can inspect a task
//! after a crash or a partial failure.

pub mod store;

pub use store::{JsonTaskStore, StepStatus, TaskRecord, TaskStateStore};
