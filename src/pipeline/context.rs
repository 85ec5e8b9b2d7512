//! Shared per-run context.
//!
//! One [`SharedContext`] lives for exactly one pipeline run. Earlier steps
//! deposit what later steps need: the resolved task identity, the product
//! record, the local image folder, the translated copy, the open draft.
//! Fields are named per producing step so cross-step data contracts are
//! reviewable instead of hiding in an open map.

use std::fmt;
use std::path::PathBuf;

use crate::records::ProductRecord;

/// Task identity for one run.
///
/// A run may start before the concrete product id is known; the discovery
/// step replaces the placeholder. Resolution is monotonic: once assigned,
/// the id never reverts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskId {
    /// Not yet discovered; logging and state-store operations use a fixed
    /// placeholder key.
    Placeholder,
    /// Concrete product id.
    Assigned(String),
}

impl TaskId {
    /// Key under which state-store operations file this task.
    pub fn store_key(&self) -> &str {
        match self {
            TaskId::Placeholder => "unassigned",
            TaskId::Assigned(id) => id,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, TaskId::Assigned(_))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_key())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        TaskId::Placeholder
    }
}

/// Opaque options bag passed into every step's context.
///
/// The orchestrator never interprets these; only individual handlers do
/// (the task-init step applies the record filters).
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only pick records with this brand.
    pub brand: Option<String>,
    /// Only pick records with this category.
    pub category: Option<String>,
}

/// Translated listing copy produced by the translate step.
#[derive(Debug, Clone)]
pub struct ListingCopy {
    pub title: String,
    pub detail_html: String,
}

/// Mutable record threaded through one run.
#[derive(Default)]
pub struct SharedContext {
    task: TaskId,
    /// Opaque options bag.
    pub options: RunOptions,

    /// Set by step 0: the remote record this run publishes.
    pub record: Option<ProductRecord>,
    /// Set by step 1: local folder holding the fetched main images.
    pub image_dir: Option<PathBuf>,
    /// Set by step 2: translated title and detail HTML.
    pub copy: Option<ListingCopy>,
    /// Set by step 4: open draft id in the seller console.
    pub draft_id: Option<String>,
    /// Set by step 13: listing receipt returned on submit.
    pub receipt: Option<String>,

    // One-way guard latch; see mark_submitted.
    submitted: bool,
}

impl SharedContext {
    /// Context for a run, with or without a known task id.
    pub fn new(known_id: Option<&str>, options: RunOptions) -> Self {
        Self {
            task: match known_id {
                Some(id) => TaskId::Assigned(id.to_string()),
                None => TaskId::Placeholder,
            },
            options,
            ..Default::default()
        }
    }

    pub fn task(&self) -> &TaskId {
        &self.task
    }

    /// Replace the placeholder with a concrete id.
    ///
    /// Monotonic: a second resolution with a different id is refused, the
    /// first one stands.
    pub fn resolve_task(&mut self, id: &str) {
        match &self.task {
            TaskId::Placeholder => {
                tracing::debug!(task = %id, "task id resolved");
                self.task = TaskId::Assigned(id.to_string());
            }
            TaskId::Assigned(existing) if existing != id => {
                tracing::warn!(
                    existing = %existing,
                    proposed = %id,
                    "refusing to re-resolve task id"
                );
            }
            TaskId::Assigned(_) => {}
        }
    }

    /// Latch the irreversible-action guard. One-way: there is no unset.
    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    /// Whether an irreversible action has already succeeded in this run.
    pub fn submitted(&self) -> bool {
        self.submitted
    }
}
