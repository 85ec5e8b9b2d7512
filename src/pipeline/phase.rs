//! Phase layout and step selection.
//!
//! The fifteen steps fall into three fixed phases, carved by id range:
//! setup (0–3), publish (4–13) and report (14). Phase membership is a
//! property of the id alone; a partial run of three publish steps is still
//! a publish-phase run and inherits the publish retry budget.

use crate::config::RetryConfig;
use crate::steps::{StepId, MAX_STEP};

/// One contiguous block of steps with a shared retry budget.
#[derive(Debug, Clone, Copy)]
pub struct Phase {
    /// Stable name used in logs and errors.
    pub name: &'static str,
    first: u8,
    last: u8,
    /// How many times the whole phase may be re-run after a step failure.
    pub max_retries: u32,
}

impl Phase {
    pub fn contains(&self, step: StepId) -> bool {
        (self.first..=self.last).contains(&step.get())
    }
}

/// The three phases in execution order, with budgets from config.
pub fn phases(retries: &RetryConfig) -> [Phase; 3] {
    [
        Phase {
            name: "setup",
            first: 0,
            last: 3,
            max_retries: retries.setup,
        },
        Phase {
            name: "publish",
            first: 4,
            last: 13,
            max_retries: retries.publish,
        },
        Phase {
            name: "report",
            first: 14,
            last: MAX_STEP,
            max_retries: retries.report,
        },
    ]
}

/// Which steps one run should execute.
#[derive(Debug, Clone)]
pub enum StepSelection {
    /// The full pipeline.
    All,
    /// An explicit list of ids, in any order.
    Explicit(Vec<StepId>),
    /// An inclusive id range.
    Range { from: StepId, to: StepId },
}

impl StepSelection {
    /// The selected ids, ascending and deduplicated.
    pub fn resolve(&self) -> Vec<StepId> {
        match self {
            StepSelection::All => StepId::all().collect(),
            StepSelection::Explicit(ids) => {
                let mut ids = ids.clone();
                ids.sort();
                ids.dedup();
                ids
            }
            StepSelection::Range { from, to } => StepId::all()
                .filter(|id| (from.get()..=to.get()).contains(&id.get()))
                .collect(),
        }
    }
}
