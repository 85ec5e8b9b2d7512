//! Step orchestration with per-phase retries.
//!
//! The orchestrator owns no domain collaborators. It sees the step
//! registry, the task state store and the shared context; everything the
//! steps talk to (record table, storefront) is wired into the handlers.
//!
//! Failure policy: a step failure resets its whole phase to pending and
//! re-runs it, as long as the phase has retry budget left. A phase never
//! re-runs once the submission guard is latched; the phase aborts instead
//! and the run moves on, so the report phase still gets to file the
//! outcome. Exhausted retries end the run.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::config::RetryConfig;
use crate::error::{PushcartError, Result};
use crate::state::{StepStatus, TaskStateStore};
use crate::steps::{StepId, StepRegistry};

use super::phase::{phases, Phase, StepSelection};
use super::report::{RunReport, StepReport};
use super::SharedContext;

/// Called once after the designated commit step succeeds.
///
/// Hook failures are logged and swallowed; the commit already happened and
/// nothing downstream may undo it.
pub type PostCommitHook = Box<dyn Fn(&SharedContext)>;

/// How one phase ended.
enum PhaseOutcome {
    Completed,
    /// A step failed while the submission guard was latched; the phase must
    /// not re-run.
    GuardedAbort,
    /// A step failed and the retry budget is spent.
    RetryExhausted { step: StepId, attempts: u32 },
}

pub struct Orchestrator<S: TaskStateStore> {
    registry: StepRegistry,
    store: S,
    retries: RetryConfig,
    post_commit: Option<(StepId, PostCommitHook)>,
}

impl<S: TaskStateStore> Orchestrator<S> {
    pub fn new(registry: StepRegistry, store: S, retries: RetryConfig) -> Self {
        Self {
            registry,
            store,
            retries,
            post_commit: None,
        }
    }

    /// Attach a hook that fires once `step` succeeds.
    pub fn with_post_commit(mut self, step: StepId, hook: PostCommitHook) -> Self {
        self.post_commit = Some((step, hook));
        self
    }

    /// Run the selected steps against the context.
    ///
    /// Returns `Err` only for infrastructure failures (state store I/O).
    /// Step failures, including exhausted retries, land in the report so the
    /// caller always gets the per-step picture of what happened.
    pub fn run(&self, ctx: &mut SharedContext, selection: &StepSelection) -> Result<RunReport> {
        let requested = selection.resolve();
        let mut statuses: BTreeMap<StepId, StepStatus> = BTreeMap::new();
        let mut guarded = false;
        let mut failure = None;

        for phase in phases(&self.retries) {
            let phase_steps: Vec<StepId> = requested
                .iter()
                .copied()
                .filter(|id| phase.contains(*id))
                .collect();
            if phase_steps.is_empty() {
                continue;
            }

            self.seed_statuses(ctx, &phase_steps, &mut statuses)?;

            match self.run_phase(ctx, &phase, &phase_steps, &mut statuses)? {
                PhaseOutcome::Completed => {}
                PhaseOutcome::GuardedAbort => {
                    warn!(
                        phase = phase.name,
                        "submission guard latched, aborting phase without retry"
                    );
                    guarded = true;
                }
                PhaseOutcome::RetryExhausted { step, attempts } => {
                    failure = Some(PushcartError::RetryExhausted {
                        phase: phase.name,
                        attempts,
                        step,
                    });
                    break;
                }
            }
        }

        Ok(RunReport {
            task: ctx.task().store_key().to_string(),
            steps: requested
                .iter()
                .map(|id| StepReport {
                    id: *id,
                    name: id.name(),
                    status: statuses.get(id).copied().unwrap_or(StepStatus::Pending),
                })
                .collect(),
            guarded,
            failure,
        })
    }

    /// Load persisted statuses for the phase's steps into the report map.
    fn seed_statuses(
        &self,
        ctx: &SharedContext,
        steps: &[StepId],
        statuses: &mut BTreeMap<StepId, StepStatus>,
    ) -> Result<()> {
        let record = self.store.load(ctx.task().store_key())?;
        for id in steps {
            statuses.insert(*id, record.status(*id));
        }
        Ok(())
    }

    fn run_phase(
        &self,
        ctx: &mut SharedContext,
        phase: &Phase,
        steps: &[StepId],
        statuses: &mut BTreeMap<StepId, StepStatus>,
    ) -> Result<PhaseOutcome> {
        let mut attempts: u32 = 0;

        loop {
            let failed = self.run_phase_once(ctx, phase, steps, statuses)?;

            let Some(step) = failed else {
                return Ok(PhaseOutcome::Completed);
            };

            if ctx.submitted() {
                return Ok(PhaseOutcome::GuardedAbort);
            }

            if attempts >= phase.max_retries {
                return Ok(PhaseOutcome::RetryExhausted {
                    step,
                    attempts: attempts + 1,
                });
            }

            attempts += 1;
            warn!(
                phase = phase.name,
                step = %step,
                attempt = attempts,
                max = phase.max_retries,
                "step failed, re-running phase from the top"
            );
            self.reset_phase(ctx, steps, statuses)?;
        }
    }

    /// One pass over the phase's steps. Returns the first failed step, if any.
    fn run_phase_once(
        &self,
        ctx: &mut SharedContext,
        phase: &Phase,
        steps: &[StepId],
        statuses: &mut BTreeMap<StepId, StepStatus>,
    ) -> Result<Option<StepId>> {
        for id in steps {
            let Some(handler) = self.registry.lookup(*id) else {
                warn!(step = %id, "no handler registered, skipping");
                self.record_status(ctx, *id, StepStatus::Skipped, statuses)?;
                continue;
            };

            info!(phase = phase.name, step = %id, name = handler.name(), "running step");
            match handler.execute(ctx) {
                Ok(()) => {
                    self.record_status(ctx, *id, StepStatus::Done, statuses)?;
                    if let Some((commit_step, hook)) = &self.post_commit {
                        if commit_step == id {
                            hook(ctx);
                        }
                    }
                }
                Err(e) => {
                    warn!(step = %id, name = handler.name(), error = %e, "step failed");
                    self.record_status(ctx, *id, StepStatus::Failed, statuses)?;
                    return Ok(Some(*id));
                }
            }
        }
        Ok(None)
    }

    /// Set every step in the phase back to pending, in memory and on disk.
    fn reset_phase(
        &self,
        ctx: &SharedContext,
        steps: &[StepId],
        statuses: &mut BTreeMap<StepId, StepStatus>,
    ) -> Result<()> {
        for id in steps {
            self.record_status(ctx, *id, StepStatus::Pending, statuses)?;
        }
        Ok(())
    }

    fn record_status(
        &self,
        ctx: &SharedContext,
        step: StepId,
        status: StepStatus,
        statuses: &mut BTreeMap<StepId, StepStatus>,
    ) -> Result<()> {
        statuses.insert(step, status);
        self.store
            .update_step_status(ctx.task().store_key(), step, status)
    }
}
