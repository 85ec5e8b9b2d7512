//! Integration tests for pipeline orchestration.
//!
//! These drive the orchestrator through scripted step handlers so every
//! policy decision is observable: execution order, whole-phase retries,
//! the submission guard and dynamic task-id resolution.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pushcart::config::RetryConfig;
use pushcart::pipeline::{Orchestrator, RunOptions, SharedContext, StepSelection};
use pushcart::state::{JsonTaskStore, StepStatus, TaskStateStore};
use pushcart::steps::{StepHandler, StepId, StepRegistry};
use pushcart::{PushcartError, Result};
use tempfile::TempDir;

fn step(n: u8) -> StepId {
    StepId::new(n).unwrap()
}

/// Scripted handler: records each execution, fails the first N times.
struct Scripted {
    id: u8,
    log: Rc<RefCell<Vec<u8>>>,
    fail_first: Cell<u32>,
    /// Simulate a submission that committed remotely before the step error
    /// surfaced: latch the guard, then fail.
    latch_on_fail: bool,
}

impl Scripted {
    fn ok(id: u8, log: &Rc<RefCell<Vec<u8>>>) -> Box<Self> {
        Self::failing(id, log, 0)
    }

    fn failing(id: u8, log: &Rc<RefCell<Vec<u8>>>, fail_first: u32) -> Box<Self> {
        Box::new(Self {
            id,
            log: log.clone(),
            fail_first: Cell::new(fail_first),
            latch_on_fail: false,
        })
    }
}

impl StepHandler for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
        self.log.borrow_mut().push(self.id);
        if self.fail_first.get() > 0 {
            self.fail_first.set(self.fail_first.get() - 1);
            if self.latch_on_fail {
                ctx.mark_submitted();
            }
            return Err(PushcartError::StepFailed {
                step: step(self.id),
                name: "scripted",
                message: "induced failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Registry with a scripted handler on every step id.
fn full_registry(log: &Rc<RefCell<Vec<u8>>>) -> StepRegistry {
    let mut registry = StepRegistry::new();
    for id in StepId::all() {
        registry.register(id, Scripted::ok(id.get(), log));
    }
    registry
}

fn orchestrator(
    registry: StepRegistry,
    temp: &TempDir,
    retries: RetryConfig,
) -> Orchestrator<JsonTaskStore> {
    Orchestrator::new(registry, JsonTaskStore::new(temp.path()), retries)
}

#[test]
fn full_run_executes_steps_in_ascending_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let temp = TempDir::new().unwrap();
    let orch = orchestrator(full_registry(&log), &temp, RetryConfig::default());

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    let report = orch.run(&mut ctx, &StepSelection::All).unwrap();

    assert!(report.success());
    assert_eq!(*log.borrow(), (0..=14).collect::<Vec<u8>>());
    assert!(report
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Done));
}

#[test]
fn setup_failure_reruns_the_whole_phase() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = StepRegistry::new();
    registry.register(step(0), Scripted::ok(0, &log));
    registry.register(step(1), Scripted::ok(1, &log));
    registry.register(step(2), Scripted::failing(2, &log, 1));
    registry.register(step(3), Scripted::ok(3, &log));

    let temp = TempDir::new().unwrap();
    let orch = orchestrator(registry, &temp, RetryConfig::default());

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    let selection = StepSelection::Range {
        from: step(0),
        to: step(3),
    };
    let report = orch.run(&mut ctx, &selection).unwrap();

    assert!(report.success());
    // Steps 0 and 1 were already done but re-run with the phase; step 3 was
    // never reached on the first attempt.
    assert_eq!(*log.borrow(), vec![0, 1, 2, 0, 1, 2, 3]);

    let record = JsonTaskStore::new(temp.path()).load("C1001").unwrap();
    for n in 0..=3 {
        assert_eq!(record.status(step(n)), StepStatus::Done);
    }
}

#[test]
fn exhausted_retries_abort_the_run() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = full_registry(&log);
    registry.register(step(5), Scripted::failing(5, &log, u32::MAX));

    let temp = TempDir::new().unwrap();
    let retries = RetryConfig {
        setup: 0,
        publish: 2,
        report: 0,
    };
    let orch = orchestrator(registry, &temp, retries);

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    let report = orch.run(&mut ctx, &StepSelection::All).unwrap();

    assert!(!report.success());
    match &report.failure {
        Some(PushcartError::RetryExhausted {
            phase, attempts, ..
        }) => {
            assert_eq!(*phase, "publish");
            assert_eq!(*attempts, 3);
        }
        other => panic!("expected retry exhaustion, got {other:?}"),
    }

    // Initial attempt plus two retries.
    let attempts_on_5 = log.borrow().iter().filter(|n| **n == 5).count();
    assert_eq!(attempts_on_5, 3);
    // The report phase never ran.
    assert!(!log.borrow().contains(&14));
    assert_eq!(report.steps[14].status, StepStatus::Pending);

    let record = JsonTaskStore::new(temp.path()).load("C1001").unwrap();
    assert_eq!(record.status(step(5)), StepStatus::Failed);
}

#[test]
fn guard_prevents_publish_phase_rerun() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = full_registry(&log);
    registry.register(
        step(13),
        Box::new(Scripted {
            id: 13,
            log: log.clone(),
            fail_first: Cell::new(1),
            latch_on_fail: true,
        }),
    );

    let temp = TempDir::new().unwrap();
    let orch = orchestrator(registry, &temp, RetryConfig::default());

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    let report = orch.run(&mut ctx, &StepSelection::All).unwrap();

    // The phase aborted instead of re-running: step 13 ran exactly once
    // even though the publish phase had retry budget left.
    let attempts_on_13 = log.borrow().iter().filter(|n| **n == 13).count();
    assert_eq!(attempts_on_13, 1);
    assert!(report.guarded);

    // The run continued: the report phase still executed.
    assert!(log.borrow().contains(&14));
    assert!(report.failure.is_none());
    assert!(!report.success());
    assert_eq!(report.steps[13].status, StepStatus::Failed);
    assert_eq!(report.steps[14].status, StepStatus::Done);
}

#[test]
fn discovery_step_resolves_placeholder_task() {
    struct Resolver;
    impl StepHandler for Resolver {
        fn name(&self) -> &'static str {
            "resolver"
        }
        fn execute(&self, ctx: &mut SharedContext) -> Result<()> {
            ctx.resolve_task("C7007");
            Ok(())
        }
    }

    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = StepRegistry::new();
    registry.register(step(0), Box::new(Resolver));
    registry.register(step(1), Scripted::ok(1, &log));

    let temp = TempDir::new().unwrap();
    let orch = orchestrator(registry, &temp, RetryConfig::default());

    let mut ctx = SharedContext::new(None, RunOptions::default());
    let selection = StepSelection::Range {
        from: step(0),
        to: step(1),
    };
    let report = orch.run(&mut ctx, &selection).unwrap();

    assert!(report.success());
    assert_eq!(report.task, "C7007");

    // Statuses written after discovery land under the resolved id.
    let store = JsonTaskStore::new(temp.path());
    let record = store.load("C7007").unwrap();
    assert_eq!(record.status(step(0)), StepStatus::Done);
    assert_eq!(record.status(step(1)), StepStatus::Done);
}

#[test]
fn unregistered_step_is_skipped_and_run_continues() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = StepRegistry::new();
    registry.register(step(4), Scripted::ok(4, &log));
    registry.register(step(6), Scripted::ok(6, &log));

    let temp = TempDir::new().unwrap();
    let orch = orchestrator(registry, &temp, RetryConfig::default());

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    let selection = StepSelection::Explicit(vec![step(4), step(5), step(6)]);
    let report = orch.run(&mut ctx, &selection).unwrap();

    assert!(report.success());
    assert_eq!(*log.borrow(), vec![4, 6]);
    assert_eq!(report.steps[1].status, StepStatus::Skipped);

    let record = JsonTaskStore::new(temp.path()).load("C1001").unwrap();
    assert_eq!(record.status(step(5)), StepStatus::Skipped);
}

#[test]
fn post_commit_hook_fires_after_commit_step() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let fired = Rc::new(Cell::new(0u32));

    let temp = TempDir::new().unwrap();
    let fired_in_hook = fired.clone();
    let orch = orchestrator(full_registry(&log), &temp, RetryConfig::default())
        .with_post_commit(
            step(13),
            Box::new(move |_ctx| {
                fired_in_hook.set(fired_in_hook.get() + 1);
            }),
        );

    let mut ctx = SharedContext::new(Some("C1001"), RunOptions::default());
    orch.run(&mut ctx, &StepSelection::All).unwrap();

    assert_eq!(fired.get(), 1);
}
