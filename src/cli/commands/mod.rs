//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. [`dispatch`]
//! routes a parsed [`Cli`] to the right implementation.

pub mod batch;
pub mod run;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::Config;
use crate::error::{PushcartError, Result};
use crate::pipeline::{Orchestrator, SharedContext, StepSelection};
use crate::records::{HttpRecordStore, RecordStore};
use crate::state::JsonTaskStore;
use crate::steps::{default_registry, StepId};
use crate::storefront::HttpStorefront;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, returning success/failure and an exit code.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatch and execute a parsed command line.
pub fn dispatch(cli: Cli) -> Result<CommandResult> {
    let config_path: Option<PathBuf> = cli.config;
    match cli.command {
        Commands::Run(args) => run::RunCommand::new(config_path, args).execute(),
        Commands::Batch(args) => batch::BatchCommand::new(config_path, args).execute(),
        Commands::Status(args) => status::StatusCommand::new(config_path, args).execute(),
    }
}

/// The id of the step whose success triggers the post-commit hook.
const COMMIT_STEP: u8 = 13;

/// Wire up the production pipeline from configuration.
///
/// The post-commit hook moves the remote record to the published status;
/// its failure is logged only, the submission already happened.
pub(crate) fn build_orchestrator(config: &Config) -> Result<Orchestrator<JsonTaskStore>> {
    let storefront = Arc::new(HttpStorefront::new(&config.storefront)?);
    let records: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(&config.records)?);

    let registry = default_registry(storefront, records.clone(), config);
    let store = JsonTaskStore::new(config.cache_dir.clone());

    let published = config.records.published_status.clone();
    let hook = move |ctx: &SharedContext| {
        let Some(record) = ctx.record.as_ref() else {
            return;
        };
        if let Err(e) = records.update_status(&record.record_ref, &published) {
            tracing::warn!(
                record = %record.record_ref,
                error = %e,
                "post-commit status update failed"
            );
        }
    };

    Ok(
        Orchestrator::new(registry, store, config.retries)
            .with_post_commit(StepId::parse(COMMIT_STEP)?, Box::new(hook)),
    )
}

/// Translate run arguments into a step selection.
pub(crate) fn selection_from_args(args: &RunArgs) -> Result<StepSelection> {
    if !args.step.is_empty() {
        let ids = args
            .step
            .iter()
            .map(|raw| StepId::parse(*raw))
            .collect::<Result<Vec<_>>>()?;
        return Ok(StepSelection::Explicit(ids));
    }

    match (args.from, args.to) {
        (None, None) => Ok(StepSelection::All),
        (from, to) => {
            let from = StepId::parse(from.unwrap_or(0))?;
            let to = StepId::parse(to.unwrap_or(crate::steps::MAX_STEP))?;
            if from > to {
                return Err(PushcartError::ConfigValidationError {
                    message: format!("--from {from} exceeds --to {to}"),
                });
            }
            Ok(StepSelection::Range { from, to })
        }
    }
}
