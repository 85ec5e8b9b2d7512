//! Status command implementation.
//!
//! `pushcart status` shows the persisted per-step statuses of one task,
//! straight from its state file.

use std::path::PathBuf;

use console::style;

use crate::cli::args::StatusArgs;
use crate::config::Config;
use crate::error::{PushcartError, Result};
use crate::state::{JsonTaskStore, StepStatus, TaskStateStore};
use crate::steps::StepId;

use super::{Command, CommandResult};

pub struct StatusCommand {
    config_path: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(config_path: Option<PathBuf>, args: StatusArgs) -> Self {
        Self { config_path, args }
    }
}

impl Command for StatusCommand {
    fn execute(&self) -> Result<CommandResult> {
        let config = match Config::load(self.config_path.as_deref()) {
            Ok(c) => c,
            Err(PushcartError::ConfigNotFound { path }) => {
                eprintln!(
                    "{} no configuration at {}",
                    style("error:").red().bold(),
                    path.display()
                );
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let store = JsonTaskStore::new(config.cache_dir);
        if !store.record_file(&self.args.product).exists() {
            eprintln!(
                "{} no state recorded for {}",
                style("error:").red().bold(),
                self.args.product
            );
            return Ok(CommandResult::failure(1));
        }

        let record = store.load(&self.args.product)?;

        if self.args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&record)
                    .map_err(|e| PushcartError::Other(e.into()))?
            );
            return Ok(CommandResult::success());
        }

        println!(
            "Task {} (created {})",
            style(&record.id).bold(),
            record.created_at.format("%Y-%m-%d %H:%M")
        );
        for id in StepId::all() {
            let status = record.status(id);
            let label = match status {
                StepStatus::Done => style(status.label()).green(),
                StepStatus::Failed => style(status.label()).red(),
                StepStatus::Skipped => style(status.label()).yellow(),
                StepStatus::Pending => style(status.label()).dim(),
            };
            println!("  [{:>2}] {:<22} {label}", id, id.name());
        }

        Ok(CommandResult::success())
    }
}
