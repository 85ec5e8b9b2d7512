//! Run command implementation.
//!
//! `pushcart run` publishes one listing: the full pipeline by default, or
//! a subset via `--step`/`--from`/`--to`.

use std::path::PathBuf;

use console::style;

use crate::cli::args::RunArgs;
use crate::config::Config;
use crate::error::{PushcartError, Result};
use crate::pipeline::{phases, RunOptions, SharedContext};

use super::{build_orchestrator, selection_from_args, Command, CommandResult};

pub struct RunCommand {
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    pub fn new(config_path: Option<PathBuf>, args: RunArgs) -> Self {
        Self { config_path, args }
    }
}

impl Command for RunCommand {
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

        let selection = selection_from_args(&self.args)?;
        let steps = selection.resolve();
        if steps.is_empty() {
            eprintln!("{} selection matches no steps", style("error:").red().bold());
            return Ok(CommandResult::failure(2));
        }

        if self.args.dry_run {
            println!("Would run {} steps:", steps.len());
            for phase in phases(&config.retries) {
                let in_phase: Vec<_> = steps.iter().filter(|id| phase.contains(**id)).collect();
                if in_phase.is_empty() {
                    continue;
                }
                println!("{} (up to {} retries)", style(phase.name).bold(), phase.max_retries);
                for id in in_phase {
                    println!("  [{:>2}] {}", id, id.name());
                }
            }
            return Ok(CommandResult::success());
        }

        let orchestrator = build_orchestrator(&config)?;
        let mut ctx = SharedContext::new(
            self.args.product.as_deref(),
            RunOptions {
                brand: self.args.brand.clone(),
                category: self.args.category.clone(),
            },
        );

        let report = orchestrator.run(&mut ctx, &selection)?;
        print!("{}", report.render());

        if report.success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
