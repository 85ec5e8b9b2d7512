//! Batch command implementation.
//!
//! `pushcart batch` publishes several listings back to back, with an
//! optional pause between tasks so the storefront session is not hammered.
//! One task failing does not stop the batch; the summary says which ones
//! need another look.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::cli::args::BatchArgs;
use crate::config::Config;
use crate::error::{PushcartError, Result};
use crate::pipeline::{RunOptions, SharedContext, StepSelection};
use crate::records::{HttpRecordStore, RecordStore};

use super::{build_orchestrator, Command, CommandResult};

pub struct BatchCommand {
    config_path: Option<PathBuf>,
    args: BatchArgs,
}

impl BatchCommand {
    pub fn new(config_path: Option<PathBuf>, args: BatchArgs) -> Self {
        Self { config_path, args }
    }

    /// The product ids this batch should publish, in order.
    fn products(&self, config: &Config) -> Result<Vec<String>> {
        if self.args.pending {
            let records: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(&config.records)?);
            return Ok(records
                .pending_records()?
                .into_iter()
                .filter(|r| {
                    self.args.brand.is_none() || r.fields.brand.as_deref() == self.args.brand.as_deref()
                })
                .filter(|r| {
                    self.args.category.is_none()
                        || r.fields.category.as_deref() == self.args.category.as_deref()
                })
                .map(|r| r.fields.product_id)
                .collect());
        }

        let mut products = self.args.products.clone();
        if let Some(file) = &self.args.file {
            let content = fs::read_to_string(file)?;
            products.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }
        Ok(products)
    }
}

impl Command for BatchCommand {
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

        let products = self.products(&config)?;
        if products.is_empty() {
            eprintln!("{} nothing to publish", style("error:").red().bold());
            return Ok(CommandResult::failure(2));
        }

        let orchestrator = build_orchestrator(&config)?;
        let options = RunOptions {
            brand: self.args.brand.clone(),
            category: self.args.category.clone(),
        };

        let bar = ProgressBar::new(products.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{pos}/{len} [{bar:30}] {msg}")
                .unwrap()
                .progress_chars("=> "),
        );

        let mut failed: Vec<String> = Vec::new();
        let total = products.len();
        let started = Instant::now();

        for (index, product) in products.iter().enumerate() {
            bar.set_message(product.clone());
            info!(product = %product, index, total, "batch task starting");

            let mut ctx = SharedContext::new(Some(product), options.clone());
            let report = orchestrator.run(&mut ctx, &StepSelection::All)?;
            bar.suspend(|| print!("{}", report.render()));

            if !report.success() {
                failed.push(product.clone());
            }
            bar.inc(1);

            if self.args.pause_secs > 0 && index + 1 < total {
                thread::sleep(Duration::from_secs(self.args.pause_secs));
            }
        }
        bar.finish_and_clear();

        let ok = total - failed.len();
        let elapsed = started.elapsed().as_secs();
        println!(
            "\n{} {ok}/{total} published in {elapsed}s",
            if failed.is_empty() {
                style("Batch complete.").green().to_string()
            } else {
                style("Batch finished with failures.").yellow().to_string()
            }
        );
        for product in &failed {
            println!("  {} {product}", style("✗").red());
        }

        if failed.is_empty() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_list_skips_blank_and_comment_lines() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("products.txt");
        fs::write(&list, "C1\n\n# paused\nC2\n").unwrap();

        let cmd = BatchCommand::new(
            None,
            BatchArgs {
                file: Some(list),
                ..BatchArgs::default()
            },
        );

        let config: Config = serde_yaml::from_str(
            "storefront:\n  base_url: https://s.example.com\nrecords:\n  base_url: https://r.example.com\n  table: products\n",
        )
        .unwrap();
        assert_eq!(cmd.products(&config).unwrap(), vec!["C1", "C2"]);
    }
}
