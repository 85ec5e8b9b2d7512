//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pushcart - storefront listing publication pipeline.
#[derive(Debug, Parser)]
#[command(name = "pushcart")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default pushcart.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Publish one listing through the pipeline
    Run(RunArgs),

    /// Publish several listings in sequence
    Batch(BatchArgs),

    /// Show the persisted step status of a task
    Status(StatusArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Product id to publish; omit to pick the next pending record
    #[arg(short, long)]
    pub product: Option<String>,

    /// Run only these step ids (repeatable, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub step: Vec<u8>,

    /// First step id to run
    #[arg(long, conflicts_with = "step")]
    pub from: Option<u8>,

    /// Last step id to run
    #[arg(long, conflicts_with = "step")]
    pub to: Option<u8>,

    /// List the steps that would run without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Only pick pending records with this brand
    #[arg(long)]
    pub brand: Option<String>,

    /// Only pick pending records with this category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `batch` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BatchArgs {
    /// Product ids to publish, in order
    pub products: Vec<String>,

    /// File with one product id per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Publish every pending record instead of an explicit list
    #[arg(long, conflicts_with_all = ["products", "file"])]
    pub pending: bool,

    /// Seconds to pause between tasks
    #[arg(long, default_value_t = 0)]
    pub pause_secs: u64,

    /// Only pick pending records with this brand
    #[arg(long)]
    pub brand: Option<String>,

    /// Only pick pending records with this category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
    /// Product id to inspect
    #[arg(short, long)]
    pub product: String,

    /// Print the raw task record as JSON
    #[arg(long)]
    pub json: bool,
}
