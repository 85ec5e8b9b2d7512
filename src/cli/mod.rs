//! Command-line interface for Pushcart.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{BatchArgs, Cli, Commands, RunArgs, StatusArgs};
pub use commands::{dispatch, Command, CommandResult};
