//! CLI module for skatepark
//!
//! Provides command-line interface for:
//! - serve: Load configuration once, build components, serve HTTP
//! - migrate: Create the schema and the administrator row

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{migrate, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
