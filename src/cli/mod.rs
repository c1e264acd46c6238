//! CLI module for zipstore
//!
//! Provides command-line interface for:
//! - build: Convert a delimited dataset into a store and index
//! - lookup: Resolve postal codes through the index
//! - export: Write the store back out as CSV
//! - extremes: Per-state extremes report
//! - info: Store header and index summary

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, PathArgs};
pub use commands::{build, export, extremes, info, lookup, resolve_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
