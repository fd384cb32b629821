//! Command-line interface for txtdb
//!
//! Provides one-shot commands over the tables declared in a config file:
//! - tables: list table layouts
//! - count / get / select: read rows
//! - insert / update: write rows and commit immediately

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{entity_json, write_error, write_response};
