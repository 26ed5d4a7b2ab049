//! Command-line interface for aeroql
//!
//! - query: plan and execute one SQL file, write the result file
//! - explain: plan one SQL file, print the plan as JSON

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, explain_plan, query, run, run_command};
pub use config::EngineConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_query, write_result};
