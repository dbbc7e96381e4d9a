//! CLI module for schemac
//!
//! Provides command-line interface for:
//! - compile: Compile entity files into artifacts
//! - validate: Check stdin records against one entity

mod args;
mod commands;
mod errors;
mod io;

use tracing_subscriber::EnvFilter;

pub use args::{Cli, Command};
pub use commands::{compile, compile_entities, run_command, validate, validate_records};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_records, write_error, write_line, write_response};

/// Parses arguments and runs the selected command.
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn run() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let result = run_command(cli.command);

    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}
