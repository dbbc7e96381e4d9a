//! CLI argument definitions using clap
//!
//! Commands:
//! - schemac compile --config <path> [FILES...]
//! - schemac validate --config <path> --entity <file>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schemac - compiles entity schemas into storage columns and validators
#[derive(Parser, Debug)]
#[command(name = "schemac")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile entity files and print the artifacts
    Compile {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity files; the configured schema directory when omitted
        files: Vec<PathBuf>,
    },

    /// Validate JSON records read line by line from stdin
    Validate {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity file the records belong to
        #[arg(long)]
        entity: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
