//! Command-line interface definitions.

pub mod check;
pub mod info;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gdploa - Logic-based outer approximation for disjunctive programs.
#[derive(Parser, Debug)]
#[command(name = "gdploa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration file and resolve its solver selectors
    Check(ConfigPathArg),

    /// Print the default configuration as TOML
    Defaults,

    /// List built-in solver adapters
    Solvers,
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(default_value = "gdploa.toml")]
    pub config: PathBuf,
}
