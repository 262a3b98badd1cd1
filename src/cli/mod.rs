//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{
    ClearHistoryCommand, DiffCommand, ExportCommand, HistoryCommand, RunCommand, StepsCommand,
    ValidateCommand,
};

/// Multi-step text revision pipeline tool
#[derive(Debug, Parser, Clone)]
#[command(name = "redraft")]
#[command(author = "Redraft Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A multi-step text revision pipeline tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the full revision pipeline over a text
    Run(RunCommand),

    /// List the steps of the pipeline
    Steps(StepsCommand),

    /// Show the word-level diff between two texts
    Diff(DiffCommand),

    /// Show revision history
    History(HistoryCommand),

    /// Export revision history to a file
    Export(ExportCommand),

    /// Delete all revision history
    ClearHistory(ClearHistoryCommand),

    /// Validate a pipeline configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
