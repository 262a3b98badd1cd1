//! CLI command definitions

use crate::history::ExportFormat;
use clap::Args;

/// Run the full revision pipeline over a text
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Text to revise
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(short, long)]
    pub file: Option<String>,

    /// Path to a pipeline YAML config (built-in catalog when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Don't record the run in history
    #[arg(long)]
    pub no_history: bool,

    /// Show the word diff after each completed step
    #[arg(long)]
    pub show_diff: bool,
}

/// List the steps of the pipeline
#[derive(Debug, Args, Clone)]
pub struct StepsCommand {
    /// Path to a pipeline YAML config (built-in catalog when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show the word-level diff between two texts
#[derive(Debug, Args, Clone)]
pub struct DiffCommand {
    /// File holding the original text
    pub original: String,

    /// File holding the revised text
    pub revised: String,

    /// Output the spans in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show revision history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Number of recent records to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Show full texts and per-change notes
    #[arg(long)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Export revision history to a file
#[derive(Debug, Args, Clone)]
pub struct ExportCommand {
    /// Export format
    #[arg(long, value_enum, default_value_t = ExportFormatArg::Json)]
    pub format: ExportFormatArg,

    /// Output path (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Delete all revision history
#[derive(Debug, Args, Clone)]
pub struct ClearHistoryCommand {
    /// Confirm the irreversible deletion
    #[arg(long)]
    pub yes: bool,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Export format argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}
