// crates/ab-verdict-cli/src/main.rs
// ============================================================================
// Module: AB Verdict CLI Entry Point
// Description: Command dispatcher for A/B workbook analysis runs.
// Purpose: Provide a safe command-line surface over the analysis pipeline.
// Dependencies: ab-verdict-core, clap, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The AB Verdict CLI loads a workbook directory, prints the descriptive
//! summaries, and runs the three-stage hypothesis procedure over the
//! selected metric. Input files and configuration are untrusted and are
//! validated by the core crate before any statistics run.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use ab_verdict_core::AbTestReport;
use ab_verdict_core::AnalysisConfig;
use ab_verdict_core::CombinedDataset;
use ab_verdict_core::DatasetSummary;
use ab_verdict_core::FormatOptions;
use ab_verdict_core::Metric;
use ab_verdict_core::load_workbook;
use ab_verdict_core::render_report;
use ab_verdict_core::render_summary;
use ab_verdict_core::run_ab_test;
use ab_verdict_core::summarize;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// AB Verdict: purchase A/B analysis over a two-sheet workbook.
#[derive(Parser, Debug)]
#[command(name = "ab-verdict", version, about)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the full analysis and prints the report.
    Report(ReportCommand),
    /// Configuration file tasks.
    Config {
        /// Configuration subcommand.
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Arguments for the `report` command.
#[derive(Args, Debug)]
struct ReportCommand {
    /// Workbook directory holding control_group.csv and test_group.csv.
    #[arg(long, value_name = "DIR")]
    workbook: PathBuf,
    /// Metric column to compare between arms.
    #[arg(long, value_enum, default_value_t = MetricArg::Purchase)]
    metric: MetricArg,
    /// Significance level override (defaults to the config value).
    #[arg(long, value_name = "ALPHA")]
    alpha: Option<f64>,
    /// Preview row override for the dataset summaries.
    #[arg(long, value_name = "ROWS")]
    preview_rows: Option<usize>,
    /// Optional analysis configuration file (TOML).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validates a configuration file and reports the first violation.
    Validate {
        /// Path of the configuration file.
        #[arg(long, value_name = "PATH")]
        path: PathBuf,
    },
}

/// Metric column selector.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum MetricArg {
    /// Compare the Impression column.
    Impression,
    /// Compare the Click column.
    Click,
    /// Compare the Purchase column.
    Purchase,
    /// Compare the Earning column.
    Earning,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Impression => Self::Impression,
            MetricArg::Click => Self::Click,
            MetricArg::Purchase => Self::Purchase,
            MetricArg::Earning => Self::Earning,
        }
    }
}

/// Output formats for the `report` command.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text report.
    Text,
    /// Machine-readable JSON document.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Report(command) => command_report(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: Report Command
// ============================================================================

/// Machine-readable report document for JSON output.
#[derive(Debug, Serialize, Deserialize)]
struct ReportDocument {
    /// Summary of the control sheet.
    control_summary: DatasetSummary,
    /// Summary of the test sheet.
    test_summary: DatasetSummary,
    /// Total rows after merging, control rows first.
    merged_rows: usize,
    /// Full hypothesis-test record.
    report: AbTestReport,
}

/// Executes the `report` command.
fn command_report(command: &ReportCommand) -> CliResult<ExitCode> {
    let config = resolve_config(command)?;

    let (control, test) =
        load_workbook(&command.workbook).map_err(|err| CliError::new(err.to_string()))?;
    let control_summary = summarize(&control, config.preview_rows);
    let test_summary = summarize(&test, config.preview_rows);

    let combined = CombinedDataset::merge(&control, &test)
        .map_err(|err| CliError::new(err.to_string()))?;
    let report = run_ab_test(&combined, command.metric.into(), &config)
        .map_err(|err| CliError::new(err.to_string()))?;

    match command.format {
        OutputFormat::Text => {
            let options = FormatOptions::default();
            write_stdout_line(&render_summary(&control_summary, &options))?;
            write_stdout_line(&render_summary(&test_summary, &options))?;
            write_stdout_line(&format!("merged rows: {}", combined.len()))?;
            write_stdout_line("")?;
            write_stdout_line(&render_report(&report, &options))?;
        }
        OutputFormat::Json => {
            let document = ReportDocument {
                control_summary,
                test_summary,
                merged_rows: combined.len(),
                report,
            };
            let rendered = serde_json::to_string_pretty(&document)
                .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
            write_stdout_line(&rendered)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Resolves the analysis configuration from file and flag overrides.
fn resolve_config(command: &ReportCommand) -> CliResult<AnalysisConfig> {
    let mut config = match &command.config {
        Some(path) => {
            AnalysisConfig::load(path).map_err(|err| CliError::new(err.to_string()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(alpha) = command.alpha {
        config.alpha = alpha;
    }
    if let Some(preview_rows) = command.preview_rows {
        config.preview_rows = preview_rows;
    }
    config.validate().map_err(|err| CliError::new(err.to_string()))?;
    Ok(config)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the `config` subcommands.
fn command_config(command: &ConfigCommands) -> CliResult<ExitCode> {
    match command {
        ConfigCommands::Validate {
            path,
        } => {
            AnalysisConfig::load(path).map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_line("config ok")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes the error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "error: {message}");
    ExitCode::FAILURE
}
