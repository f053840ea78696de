// crates/ab-verdict-cli/src/main_tests.rs
// ============================================================================
// Module: AB Verdict CLI Tests
// Description: Argument parsing and command execution tests.
// Purpose: Ensure flag defaults, overrides, and end-to-end runs behave.
// ============================================================================

//! ## Overview
//! Validates flag parsing, configuration resolution, and full command runs
//! against fixture workbooks.

#![allow(
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Assertion macros are the natural test idiom."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use clap::Parser;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use super::AnalysisConfig;
use super::Cli;
use super::CombinedDataset;
use super::Commands;
use super::ConfigCommands;
use super::Metric;
use super::MetricArg;
use super::OutputFormat;
use super::ReportCommand;
use super::ReportDocument;
use super::command_config;
use super::command_report;
use super::load_workbook;
use super::resolve_config;
use super::run_ab_test;
use super::summarize;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Result alias for fallible tests.
type TestResult = Result<(), String>;

/// Purchase sample of size `n` shaped exactly like normal order statistics.
fn blom_sample(n: usize, location: f64, scale: f64) -> Result<Vec<f64>, String> {
    let normal = Normal::new(0.0, 1.0).map_err(|err| err.to_string())?;
    #[allow(clippy::cast_precision_loss, reason = "fixture sizes are tiny")]
    let n_f = n as f64;
    Ok((0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss, reason = "fixture sizes are tiny")]
            let rank = (i + 1) as f64;
            scale.mul_add(normal.inverse_cdf((rank - 0.375) / (n_f + 0.25)), location)
        })
        .collect())
}

/// Writes one sheet CSV whose purchase column is the supplied values.
fn write_sheet(dir: &std::path::Path, file_name: &str, purchases: &[f64]) -> TestResult {
    let mut content = String::from("Impression,Click,Purchase,Earning\n");
    for purchase in purchases {
        content.push_str(&format!("100000,5000,{purchase},2000\n"));
    }
    std::fs::write(dir.join(file_name), content).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn report_defaults_to_purchase_and_text() -> TestResult {
    let cli = Cli::try_parse_from(["ab-verdict", "report", "--workbook", "wb"])
        .map_err(|err| err.to_string())?;
    let Commands::Report(command) = cli.command else {
        return Err("expected report command".to_string());
    };
    assert_eq!(command.metric, MetricArg::Purchase);
    assert_eq!(command.format, OutputFormat::Text);
    assert!(command.alpha.is_none());
    assert!(command.config.is_none());
    Ok(())
}

#[test]
fn report_accepts_metric_and_format_overrides() -> TestResult {
    let cli = Cli::try_parse_from([
        "ab-verdict",
        "report",
        "--workbook",
        "wb",
        "--metric",
        "earning",
        "--format",
        "json",
        "--alpha",
        "0.01",
    ])
    .map_err(|err| err.to_string())?;
    let Commands::Report(command) = cli.command else {
        return Err("expected report command".to_string());
    };
    assert_eq!(command.metric, MetricArg::Earning);
    assert_eq!(command.format, OutputFormat::Json);
    assert_eq!(command.alpha, Some(0.01));
    Ok(())
}

#[test]
fn report_requires_a_workbook() {
    assert!(Cli::try_parse_from(["ab-verdict", "report"]).is_err());
}

#[test]
fn metric_arg_maps_onto_core_metric() {
    assert_eq!(Metric::from(MetricArg::Impression), Metric::Impression);
    assert_eq!(Metric::from(MetricArg::Click), Metric::Click);
    assert_eq!(Metric::from(MetricArg::Purchase), Metric::Purchase);
    assert_eq!(Metric::from(MetricArg::Earning), Metric::Earning);
}

#[test]
fn flag_overrides_are_validated() {
    let command = ReportCommand {
        workbook: PathBuf::from("wb"),
        metric: MetricArg::Purchase,
        alpha: Some(2.0),
        preview_rows: None,
        config: None,
        format: OutputFormat::Text,
    };
    let result = resolve_config(&command);
    let message = match result {
        Err(err) => err.to_string(),
        Ok(_) => String::new(),
    };
    assert!(message.contains("alpha"), "message: {message}");
}

#[test]
fn config_validate_rejects_bad_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("analysis.toml");
    std::fs::write(&path, "alpha = \"high\"\n").map_err(|err| err.to_string())?;

    let result = command_config(&ConfigCommands::Validate {
        path,
    });
    assert!(result.is_err());
    Ok(())
}

#[test]
fn report_command_runs_end_to_end() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    write_sheet(dir.path(), "control_group.csv", &blom_sample(20, 550.0, 130.0)?)?;
    write_sheet(dir.path(), "test_group.csv", &blom_sample(20, 560.0, 125.0)?)?;

    let command = ReportCommand {
        workbook: dir.path().to_path_buf(),
        metric: MetricArg::Purchase,
        alpha: None,
        preview_rows: None,
        config: None,
        format: OutputFormat::Json,
    };
    let _code = command_report(&command).map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn json_document_round_trips_through_serde() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    write_sheet(dir.path(), "control_group.csv", &blom_sample(20, 550.0, 130.0)?)?;
    write_sheet(dir.path(), "test_group.csv", &blom_sample(20, 560.0, 125.0)?)?;

    let config = AnalysisConfig::default();
    let (control, test) = load_workbook(dir.path()).map_err(|err| err.to_string())?;
    let combined = CombinedDataset::merge(&control, &test).map_err(|err| err.to_string())?;
    let document = ReportDocument {
        control_summary: summarize(&control, config.preview_rows),
        test_summary: summarize(&test, config.preview_rows),
        merged_rows: combined.len(),
        report: run_ab_test(&combined, Metric::Purchase, &config)
            .map_err(|err| err.to_string())?,
    };

    let rendered = serde_json::to_string_pretty(&document).map_err(|err| err.to_string())?;
    let decoded: ReportDocument =
        serde_json::from_str(&rendered).map_err(|err| err.to_string())?;
    assert_eq!(decoded.merged_rows, document.merged_rows);
    assert_eq!(decoded.control_summary, document.control_summary);
    assert_eq!(decoded.test_summary, document.test_summary);
    assert_eq!(decoded.report, document.report);
    Ok(())
}

#[test]
fn report_command_surfaces_missing_workbook() {
    let command = ReportCommand {
        workbook: PathBuf::from("/nonexistent/workbook"),
        metric: MetricArg::Purchase,
        alpha: None,
        preview_rows: None,
        config: None,
        format: OutputFormat::Text,
    };
    let result = command_report(&command);
    let message = match result {
        Err(err) => err.to_string(),
        Ok(_) => String::new(),
    };
    assert!(message.contains("Control Group"), "message: {message}");
}
