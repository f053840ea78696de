// crates/ab-verdict-core/src/report.rs
// ============================================================================
// Module: AB Verdict Report Rendering
// Description: Text rendering of summaries and hypothesis-test reports.
// Purpose: Produce the human-readable run record at fixed precision.
// Dependencies: crate::describe, crate::runner
// ============================================================================

//! ## Overview
//! Rendering is a pure function from report values to text. Formatting is
//! controlled by local [`FormatOptions`] passed per call; there is no
//! process-wide display state. Statistics and p-values render at four
//! decimal places by default, matching conventional statistical reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use crate::describe::DatasetSummary;
use crate::describe::QUANTILE_PROBABILITIES;
use crate::runner::AbTestReport;

// ============================================================================
// SECTION: Format Options
// ============================================================================

/// Local formatting options for report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Decimal places for statistics and p-values.
    pub decimals: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            decimals: 4,
        }
    }
}

impl FormatOptions {
    /// Formats one numeric value at the configured precision.
    #[must_use]
    pub fn number(&self, value: f64) -> String {
        format!("{value:.precision$}", precision = self.decimals)
    }
}

// ============================================================================
// SECTION: Summary Rendering
// ============================================================================

/// Renders a dataset summary as text.
#[must_use]
pub fn render_summary(summary: &DatasetSummary, options: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", summary.group.sheet_label());
    let _ = writeln!(out, "shape: {} rows x {} columns", summary.row_count, summary.column_count);

    let _ = writeln!(out, "types:");
    for (name, type_name) in &summary.column_types {
        let _ = writeln!(out, "  {name:<10} {type_name}");
    }

    let _ = writeln!(out, "head:");
    let _ = writeln!(out, "  {:>12} {:>10} {:>10} {:>10}", "Impression", "Click", "Purchase", "Earning");
    for row in &summary.head {
        let _ = writeln!(
            out,
            "  {:>12} {:>10} {:>10} {:>10}",
            options.number(row.impression),
            options.number(row.click),
            options.number(row.purchase),
            options.number(row.earning),
        );
    }

    let _ = writeln!(out, "quantiles:");
    let header: Vec<String> = QUANTILE_PROBABILITIES
        .iter()
        .map(|&q| format!("{q:>10}"))
        .collect();
    let _ = writeln!(out, "  {:<10} {}", "", header.join(" "));
    for column in &summary.quantiles {
        let values: Vec<String> = column
            .values
            .iter()
            .map(|&value| format!("{:>10}", options.number(value)))
            .collect();
        let _ = writeln!(out, "  {:<10} {}", column.metric.column_name(), values.join(" "));
    }

    out
}

// ============================================================================
// SECTION: Test Report Rendering
// ============================================================================

/// Renders the full hypothesis-test report as text.
#[must_use]
pub fn render_report(report: &AbTestReport, options: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "A/B test on {} (alpha = {})",
        report.metric.column_name(),
        options.number(report.alpha),
    );
    let _ = writeln!(
        out,
        "group means: control = {}, test = {}",
        options.number(report.control_mean),
        options.number(report.test_mean),
    );

    let _ = writeln!(out, "stage 1: normality (Shapiro-Wilk)");
    for result in &report.normality {
        let _ = writeln!(
            out,
            "  {:<13} stat = {}, p = {} -> {}",
            result.group.sheet_label(),
            options.number(result.outcome.statistic),
            options.number(result.outcome.p_value),
            if result.normal { "normal" } else { "not normal" },
        );
    }

    let _ = writeln!(out, "stage 2: variance homogeneity (Levene)");
    let _ = writeln!(
        out,
        "  stat = {}, p = {} -> {}",
        options.number(report.variance.outcome.statistic),
        options.number(report.variance.outcome.p_value),
        if report.variance.homogeneous {
            "homogeneous"
        } else {
            "not homogeneous"
        },
    );

    let _ = writeln!(out, "stage 3: mean comparison");
    let _ = writeln!(out, "  selected: {}", report.choice.name());
    let _ = writeln!(out, "  reason:   {}", report.choice.justification());
    let _ = writeln!(
        out,
        "  stat = {}, p = {}",
        options.number(report.comparison.statistic),
        options.number(report.comparison.p_value),
    );

    let _ = writeln!(out, "verdict: {}", report.verdict.describe());
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Assertion macros are the natural test idiom."
    )]

    use super::*;
    use crate::config::AnalysisConfig;
    use crate::dataset::CombinedDataset;
    use crate::dataset::Dataset;
    use crate::dataset::Group;
    use crate::dataset::Metric;
    use crate::dataset::Observation;
    use crate::describe::summarize;
    use crate::runner::run_ab_test;

    /// Builds a dataset whose purchase column is the supplied values.
    fn dataset(group: Group, purchases: &[f64]) -> Dataset {
        let rows = purchases
            .iter()
            .map(|&purchase| Observation {
                impression: 1_000.0,
                click: 50.0,
                purchase,
                earning: 2_000.0,
            })
            .collect();
        Dataset::new(group, rows)
    }

    #[test]
    fn format_options_render_four_decimals_by_default() {
        let options = FormatOptions::default();
        assert_eq!(options.number(0.349_312_9), "0.3493");
        assert_eq!(options.number(-0.941_6), "-0.9416");
    }

    #[test]
    fn summary_rendering_names_the_sheet_and_shape() {
        let summary = summarize(&dataset(Group::Control, &[1.0, 2.0, 3.0]), 5);
        let text = render_summary(&summary, &FormatOptions::default());
        assert!(text.contains("=== Control Group ==="));
        assert!(text.contains("shape: 3 rows x 4 columns"));
        assert!(text.contains("Purchase"));
    }

    #[test]
    fn report_rendering_contains_every_stage_and_the_verdict() -> Result<(), String> {
        let control =
            dataset(Group::Control, &[10.0, 12.0, 11.0, 13.0, 9.0, 12.5, 10.5, 11.5, 10.2, 11.8]);
        let test =
            dataset(Group::Test, &[10.5, 12.5, 11.5, 13.5, 9.5, 13.0, 11.0, 12.0, 10.7, 12.3]);
        let combined =
            CombinedDataset::merge(&control, &test).map_err(|err| err.to_string())?;
        let report = run_ab_test(&combined, Metric::Purchase, &AnalysisConfig::default())
            .map_err(|err| err.to_string())?;

        let text = render_report(&report, &FormatOptions::default());
        assert!(text.contains("stage 1: normality (Shapiro-Wilk)"));
        assert!(text.contains("stage 2: variance homogeneity (Levene)"));
        assert!(text.contains("stage 3: mean comparison"));
        assert!(text.contains("verdict:"));
        assert!(text.contains("Control Group"));
        assert!(text.contains("Test Group"));
        Ok(())
    }

    #[test]
    fn custom_precision_is_honored() {
        let options = FormatOptions {
            decimals: 2,
        };
        assert_eq!(options.number(1.005), "1.00");
        assert_eq!(options.number(3.141_59), "3.14");
    }
}
