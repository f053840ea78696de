// crates/ab-verdict-core/src/describe.rs
// ============================================================================
// Module: AB Verdict Descriptive Summarizer
// Description: Shape, types, preview rows, and quantile summaries.
// Purpose: Human-facing sanity inspection of loaded datasets.
// Dependencies: crate::dataset, serde
// ============================================================================

//! ## Overview
//! The summarizer is a pure function from a dataset to a report: row and
//! column counts, per-column type names, the first N rows, and quantiles at
//! fixed probabilities for every numeric column. Quantiles use linear
//! interpolation on the sorted column, matching the source workbook's
//! conventional reporting. Summaries never feed back into the hypothesis
//! test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::dataset::Group;
use crate::dataset::Metric;
use crate::dataset::Observation;

// ============================================================================
// SECTION: Quantile Grid
// ============================================================================

/// Probabilities reported for every numeric column.
pub const QUANTILE_PROBABILITIES: [f64; 6] = [0.0, 0.05, 0.50, 0.95, 0.99, 1.0];

/// Computes a quantile of `values` by linear interpolation on sorted order.
///
/// `q` must lie in `[0, 1]`. Yields `None` for an empty slice.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(
        clippy::cast_precision_loss,
        reason = "row counts are far below f64 precision limits"
    )]
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "position is bounded by the slice length and non-negative"
    )]
    let lower_index = lower as usize;
    let upper_index = (lower_index + 1).min(sorted.len() - 1);
    let fraction = position - lower;

    Some(sorted[lower_index] + fraction * (sorted[upper_index] - sorted[lower_index]))
}

// ============================================================================
// SECTION: Summary Types
// ============================================================================

/// Quantile row for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuantiles {
    /// Column the quantiles describe.
    pub metric: Metric,
    /// Quantile values aligned with [`QUANTILE_PROBABILITIES`].
    pub values: [f64; 6],
}

/// Descriptive summary of one dataset.
///
/// # Invariants
/// - Preview rows preserve source order and never exceed the row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Arm the summary describes.
    pub group: Group,
    /// Number of rows in the dataset.
    pub row_count: usize,
    /// Number of columns in the schema.
    pub column_count: usize,
    /// Column names with their storage type.
    pub column_types: Vec<(String, String)>,
    /// First rows of the dataset, in source order.
    pub head: Vec<Observation>,
    /// Quantile grid per numeric column.
    pub quantiles: Vec<ColumnQuantiles>,
}

// ============================================================================
// SECTION: Summarizer
// ============================================================================

/// Summarizes a dataset for human inspection.
#[must_use]
pub fn summarize(dataset: &Dataset, preview_rows: usize) -> DatasetSummary {
    let head: Vec<Observation> =
        dataset.rows.iter().take(preview_rows).copied().collect();

    let column_types = Metric::ALL
        .iter()
        .map(|metric| (metric.column_name().to_string(), "f64".to_string()))
        .collect();

    let quantiles = Metric::ALL
        .iter()
        .map(|&metric| {
            let column = dataset.column(metric);
            let mut values = [f64::NAN; 6];
            for (slot, &q) in values.iter_mut().zip(QUANTILE_PROBABILITIES.iter()) {
                if let Some(value) = quantile(&column, q) {
                    *slot = value;
                }
            }
            ColumnQuantiles {
                metric,
                values,
            }
        })
        .collect();

    DatasetSummary {
        group: dataset.group,
        row_count: dataset.len(),
        column_count: Metric::ALL.len(),
        column_types,
        head,
        quantiles,
    }
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
    use crate::dataset::Dataset;

    /// Builds a dataset whose purchase column is the supplied values.
    fn dataset(purchases: &[f64]) -> Dataset {
        let rows = purchases
            .iter()
            .map(|&purchase| Observation {
                impression: purchase * 100.0,
                click: purchase / 10.0,
                purchase,
                earning: purchase * 3.0,
            })
            .collect();
        Dataset::new(Group::Control, rows)
    }

    #[test]
    fn quantile_median_of_odd_sample_is_middle_value() -> Result<(), String> {
        let values = [5.0, 1.0, 3.0];
        let median = quantile(&values, 0.5).ok_or("missing median")?;
        assert!((median - 3.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() -> Result<(), String> {
        // Sorted [1, 2, 3, 4]: the 0.5 quantile sits halfway between 2 and 3.
        let values = [4.0, 1.0, 3.0, 2.0];
        let median = quantile(&values, 0.5).ok_or("missing median")?;
        assert!((median - 2.5).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn quantile_endpoints_are_min_and_max() -> Result<(), String> {
        let values = [9.0, -2.0, 4.5];
        let low = quantile(&values, 0.0).ok_or("missing q0")?;
        let high = quantile(&values, 1.0).ok_or("missing q1")?;
        assert!((low - (-2.0)).abs() < 1e-12);
        assert!((high - 9.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn quantile_of_empty_slice_is_none() {
        assert!(quantile(&[], 0.5).is_none());
    }

    #[test]
    fn quantile_rejects_out_of_range_probability() {
        assert!(quantile(&[1.0, 2.0], 1.5).is_none());
    }

    #[test]
    fn summary_reports_shape_and_types() {
        let summary = summarize(&dataset(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 5);
        assert_eq!(summary.row_count, 6);
        assert_eq!(summary.column_count, 4);
        assert_eq!(summary.head.len(), 5);
        assert_eq!(summary.column_types[2], ("Purchase".to_string(), "f64".to_string()));
    }

    #[test]
    fn summary_head_is_bounded_by_row_count() {
        let summary = summarize(&dataset(&[1.0, 2.0]), 5);
        assert_eq!(summary.head.len(), 2);
        assert!((summary.head[0].purchase - 1.0).abs() < 1e-12);
    }

    #[test]
    fn summary_quantiles_cover_every_column() {
        let summary = summarize(&dataset(&[10.0, 20.0, 30.0]), 5);
        assert_eq!(summary.quantiles.len(), 4);
        let purchase = &summary.quantiles[2];
        assert_eq!(purchase.metric, Metric::Purchase);
        // q=0 and q=1 bracket the column.
        assert!((purchase.values[0] - 10.0).abs() < 1e-12);
        assert!((purchase.values[5] - 30.0).abs() < 1e-12);
    }
}
