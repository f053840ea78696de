// crates/ab-verdict-core/src/stats/mod.rs
// ============================================================================
// Module: AB Verdict Statistical Kernels
// Description: Shared moments, ranking, and errors for the test kernels.
// Purpose: Back every pipeline stage with deterministic numeric kernels.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each kernel maps one or two samples to a `(statistic, p_value)` outcome
//! using double-precision arithmetic throughout. Kernels are pure and
//! deterministic: identical input yields bit-identical output. Degenerate
//! inputs (too few observations, zero spread) surface as errors instead of
//! NaN propagation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod levene;
pub mod mann_whitney;
pub mod shapiro;
pub mod ttest;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Kernel Errors
// ============================================================================

/// Errors returned by the statistical kernels.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatError {
    /// A sample is too small for the requested test.
    #[error("insufficient data for {test}: needs at least {needed} observations, got {actual}")]
    InsufficientData {
        /// Test that rejected the sample.
        test: &'static str,
        /// Minimum observations the test requires.
        needed: usize,
        /// Observations actually supplied.
        actual: usize,
    },
    /// A sample has no usable spread for the requested test.
    #[error("degenerate sample for {test}: {detail}")]
    DegenerateSample {
        /// Test that rejected the sample.
        test: &'static str,
        /// What made the sample unusable.
        detail: String,
    },
    /// A reference distribution could not be constructed.
    #[error("distribution setup failed for {test}: {detail}")]
    Distribution {
        /// Test whose reference distribution failed.
        test: &'static str,
        /// Underlying construction error.
        detail: String,
    },
}

// ============================================================================
// SECTION: Test Outcome
// ============================================================================

/// Statistic and p-value pair produced by one kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test statistic.
    pub statistic: f64,
    /// Two-sided p-value in `[0, 1]`.
    pub p_value: f64,
}

// ============================================================================
// SECTION: Shared Moments
// ============================================================================

/// Arithmetic mean of a non-empty slice.
#[must_use]
pub(crate) fn mean(values: &[f64]) -> f64 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

/// Unbiased sample variance of a slice with at least two values.
#[must_use]
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    let center = mean(values);
    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let divisor = (values.len() - 1) as f64;
    values.iter().map(|value| (value - center).powi(2)).sum::<f64>() / divisor
}

/// Median of a non-empty slice.
#[must_use]
pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Assigns average ranks (1-based) to `values`, sharing ranks across ties.
#[must_use]
pub(crate) fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&left, &right| values[left].total_cmp(&values[right]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len()
            && values[order[end + 1]].total_cmp(&values[order[start]]).is_eq()
        {
            end += 1;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "sample sizes are far below f64 precision limits"
        )]
        let shared = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            ranks[index] = shared;
        }
        start = end + 1;
    }
    ranks
}

// ============================================================================
// SECTION: Tests
// ============================================================================
