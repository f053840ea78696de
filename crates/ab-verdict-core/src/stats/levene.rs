// crates/ab-verdict-core/src/stats/levene.rs
// ============================================================================
// Module: Levene Variance-Homogeneity Test
// Description: Two-sample Levene test with median centering (Brown-Forsythe).
// Purpose: Decide the equal-variance assumption across experiment arms.
// Dependencies: crate::stats, statrs
// ============================================================================

//! ## Overview
//! The test compares absolute deviations from each group's median through a
//! one-way analysis of variance, referred to an F distribution with
//! `(k - 1, N - k)` degrees of freedom. Median centering is the robust
//! default the original analysis used.

// ============================================================================
// SECTION: Imports
// ============================================================================

use statrs::distribution::ContinuousCDF;
use statrs::distribution::FisherSnedecor;

use crate::stats::StatError;
use crate::stats::TestOutcome;
use crate::stats::mean;
use crate::stats::median;

/// Kernel name used in error values.
const TEST_NAME: &str = "Levene";

/// Smallest per-group sample the deviations are meaningful for.
pub const MIN_SAMPLE: usize = 2;

// ============================================================================
// SECTION: Levene Test
// ============================================================================

/// Runs the two-sample Levene test with median centering.
///
/// # Errors
///
/// Returns [`StatError::InsufficientData`] when a group holds fewer than two
/// observations and [`StatError::DegenerateSample`] when the absolute
/// deviations carry no within-group spread.
pub fn levene(first: &[f64], second: &[f64]) -> Result<TestOutcome, StatError> {
    for group in [first, second] {
        if group.len() < MIN_SAMPLE {
            return Err(StatError::InsufficientData {
                test: TEST_NAME,
                needed: MIN_SAMPLE,
                actual: group.len(),
            });
        }
    }

    let deviations_first = absolute_deviations(first);
    let deviations_second = absolute_deviations(second);

    let mean_first = mean(&deviations_first);
    let mean_second = mean(&deviations_second);
    let grand: Vec<f64> = deviations_first
        .iter()
        .chain(deviations_second.iter())
        .copied()
        .collect();
    let grand_mean = mean(&grand);

    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let total = n1 + n2;

    let between = n1 * (mean_first - grand_mean).powi(2)
        + n2 * (mean_second - grand_mean).powi(2);
    let within: f64 = deviations_first
        .iter()
        .map(|z| (z - mean_first).powi(2))
        .chain(deviations_second.iter().map(|z| (z - mean_second).powi(2)))
        .sum();

    if within <= 0.0 {
        if between <= 0.0 {
            // Deviations are identical in and across groups.
            return Ok(TestOutcome {
                statistic: 0.0,
                p_value: 1.0,
            });
        }
        return Err(StatError::DegenerateSample {
            test: TEST_NAME,
            detail: "absolute deviations have no within-group spread".to_string(),
        });
    }

    // Two groups: numerator df = 1, denominator df = N - 2.
    let statistic = (total - 2.0) * between / within;
    let reference = FisherSnedecor::new(1.0, total - 2.0).map_err(|err| {
        StatError::Distribution {
            test: TEST_NAME,
            detail: err.to_string(),
        }
    })?;
    let p_value = (1.0 - reference.cdf(statistic)).clamp(0.0, 1.0);

    Ok(TestOutcome {
        statistic,
        p_value,
    })
}

/// Absolute deviations of a group from its own median.
fn absolute_deviations(group: &[f64]) -> Vec<f64> {
    let center = median(group);
    group.iter().map(|value| (value - center).abs()).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
