// crates/ab-verdict-core/src/stats/ttest.rs
// ============================================================================
// Module: Two-Sample T-Tests
// Description: Pooled-variance Student and Welch mean-comparison tests.
// Purpose: Parametric mean comparison under both variance assumptions.
// Dependencies: crate::stats, statrs
// ============================================================================

//! ## Overview
//! Both kernels compare two sample means through a t statistic referred to
//! Student's t distribution. The pooled variant assumes equal variances and
//! uses `n1 + n2 - 2` degrees of freedom; the Welch variant drops that
//! assumption and uses the Welch-Satterthwaite approximation. The statistic
//! is signed first sample minus second sample.

// ============================================================================
// SECTION: Imports
// ============================================================================

use statrs::distribution::ContinuousCDF;
use statrs::distribution::StudentsT;

use crate::stats::StatError;
use crate::stats::TestOutcome;
use crate::stats::mean;
use crate::stats::sample_variance;

/// Smallest per-group sample a variance can be estimated from.
pub const MIN_SAMPLE: usize = 2;

// ============================================================================
// SECTION: Student T-Test
// ============================================================================

/// Runs the pooled-variance two-sample t-test.
///
/// # Errors
///
/// Returns [`StatError::InsufficientData`] when a group holds fewer than two
/// observations and [`StatError::DegenerateSample`] when both groups have
/// zero variance around distinct means.
pub fn student_t_test(first: &[f64], second: &[f64]) -> Result<TestOutcome, StatError> {
    check_sizes("Student t-test", first, second)?;

    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let freedom = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * sample_variance(first) + (n2 - 1.0) * sample_variance(second))
        / freedom;
    let standard_error = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();

    finish("Student t-test", mean(first) - mean(second), standard_error, freedom)
}

// ============================================================================
// SECTION: Welch T-Test
// ============================================================================

/// Runs the Welch two-sample t-test (unequal variances).
///
/// # Errors
///
/// Returns [`StatError::InsufficientData`] when a group holds fewer than two
/// observations and [`StatError::DegenerateSample`] when both groups have
/// zero variance around distinct means.
pub fn welch_t_test(first: &[f64], second: &[f64]) -> Result<TestOutcome, StatError> {
    check_sizes("Welch t-test", first, second)?;

    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let var_over_n1 = sample_variance(first) / n1;
    let var_over_n2 = sample_variance(second) / n2;
    let standard_error = (var_over_n1 + var_over_n2).sqrt();

    // Welch-Satterthwaite degrees of freedom.
    let denominator =
        var_over_n1.powi(2) / (n1 - 1.0) + var_over_n2.powi(2) / (n2 - 1.0);
    if denominator <= 0.0 {
        return degenerate_or_equal("Welch t-test", mean(first) - mean(second));
    }
    let freedom = (var_over_n1 + var_over_n2).powi(2) / denominator;

    finish("Welch t-test", mean(first) - mean(second), standard_error, freedom)
}

// ============================================================================
// SECTION: Shared Pieces
// ============================================================================

/// Validates the per-group minimum sample size.
fn check_sizes(test: &'static str, first: &[f64], second: &[f64]) -> Result<(), StatError> {
    for group in [first, second] {
        if group.len() < MIN_SAMPLE {
            return Err(StatError::InsufficientData {
                test,
                needed: MIN_SAMPLE,
                actual: group.len(),
            });
        }
    }
    Ok(())
}

/// Turns a mean difference and standard error into a two-sided outcome.
fn finish(
    test: &'static str,
    difference: f64,
    standard_error: f64,
    freedom: f64,
) -> Result<TestOutcome, StatError> {
    if standard_error <= 0.0 {
        return degenerate_or_equal(test, difference);
    }

    let statistic = difference / standard_error;
    let reference =
        StudentsT::new(0.0, 1.0, freedom).map_err(|err| StatError::Distribution {
            test,
            detail: err.to_string(),
        })?;
    let p_value = (2.0 * (1.0 - reference.cdf(statistic.abs()))).clamp(0.0, 1.0);

    Ok(TestOutcome {
        statistic,
        p_value,
    })
}

/// Resolves a zero standard error: equal means are a clean null outcome,
/// distinct means are undecidable.
fn degenerate_or_equal(test: &'static str, difference: f64) -> Result<TestOutcome, StatError> {
    if difference == 0.0 {
        return Ok(TestOutcome {
            statistic: 0.0,
            p_value: 1.0,
        });
    }
    Err(StatError::DegenerateSample {
        test,
        detail: "zero variance in both groups around distinct means".to_string(),
    })
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

    #[test]
    fn identical_groups_yield_zero_statistic_and_full_p() -> Result<(), String> {
        let group = [1.0, 2.0, 3.0, 4.0, 5.0];
        let outcome = student_t_test(&group, &group).map_err(|err| err.to_string())?;
        assert!(outcome.statistic.abs() < 1e-12);
        assert!((outcome.p_value - 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn separated_groups_yield_tiny_p() -> Result<(), String> {
        let low = [1.0, 2.0, 3.0, 2.5, 1.5];
        let high = [101.0, 102.0, 103.0, 102.5, 101.5];
        let outcome = student_t_test(&low, &high).map_err(|err| err.to_string())?;
        assert!(outcome.p_value < 1e-6, "p = {}", outcome.p_value);
        Ok(())
    }

    #[test]
    fn statistic_sign_is_first_minus_second() -> Result<(), String> {
        let low = [1.0, 2.0, 3.0];
        let high = [11.0, 12.0, 13.0];
        let outcome = student_t_test(&low, &high).map_err(|err| err.to_string())?;
        assert!(outcome.statistic < 0.0, "t = {}", outcome.statistic);
        let flipped = student_t_test(&high, &low).map_err(|err| err.to_string())?;
        assert!((outcome.statistic + flipped.statistic).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn pooled_statistic_matches_hand_computation() -> Result<(), String> {
        // Groups [1,2,3] and [2,3,4]: means 2 and 3, each variance 1,
        // pooled variance 1, se = sqrt(2/3), t = -1/sqrt(2/3).
        let outcome =
            student_t_test(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).map_err(|err| err.to_string())?;
        let expected = -1.0 / (2.0_f64 / 3.0).sqrt();
        assert!((outcome.statistic - expected).abs() < 1e-12, "t = {}", outcome.statistic);
        Ok(())
    }

    #[test]
    fn welch_handles_unequal_variances() -> Result<(), String> {
        let tight = [10.0, 10.1, 9.9, 10.05, 9.95, 10.02];
        let wide = [5.0, 25.0, 10.0, 30.0, 2.0, 20.0];
        let outcome = welch_t_test(&tight, &wide).map_err(|err| err.to_string())?;
        assert!(outcome.p_value > 0.05, "p = {}", outcome.p_value);
        assert!(outcome.statistic.is_finite());
        Ok(())
    }

    #[test]
    fn welch_small_sample_is_conservative() -> Result<(), String> {
        // Strong apparent separation but only two points per arm: with df
        // near 2 the t reference must not call this significant.
        let outcome = welch_t_test(&[0.0, 1.0], &[2.0, 3.0]).map_err(|err| err.to_string())?;
        assert!(outcome.p_value > 0.05, "p = {}", outcome.p_value);
        Ok(())
    }

    #[test]
    fn single_observation_group_is_rejected() {
        let result = welch_t_test(&[1.0], &[2.0, 3.0]);
        assert!(matches!(result, Err(StatError::InsufficientData { .. })));
    }

    #[test]
    fn zero_variance_distinct_means_are_degenerate() {
        let result = student_t_test(&[5.0, 5.0, 5.0], &[9.0, 9.0, 9.0]);
        assert!(matches!(result, Err(StatError::DegenerateSample { .. })));
    }

    #[test]
    fn zero_variance_equal_means_are_a_clean_null() -> Result<(), String> {
        let outcome =
            student_t_test(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]).map_err(|err| err.to_string())?;
        assert!(outcome.statistic.abs() < 1e-12);
        assert!((outcome.p_value - 1.0).abs() < 1e-12);
        Ok(())
    }
}
