// crates/ab-verdict-core/src/stats/mann_whitney.rs
// ============================================================================
// Module: Mann-Whitney U Test
// Description: Non-parametric two-sample comparison on pooled ranks.
// Purpose: Mean comparison fallback when the normality assumption fails.
// Dependencies: crate::stats, statrs
// ============================================================================

//! ## Overview
//! The U statistic counts, through pooled ranks, how often values of the
//! first sample precede values of the second. The two-sided p-value uses the
//! normal approximation with tie-corrected variance and a 0.5 continuity
//! correction, which is the conventional choice for samples beyond the exact
//! enumeration range.

// ============================================================================
// SECTION: Imports
// ============================================================================

use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::stats::StatError;
use crate::stats::TestOutcome;
use crate::stats::average_ranks;

/// Kernel name used in error values.
const TEST_NAME: &str = "Mann-Whitney U";

/// Smallest per-group sample the rank approximation is meaningful for.
pub const MIN_SAMPLE: usize = 2;

// ============================================================================
// SECTION: Mann-Whitney U
// ============================================================================

/// Runs the two-sided Mann-Whitney U test.
///
/// The statistic is the U value of the first sample.
///
/// # Errors
///
/// Returns [`StatError::InsufficientData`] when a group holds fewer than two
/// observations and [`StatError::DegenerateSample`] when every pooled value
/// is tied.
pub fn mann_whitney_u(first: &[f64], second: &[f64]) -> Result<TestOutcome, StatError> {
    for group in [first, second] {
        if group.len() < MIN_SAMPLE {
            return Err(StatError::InsufficientData {
                test: TEST_NAME,
                needed: MIN_SAMPLE,
                actual: group.len(),
            });
        }
    }

    let pooled: Vec<f64> = first.iter().chain(second.iter()).copied().collect();
    let ranks = average_ranks(&pooled);
    let rank_sum_first: f64 = ranks[..first.len()].iter().sum();

    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let total = n1 + n2;

    let u_first = rank_sum_first - n1 * (n1 + 1.0) / 2.0;
    let mean_u = n1 * n2 / 2.0;

    // Tie-corrected variance of U under the null.
    let tie_term: f64 = tie_sizes(&pooled)
        .iter()
        .map(|&size| {
            #[allow(
                clippy::cast_precision_loss,
                reason = "tie group sizes are far below f64 precision limits"
            )]
            let t = size as f64;
            t.powi(3) - t
        })
        .sum();
    let variance =
        n1 * n2 / 12.0 * ((total + 1.0) - tie_term / (total * (total - 1.0)));
    if variance <= 0.0 {
        return Err(StatError::DegenerateSample {
            test: TEST_NAME,
            detail: "all pooled observations are tied".to_string(),
        });
    }

    // Continuity-corrected z; the correction never flips the sign.
    let shift = (u_first - mean_u).abs() - 0.5;
    let z = shift.max(0.0) / variance.sqrt();

    let normal = Normal::new(0.0, 1.0).map_err(|err| StatError::Distribution {
        test: TEST_NAME,
        detail: err.to_string(),
    })?;
    let p_value = (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0);

    Ok(TestOutcome {
        statistic: u_first,
        p_value,
    })
}

/// Sizes of tie groups in the pooled sample, tied singletons included.
fn tie_sizes(pooled: &[f64]) -> Vec<usize> {
    let mut sorted = pooled.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut sizes = Vec::new();
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].total_cmp(&sorted[start]).is_eq() {
            end += 1;
        }
        sizes.push(end - start + 1);
        start = end + 1;
    }
    sizes
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
    fn rejects_single_observation_group() {
        let result = mann_whitney_u(&[1.0], &[2.0, 3.0]);
        assert!(matches!(result, Err(StatError::InsufficientData { .. })));
    }

    #[test]
    fn fully_tied_pool_is_degenerate() {
        let result = mann_whitney_u(&[7.0, 7.0, 7.0], &[7.0, 7.0]);
        assert!(matches!(result, Err(StatError::DegenerateSample { .. })));
    }

    #[test]
    fn fully_separated_groups_yield_small_p() -> Result<(), String> {
        let low: Vec<f64> = (1..=12).map(f64::from).collect();
        let high: Vec<f64> = (101..=112).map(f64::from).collect();
        let outcome = mann_whitney_u(&low, &high).map_err(|err| err.to_string())?;
        // Every low value precedes every high value: U = 0.
        assert!(outcome.statistic.abs() < 1e-12, "U = {}", outcome.statistic);
        assert!(outcome.p_value < 0.001, "p = {}", outcome.p_value);
        Ok(())
    }

    #[test]
    fn interleaved_groups_yield_large_p() -> Result<(), String> {
        let first = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0];
        let second = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let outcome = mann_whitney_u(&first, &second).map_err(|err| err.to_string())?;
        assert!(outcome.p_value > 0.5, "p = {}", outcome.p_value);
        Ok(())
    }

    #[test]
    fn u_statistics_of_both_orientations_sum_to_n1_n2() -> Result<(), String> {
        let first = [3.0, 9.0, 1.0, 7.0];
        let second = [4.0, 2.0, 8.0, 6.0, 5.0];
        let forward = mann_whitney_u(&first, &second).map_err(|err| err.to_string())?;
        let backward = mann_whitney_u(&second, &first).map_err(|err| err.to_string())?;
        assert!((forward.statistic + backward.statistic - 20.0).abs() < 1e-12);
        assert!((forward.p_value - backward.p_value).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn ties_reduce_variance_but_keep_p_in_range() -> Result<(), String> {
        let first = [1.0, 2.0, 2.0, 3.0, 4.0];
        let second = [2.0, 3.0, 3.0, 4.0, 5.0];
        let outcome = mann_whitney_u(&first, &second).map_err(|err| err.to_string())?;
        assert!((0.0..=1.0).contains(&outcome.p_value));
        Ok(())
    }
}
