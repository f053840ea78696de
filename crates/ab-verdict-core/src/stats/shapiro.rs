// crates/ab-verdict-core/src/stats/shapiro.rs
// ============================================================================
// Module: Shapiro-Wilk Normality Test
// Description: Royston's AS R94 approximation of the W statistic and p-value.
// Purpose: Decide the normality assumption per experiment arm.
// Dependencies: crate::stats, statrs
// ============================================================================

//! ## Overview
//! The W statistic compares the best linear unbiased estimate of the sample
//! spread (from expected normal order statistics) against the ordinary sum
//! of squares. Weights follow Royston's polynomial corrections to the Blom
//! scores; the p-value uses Royston's three-regime normalization (exact for
//! n = 3, log-transformed for 4..=11, log-log for larger samples). Valid for
//! samples of 3 through 5000 observations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::stats::StatError;
use crate::stats::TestOutcome;
use crate::stats::mean;

/// Kernel name used in error values.
const TEST_NAME: &str = "Shapiro-Wilk";

/// Smallest sample the W statistic is defined for.
pub const MIN_SAMPLE: usize = 3;

// ============================================================================
// SECTION: Royston Polynomials
// ============================================================================

/// Royston's correction polynomial for the largest-order weight.
fn poly_c1(u: f64) -> f64 {
    u * (0.221_157
        + u * (-0.147_981 + u * (-2.071_190 + u * (4.434_685 + u * -2.706_056))))
}

/// Royston's correction polynomial for the second-largest-order weight.
fn poly_c2(u: f64) -> f64 {
    u * (0.042_981
        + u * (-0.293_762 + u * (-1.752_461 + u * (5.682_633 + u * -3.582_633))))
}

// ============================================================================
// SECTION: W Statistic
// ============================================================================

/// Runs the Shapiro-Wilk test on one sample.
///
/// # Errors
///
/// Returns [`StatError::InsufficientData`] for fewer than three
/// observations and [`StatError::DegenerateSample`] when the sample has no
/// spread.
pub fn shapiro_wilk(sample: &[f64]) -> Result<TestOutcome, StatError> {
    let n = sample.len();
    if n < MIN_SAMPLE {
        return Err(StatError::InsufficientData {
            test: TEST_NAME,
            needed: MIN_SAMPLE,
            actual: n,
        });
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);

    let center = mean(&sorted);
    let sse: f64 = sorted.iter().map(|value| (value - center).powi(2)).sum();
    if sse <= 0.0 {
        return Err(StatError::DegenerateSample {
            test: TEST_NAME,
            detail: "all observations are identical".to_string(),
        });
    }

    let weights = upper_weights(n)?;
    let mut b = 0.0;
    for (j, weight) in weights.iter().enumerate() {
        b += weight * (sorted[n - 1 - j] - sorted[j]);
    }

    let w = (b * b / sse).min(1.0);
    let p_value = p_value_for(w, n)?;

    Ok(TestOutcome {
        statistic: w,
        p_value,
    })
}

/// Computes the positive upper-half weights, largest order statistic first.
fn upper_weights(n: usize) -> Result<Vec<f64>, StatError> {
    let normal = standard_normal()?;
    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let n_f = n as f64;

    // Blom scores: expected normal order statistics.
    let scores: Vec<f64> = (0..n)
        .map(|i| {
            #[allow(
                clippy::cast_precision_loss,
                reason = "sample sizes are far below f64 precision limits"
            )]
            let rank = (i + 1) as f64;
            normal.inverse_cdf((rank - 0.375) / (n_f + 0.25))
        })
        .collect();
    let ssumm2: f64 = scores.iter().map(|score| score * score).sum();

    let half = n / 2;
    let mut weights = vec![0.0; half];
    if n == 3 {
        weights[0] = std::f64::consts::FRAC_1_SQRT_2;
        return Ok(weights);
    }

    let rsn = 1.0 / n_f.sqrt();
    let a_n = poly_c1(rsn) + scores[n - 1] / ssumm2.sqrt();

    if n > 5 {
        let a_n1 = poly_c2(rsn) + scores[n - 2] / ssumm2.sqrt();
        let phi = (2.0_f64.mul_add(-scores[n - 2].powi(2), 2.0_f64.mul_add(-scores[n - 1].powi(2), ssumm2)))
            / (2.0_f64.mul_add(-a_n1.powi(2), 2.0_f64.mul_add(-a_n.powi(2), 1.0)));
        let phi_root = phi.sqrt();
        weights[0] = a_n;
        weights[1] = a_n1;
        for (j, weight) in weights.iter_mut().enumerate().skip(2) {
            *weight = scores[n - 1 - j] / phi_root;
        }
    } else {
        let phi = (2.0_f64.mul_add(-scores[n - 1].powi(2), ssumm2))
            / (2.0_f64.mul_add(-a_n.powi(2), 1.0));
        let phi_root = phi.sqrt();
        weights[0] = a_n;
        for (j, weight) in weights.iter_mut().enumerate().skip(1) {
            *weight = scores[n - 1 - j] / phi_root;
        }
    }

    Ok(weights)
}

// ============================================================================
// SECTION: P-Value
// ============================================================================

/// Maps the W statistic to an upper-tail p-value using Royston's regimes.
fn p_value_for(w: f64, n: usize) -> Result<f64, StatError> {
    // Guard the log transforms against W rounding to exactly 1.
    let complement = (1.0 - w).max(f64::EPSILON);

    if n == 3 {
        let p = 6.0 * std::f64::consts::FRAC_1_PI
            * (w.sqrt().asin() - 0.75_f64.sqrt().asin());
        return Ok(p.clamp(0.0, 1.0));
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "sample sizes are far below f64 precision limits"
    )]
    let n_f = n as f64;
    let normal = standard_normal()?;

    let z = if n <= 11 {
        let gamma = 0.459_f64.mul_add(n_f, -2.273);
        let shifted = gamma - complement.ln();
        if shifted <= 0.0 {
            // W is so small that the transform leaves no upper tail.
            return Ok(0.0);
        }
        let y = -shifted.ln();
        let mu = 0.544_0
            + n_f * (-0.399_78 + n_f * (0.025_054 + n_f * -0.000_671_4));
        let sigma = (1.382_2
            + n_f * (-0.778_57 + n_f * (0.062_767 + n_f * -0.002_032_2)))
            .exp();
        (y - mu) / sigma
    } else {
        let u = n_f.ln();
        let y = complement.ln();
        let mu = -1.586_1 + u * (-0.310_82 + u * (-0.083_751 + u * 0.003_891_5));
        let sigma = (-0.480_3 + u * (-0.082_676 + u * 0.003_030_2)).exp();
        (y - mu) / sigma
    };

    Ok((1.0 - normal.cdf(z)).clamp(0.0, 1.0))
}

/// Builds the standard normal reference distribution.
fn standard_normal() -> Result<Normal, StatError> {
    Normal::new(0.0, 1.0).map_err(|err| StatError::Distribution {
        test: TEST_NAME,
        detail: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
