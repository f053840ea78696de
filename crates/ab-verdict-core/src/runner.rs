// crates/ab-verdict-core/src/runner.rs
// ============================================================================
// Module: AB Verdict Hypothesis Test Runner
// Description: Three-stage decision procedure with explicit branch selection.
// Purpose: Decide whether the metric mean differs between experiment arms.
// Dependencies: crate::config, crate::dataset, crate::stats
// ============================================================================

//! ## Overview
//! The runner executes the fixed three-stage procedure: per-arm normality
//! (Shapiro-Wilk), joint variance homogeneity (Levene), and a mean
//! comparison whose kernel is selected from the first two stages' outcomes.
//! Branch selection is an explicit [`TestChoice`] value so the chosen test
//! and its justification stay inspectable. All three stages' statistics are
//! retained in the report; the variance stage is computed even when
//! normality already failed, because every stage is part of the output
//! contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::dataset::CombinedDataset;
use crate::dataset::Group;
use crate::dataset::Metric;
use crate::stats::StatError;
use crate::stats::TestOutcome;
use crate::stats::levene::levene;
use crate::stats::mann_whitney::mann_whitney_u;
use crate::stats::shapiro::shapiro_wilk;
use crate::stats::ttest::student_t_test;
use crate::stats::ttest::welch_t_test;

// ============================================================================
// SECTION: Branch Selection
// ============================================================================

/// Mean-comparison kernel selected from the assumption stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestChoice {
    /// Pooled-variance Student t-test: both arms normal, variances
    /// homogeneous.
    StudentT,
    /// Welch t-test: both arms normal, variances not homogeneous.
    WelchT,
    /// Mann-Whitney U: normality rejected for at least one arm.
    MannWhitneyU,
}

impl TestChoice {
    /// Selects the mean-comparison kernel from the two assumption outcomes.
    ///
    /// Selection is a pure function of the booleans: normality for both
    /// arms gates the parametric tests, homogeneity picks between them, and
    /// a normality failure forces the non-parametric fallback regardless of
    /// the variance outcome.
    #[must_use]
    pub const fn select(both_normal: bool, homogeneous: bool) -> Self {
        match (both_normal, homogeneous) {
            (true, true) => Self::StudentT,
            (true, false) => Self::WelchT,
            (false, _) => Self::MannWhitneyU,
        }
    }

    /// Returns the display name of the selected test.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StudentT => "Student's t-test (equal variances)",
            Self::WelchT => "Welch's t-test (unequal variances)",
            Self::MannWhitneyU => "Mann-Whitney U test",
        }
    }

    /// Explains why this branch was taken.
    #[must_use]
    pub const fn justification(self) -> &'static str {
        match self {
            Self::StudentT => {
                "normality held for both groups and variances are homogeneous"
            }
            Self::WelchT => {
                "normality held for both groups but variances are not homogeneous"
            }
            Self::MannWhitneyU => "normality was rejected for at least one group",
        }
    }
}

// ============================================================================
// SECTION: Stage Records
// ============================================================================

/// Normality stage outcome for one arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityResult {
    /// Arm the test ran on.
    pub group: Group,
    /// Shapiro-Wilk statistic and p-value.
    pub outcome: TestOutcome,
    /// Whether the normality assumption is accepted at the run's alpha.
    pub normal: bool,
}

/// Variance-homogeneity stage outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// Levene statistic and p-value.
    pub outcome: TestOutcome,
    /// Whether the equal-variance assumption is accepted at the run's alpha.
    pub homogeneous: bool,
}

/// Final decision on the null hypothesis of equal means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The null hypothesis is rejected at the run's alpha.
    SignificantDifference,
    /// The null hypothesis cannot be rejected at the run's alpha.
    NoSignificantDifference,
}

impl Verdict {
    /// Derives the verdict from a p-value at a significance level.
    #[must_use]
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value <= alpha {
            Self::SignificantDifference
        } else {
            Self::NoSignificantDifference
        }
    }

    /// Returns the natural-language verdict line.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::SignificantDifference => {
                "significant difference between the group means"
            }
            Self::NoSignificantDifference => {
                "no significant difference between the group means"
            }
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Full record of one hypothesis-test run.
///
/// # Invariants
/// - All three stages' statistics are present; intermediate results are part
///   of the contract, not implementation detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestReport {
    /// Metric column the run compared.
    pub metric: Metric,
    /// Significance level applied at every stage.
    pub alpha: f64,
    /// Control arm mean of the metric.
    pub control_mean: f64,
    /// Test arm mean of the metric.
    pub test_mean: f64,
    /// Normality outcomes, control then test.
    pub normality: [NormalityResult; 2],
    /// Variance-homogeneity outcome.
    pub variance: VarianceResult,
    /// Selected mean-comparison branch.
    pub choice: TestChoice,
    /// Mean-comparison statistic and p-value.
    pub comparison: TestOutcome,
    /// Final decision on the null hypothesis.
    pub verdict: Verdict,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs the full three-stage procedure on one metric of the combined
/// dataset.
///
/// # Errors
///
/// Returns [`StatError`] when a stage rejects its input; a normality-stage
/// failure aborts before the mean-comparison stage runs.
pub fn run_ab_test(
    combined: &CombinedDataset,
    metric: Metric,
    config: &AnalysisConfig,
) -> Result<AbTestReport, StatError> {
    let control = combined.group_column(Group::Control, metric);
    let test = combined.group_column(Group::Test, metric);
    let alpha = config.alpha;

    // Stage 1: per-arm normality.
    let control_normality = shapiro_wilk(&control)?;
    let test_normality = shapiro_wilk(&test)?;
    let normality = [
        NormalityResult {
            group: Group::Control,
            outcome: control_normality,
            normal: control_normality.p_value > alpha,
        },
        NormalityResult {
            group: Group::Test,
            outcome: test_normality,
            normal: test_normality.p_value > alpha,
        },
    ];

    // Stage 2: always computed, even when stage 1 already failed.
    let variance_outcome = levene(&control, &test)?;
    let variance = VarianceResult {
        outcome: variance_outcome,
        homogeneous: variance_outcome.p_value > alpha,
    };

    // Stage 3: branch on the assumption outcomes.
    let both_normal = normality[0].normal && normality[1].normal;
    let choice = TestChoice::select(both_normal, variance.homogeneous);
    let comparison = match choice {
        TestChoice::StudentT => student_t_test(&control, &test)?,
        TestChoice::WelchT => welch_t_test(&control, &test)?,
        TestChoice::MannWhitneyU => mann_whitney_u(&control, &test)?,
    };

    Ok(AbTestReport {
        metric,
        alpha,
        control_mean: column_mean(&control),
        test_mean: column_mean(&test),
        normality,
        variance,
        choice,
        comparison,
        verdict: Verdict::from_p_value(comparison.p_value, alpha),
    })
}

/// Mean of a column already validated as non-empty by the merger.
fn column_mean(column: &[f64]) -> f64 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "row counts are far below f64 precision limits"
    )]
    let len = column.len() as f64;
    column.iter().sum::<f64>() / len
}

// ============================================================================
// SECTION: Tests
// ============================================================================
