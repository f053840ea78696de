// crates/ab-verdict-core/src/dataset.rs
// ============================================================================
// Module: AB Verdict Data Model
// Description: Observations, group labels, datasets, and the group merger.
// Purpose: Provide the immutable tabular model consumed by every stage.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The data model mirrors the source workbook: four numeric measurements per
//! observation, one dataset per experiment arm, and a combined dataset that
//! tags every row with its originating group. The combined dataset is
//! read-only after construction; downstream stages never mutate rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Observation
// ============================================================================

/// One row of the source workbook.
///
/// # Invariants
/// - All four measurements are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Ad views.
    pub impression: f64,
    /// Clicks on the displayed ad.
    pub click: f64,
    /// Products purchased after the ad was clicked.
    pub purchase: f64,
    /// Revenue earned from purchased products.
    pub earning: f64,
}

impl Observation {
    /// Returns the value of the requested metric column.
    #[must_use]
    pub const fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Impression => self.impression,
            Metric::Click => self.click,
            Metric::Purchase => self.purchase,
            Metric::Earning => self.earning,
        }
    }
}

// ============================================================================
// SECTION: Group Label
// ============================================================================

/// Experiment arm label.
///
/// # Invariants
/// - Serialized forms are the single-letter sheet tags `"C"` and `"T"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// Control arm (maximum bidding).
    #[serde(rename = "C")]
    Control,
    /// Test arm (average bidding).
    #[serde(rename = "T")]
    Test,
}

impl Group {
    /// Returns the single-letter tag used in reports and serialized rows.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Control => "C",
            Self::Test => "T",
        }
    }

    /// Returns the human-readable sheet label for the group.
    #[must_use]
    pub const fn sheet_label(self) -> &'static str {
        match self {
            Self::Control => "Control Group",
            Self::Test => "Test Group",
        }
    }
}

// ============================================================================
// SECTION: Metric Column
// ============================================================================

/// Numeric column of the workbook schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// The `Impression` column.
    Impression,
    /// The `Click` column.
    Click,
    /// The `Purchase` column.
    Purchase,
    /// The `Earning` column.
    Earning,
}

impl Metric {
    /// All columns in workbook header order.
    pub const ALL: [Self; 4] = [Self::Impression, Self::Click, Self::Purchase, Self::Earning];

    /// Returns the workbook header name for the column.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Impression => "Impression",
            Self::Click => "Click",
            Self::Purchase => "Purchase",
            Self::Earning => "Earning",
        }
    }
}

// ============================================================================
// SECTION: Dataset
// ============================================================================

/// Ordered observations for one experiment arm.
///
/// # Invariants
/// - Row order matches the source sheet and is never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Arm label for every row in this dataset.
    pub group: Group,
    /// Observations in source order.
    pub rows: Vec<Observation>,
}

impl Dataset {
    /// Creates a dataset from rows already in source order.
    #[must_use]
    pub const fn new(group: Group, rows: Vec<Observation>) -> Self {
        Self {
            group,
            rows,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the dataset holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extracts one metric column in row order.
    #[must_use]
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.rows.iter().map(|row| row.metric(metric)).collect()
    }
}

// ============================================================================
// SECTION: Merge Errors
// ============================================================================

/// Errors returned by the group merger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    /// A dataset was supplied in the wrong merge slot.
    #[error("dataset labeled '{found}' supplied in the {slot} slot")]
    GroupMismatch {
        /// Slot name, `control` or `test`.
        slot: &'static str,
        /// Tag of the dataset actually supplied.
        found: &'static str,
    },
    /// A dataset holds no rows and cannot be merged.
    #[error("{slot} dataset is empty")]
    EmptyDataset {
        /// Slot name, `control` or `test`.
        slot: &'static str,
    },
}

// ============================================================================
// SECTION: Combined Dataset
// ============================================================================

/// One tagged row of the combined dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedRow {
    /// Originating arm of the row.
    pub group: Group,
    /// The observation itself.
    pub observation: Observation,
}

/// Concatenation of the control and test datasets, control rows first.
///
/// # Invariants
/// - Row order preserves each source dataset's internal order.
/// - Read-only after construction; there is no mutating API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedDataset {
    /// Tagged rows, control block followed by test block.
    rows: Vec<TaggedRow>,
    /// Number of control rows at the front of `rows`.
    control_len: usize,
}

impl CombinedDataset {
    /// Merges the control and test datasets into one tagged dataset.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError`] when a dataset is empty or its label does not
    /// match the slot it was supplied in.
    pub fn merge(control: &Dataset, test: &Dataset) -> Result<Self, MergeError> {
        if control.group != Group::Control {
            return Err(MergeError::GroupMismatch {
                slot: "control",
                found: control.group.tag(),
            });
        }
        if test.group != Group::Test {
            return Err(MergeError::GroupMismatch {
                slot: "test",
                found: test.group.tag(),
            });
        }
        if control.is_empty() {
            return Err(MergeError::EmptyDataset {
                slot: "control",
            });
        }
        if test.is_empty() {
            return Err(MergeError::EmptyDataset {
                slot: "test",
            });
        }

        let mut rows = Vec::with_capacity(control.len() + test.len());
        rows.extend(control.rows.iter().map(|&observation| TaggedRow {
            group: Group::Control,
            observation,
        }));
        rows.extend(test.rows.iter().map(|&observation| TaggedRow {
            group: Group::Test,
            observation,
        }));

        Ok(Self {
            rows,
            control_len: control.len(),
        })
    }

    /// Returns the tagged rows, control block first.
    #[must_use]
    pub fn rows(&self) -> &[TaggedRow] {
        &self.rows
    }

    /// Returns the total number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the combined dataset holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows in the requested arm.
    #[must_use]
    pub fn group_len(&self, group: Group) -> usize {
        match group {
            Group::Control => self.control_len,
            Group::Test => self.rows.len() - self.control_len,
        }
    }

    /// Extracts one metric column for one arm, preserving row order.
    #[must_use]
    pub fn group_column(&self, group: Group, metric: Metric) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|row| row.group == group)
            .map(|row| row.observation.metric(metric))
            .collect()
    }

    /// Returns the arithmetic mean of one metric column for one arm.
    ///
    /// Yields `None` when the arm has no rows.
    #[must_use]
    pub fn group_mean(&self, group: Group, metric: Metric) -> Option<f64> {
        let column = self.group_column(group, metric);
        if column.is_empty() {
            return None;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "row counts are far below f64 precision limits"
        )]
        let len = column.len() as f64;
        Some(column.iter().sum::<f64>() / len)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
