// crates/ab-verdict-core/src/loader.rs
// ============================================================================
// Module: AB Verdict Workbook Loader
// Description: CSV sheet loading with schema and value validation.
// Purpose: Produce validated datasets from untrusted workbook files.
// Dependencies: crate::dataset, csv, thiserror
// ============================================================================

//! ## Overview
//! The loader reads one CSV sheet per experiment arm. A workbook directory
//! holds the two sheets under fixed file names derived from the original
//! sheet labels (`Control Group` -> `control_group.csv`). Input is untrusted:
//! the header must match the fixed four-column schema exactly, and every
//! cell must parse as a finite, non-negative number. Any violation aborts
//! the load with the offending path, sheet, and row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::Dataset;
use crate::dataset::Group;
use crate::dataset::Metric;
use crate::dataset::Observation;

// ============================================================================
// SECTION: Sheet Naming
// ============================================================================

/// File name of the control sheet inside a workbook directory.
pub const CONTROL_SHEET_FILE: &str = "control_group.csv";

/// File name of the test sheet inside a workbook directory.
pub const TEST_SHEET_FILE: &str = "test_group.csv";

/// Returns the sheet file name for an experiment arm.
#[must_use]
pub const fn sheet_file_name(group: Group) -> &'static str {
    match group {
        Group::Control => CONTROL_SHEET_FILE,
        Group::Test => TEST_SHEET_FILE,
    }
}

// ============================================================================
// SECTION: Load Errors
// ============================================================================

/// Errors returned by the workbook loader.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The sheet file could not be opened or read.
    #[error("sheet '{sheet}' unreadable at {path}: {source}")]
    SheetUnreadable {
        /// Human-readable sheet label.
        sheet: String,
        /// Path of the sheet file.
        path: PathBuf,
        /// Underlying CSV or I/O error.
        source: csv::Error,
    },
    /// The sheet header does not match the expected schema.
    #[error("sheet '{sheet}' at {path} has header {found:?}, expected {expected:?}")]
    SchemaMismatch {
        /// Human-readable sheet label.
        sheet: String,
        /// Path of the sheet file.
        path: PathBuf,
        /// Header columns actually present.
        found: Vec<String>,
        /// Header columns required by the schema.
        expected: Vec<String>,
    },
    /// A record does not hold exactly one value per schema column.
    #[error("sheet '{sheet}' at {path}, row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        /// Human-readable sheet label.
        sheet: String,
        /// Path of the sheet file.
        path: PathBuf,
        /// 1-based data row number.
        row: usize,
        /// Expected field count.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },
    /// A numeric cell failed to parse or is out of range.
    #[error(
        "sheet '{sheet}' at {path}, row {row}, column '{column}': \
         value '{value}' is not a finite non-negative number"
    )]
    InvalidValue {
        /// Human-readable sheet label.
        sheet: String,
        /// Path of the sheet file.
        path: PathBuf,
        /// 1-based data row number.
        row: usize,
        /// Column name of the offending cell.
        column: &'static str,
        /// Raw cell text.
        value: String,
    },
}

// ============================================================================
// SECTION: Sheet Loading
// ============================================================================

/// Loads one experiment arm from a CSV sheet file.
///
/// # Errors
///
/// Returns [`LoadError`] when the file is unreadable, the header deviates
/// from the fixed schema, or any cell is not a finite non-negative number.
pub fn load_sheet(path: &Path, group: Group) -> Result<Dataset, LoadError> {
    let sheet = group.sheet_label().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::SheetUnreadable {
            sheet: sheet.clone(),
            path: path.to_path_buf(),
            source,
        })?;

    validate_header(&mut reader, &sheet, path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|source| LoadError::SheetUnreadable {
            sheet: sheet.clone(),
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(parse_record(&record, &sheet, path, row)?);
    }

    Ok(Dataset::new(group, rows))
}

/// Loads both sheets from a workbook directory.
///
/// # Errors
///
/// Returns [`LoadError`] from the first sheet that fails to load.
pub fn load_workbook(dir: &Path) -> Result<(Dataset, Dataset), LoadError> {
    let control = load_sheet(&dir.join(CONTROL_SHEET_FILE), Group::Control)?;
    let test = load_sheet(&dir.join(TEST_SHEET_FILE), Group::Test)?;
    Ok((control, test))
}

/// Checks the sheet header against the fixed four-column schema.
fn validate_header(
    reader: &mut csv::Reader<std::fs::File>,
    sheet: &str,
    path: &Path,
) -> Result<(), LoadError> {
    let headers = reader.headers().map_err(|source| LoadError::SheetUnreadable {
        sheet: sheet.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let found: Vec<String> = headers.iter().map(str::to_string).collect();
    let expected: Vec<String> = Metric::ALL
        .iter()
        .map(|metric| metric.column_name().to_string())
        .collect();
    if found != expected {
        return Err(LoadError::SchemaMismatch {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
            found,
            expected,
        });
    }
    Ok(())
}

/// Parses one CSV record into an observation.
fn parse_record(
    record: &csv::StringRecord,
    sheet: &str,
    path: &Path,
    row: usize,
) -> Result<Observation, LoadError> {
    if record.len() != Metric::ALL.len() {
        return Err(LoadError::FieldCount {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
            row,
            expected: Metric::ALL.len(),
            found: record.len(),
        });
    }

    let mut values = [0.0_f64; 4];
    for (slot, metric) in values.iter_mut().zip(Metric::ALL) {
        let raw = record.get(metric_index(metric)).unwrap_or_default();
        *slot = parse_cell(raw, metric, sheet, path, row)?;
    }

    Ok(Observation {
        impression: values[0],
        click: values[1],
        purchase: values[2],
        earning: values[3],
    })
}

/// Returns the header position of a metric column.
const fn metric_index(metric: Metric) -> usize {
    match metric {
        Metric::Impression => 0,
        Metric::Click => 1,
        Metric::Purchase => 2,
        Metric::Earning => 3,
    }
}

/// Parses one cell as a finite non-negative number.
fn parse_cell(
    raw: &str,
    metric: Metric,
    sheet: &str,
    path: &Path,
    row: usize,
) -> Result<f64, LoadError> {
    let invalid = || LoadError::InvalidValue {
        sheet: sheet.to_string(),
        path: path.to_path_buf(),
        row,
        column: metric.column_name(),
        value: raw.to_string(),
    };
    let value: f64 = raw.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
