// crates/ab-verdict-core/src/config.rs
// ============================================================================
// Module: AB Verdict Analysis Configuration
// Description: Validated analysis settings with TOML loading.
// Purpose: Keep significance and presentation knobs explicit and bounded.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Analysis configuration covers the two knobs the pipeline exposes: the
//! significance level used by every stage and the number of preview rows in
//! descriptive summaries. Configuration files are untrusted input and must
//! pass `validate` before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default two-sided significance level.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default number of preview rows in a dataset summary.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Returns the default significance level for serde defaults.
const fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

/// Returns the default preview row count for serde defaults.
const fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

// ============================================================================
// SECTION: Config Errors
// ============================================================================

/// Errors returned by configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config file unreadable at {path}: {source}")]
    Unreadable {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("config file invalid at {path}: {source}")]
    Invalid {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// A configuration value is outside its allowed range.
    #[error("{0}")]
    Validation(String),
}

// ============================================================================
// SECTION: Analysis Config
// ============================================================================

/// Validated analysis settings.
///
/// # Invariants
/// - `alpha` lies strictly between zero and one.
/// - `preview_rows` is at least one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Two-sided significance level shared by all stages.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Number of rows shown in dataset summary previews.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl AnalysisConfig {
    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(ConfigError::Validation(format!(
                "alpha must lie strictly between 0 and 1, got {}",
                self.alpha
            )));
        }
        if self.preview_rows == 0 {
            return Err(ConfigError::Validation(
                "preview_rows must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, not valid TOML,
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
