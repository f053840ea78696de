// crates/ab-verdict-core/src/lib.rs
// ============================================================================
// Module: AB Verdict Core Library
// Description: Data model, loaders, summaries, and the A/B test runner.
// Purpose: Provide the deterministic analysis pipeline behind the CLI.
// Dependencies: csv, serde, statrs, thiserror, toml
// ============================================================================

//! ## Overview
//! `ab-verdict-core` implements the purchase A/B analysis pipeline: load the
//! two workbook sheets, summarize them, merge them into one tagged dataset,
//! and run the three-stage hypothesis procedure (normality, variance
//! homogeneity, mean comparison) over the selected metric. Every stage is a
//! pure function over immutable data; rerunning the pipeline on unchanged
//! input yields bit-identical statistics.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod dataset;
pub mod describe;
pub mod loader;
pub mod report;
pub mod runner;
pub mod stats;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::AnalysisConfig;
pub use config::ConfigError;
pub use dataset::CombinedDataset;
pub use dataset::Dataset;
pub use dataset::Group;
pub use dataset::MergeError;
pub use dataset::Metric;
pub use dataset::Observation;
pub use describe::DatasetSummary;
pub use describe::summarize;
pub use loader::LoadError;
pub use loader::load_sheet;
pub use loader::load_workbook;
pub use report::FormatOptions;
pub use report::render_report;
pub use report::render_summary;
pub use runner::AbTestReport;
pub use runner::TestChoice;
pub use runner::Verdict;
pub use runner::run_ab_test;
pub use stats::StatError;
pub use stats::TestOutcome;
