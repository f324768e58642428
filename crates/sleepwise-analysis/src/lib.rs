//! Survey data derivation and statistical analysis for the sleepwise study
//!
//! This crate turns the raw student sleep survey (sleep quality, trait anxiety,
//! chronotype and preferred class start time) into derived categories, summary
//! statistics, hypothesis tests and chart-ready tables.
//!
//! # Overview
//!
//! The pipeline runs leaf-first:
//!
//! 1. **Load** ([`loader::DatasetLoader`]): Read the CSV from a file or URL and
//!    resolve column roles ([`schema::ColumnMapping`]) into a [`dataset::Dataset`]
//! 2. **Derive** ([`feature::derive_labels`]): Compute sleep and chronotype
//!    categories once per dataset
//! 3. **Compute** ([`engine::StatisticsEngine`]): Descriptive statistics,
//!    correlations, Welch tests, regression fits and chart data over columns
//! 4. **Report** ([`section::Analysis`]): Execute the fixed plan of each
//!    [`section::Section`] into a serializable [`section::SectionReport`]
//!
//! # Failure Model
//!
//! Loading either produces a complete dataset or a [`error::LoadError`]; there
//! is no partial dataset. Once loaded, every statistic fails independently: an
//! absent optional column, too few observations or a degenerate grouping skips
//! only that item of a section report.
//!
//! # Modules
//!
//! - [`schema`]: Column roles and their resolution against a header
//! - [`dataset`]: Parsed records and column access
//! - [`loader`]: Session-scoped loading with a per-source cache
//! - [`feature`]: Sleep and chronotype categorizers
//! - [`engine`]: Statistics over dataset columns
//! - [`result`]: Serializable statistic results
//! - [`section`]: Section plans and the orchestrator
//! - [`error`]: Load, feature and per-item errors
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use sleepwise_analysis::{
//!     dataset::Dataset,
//!     section::{Analysis, AnalysisConfig, Section},
//! };
//!
//! let csv = "\
//! PSQI_Score,Trait_Anxiety,MEQ
//! 3,38,62
//! 9,55,45
//! 4,44,58
//! 12,60,35
//! ";
//! let dataset = Dataset::from_csv_reader("inline", csv.as_bytes())?;
//! let analysis = Analysis::new(Arc::new(dataset), AnalysisConfig::default());
//!
//! let report = analysis.run(Section::DistributionsAndCorrelation);
//! let corr = report.item("Correlation psqi vs trait_anxiety").unwrap();
//! assert!(corr.result().is_some());
//! # Ok::<(), sleepwise_analysis::error::LoadError>(())
//! ```

pub mod dataset;
pub mod engine;
pub mod error;
pub mod feature;
pub mod loader;
pub mod result;
pub mod schema;
pub mod section;
