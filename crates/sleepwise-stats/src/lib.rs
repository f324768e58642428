//! Statistical kernels for the sleepwise survey analysis.
//!
//! Every function in this crate works on plain `f64` slices; selecting columns
//! and dropping missing answers happens upstream in `sleepwise-analysis`.
//!
//! - **Descriptive statistics**: mean, median, quartiles, min/max, sample variance
//! - **Percentiles**: linear-interpolated percentiles and quartiles
//! - **Histogram generation**: P5–P95 binning with tail bins
//! - **Correlation**: Pearson's r with a two-tailed t-test
//! - **Group comparison**: Welch's unequal-variance t-test
//! - **Regression**: ordinary least squares with one predictor
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Interpolated percentiles and quartiles
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`correlation`]: Pearson correlation and its significance
//! - [`ttest`]: Welch's two-sample t-test
//! - [`regression`]: Simple linear regression
//! - [`significance`]: Student t tail probabilities shared by the tests
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use sleepwise_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Testing a correlation
//!
//! ```
//! use sleepwise_stats::correlation::Correlation;
//!
//! let pairs = [(4.0, 40.0), (7.0, 52.0), (9.0, 49.0), (12.0, 61.0)];
//! let corr = Correlation::pearson(&pairs).unwrap();
//! assert!(corr.r > 0.0);
//! assert!((0.0..=1.0).contains(&corr.p_value));
//! ```
//!
//! ## Comparing two groups
//!
//! ```
//! use sleepwise_stats::ttest::WelchTest;
//!
//! let good = [38.0, 41.0, 35.0, 44.0];
//! let poor = [49.0, 55.0, 47.0, 58.0, 52.0];
//! let test = WelchTest::new(&good, &poor).unwrap();
//! assert!(test.t < 0.0);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod error;
pub mod histogram;
pub mod percentiles;
pub mod regression;
pub mod significance;
pub mod ttest;

pub use self::error::StatsError;
