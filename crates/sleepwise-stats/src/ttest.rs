//! Welch's unequal-variance two-sample t-test.

use serde::Serialize;

use crate::{descriptive::DescriptiveStats, error::StatsError, significance};

/// Minimum observations per group (a sample variance needs two values).
pub const MIN_GROUP_SIZE: usize = 2;

/// Result of Welch's t-test comparing the means of two samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WelchTest {
    /// t statistic for `mean(first) - mean(second)`.
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    /// Summary of the first sample.
    pub first: DescriptiveStats,
    /// Summary of the second sample.
    pub second: DescriptiveStats,
}

impl WelchTest {
    /// Runs Welch's t-test on two independent samples.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleepwise_stats::ttest::WelchTest;
    ///
    /// let test = WelchTest::new(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 6.0, 8.0, 9.0]).unwrap();
    /// assert!((test.t - (-2.965_541)).abs() < 1e-5);
    /// assert!((test.df - 6.330_718).abs() < 1e-5);
    /// assert!((test.p_value - 0.023_551).abs() < 1e-4);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn new(first: &[f64], second: &[f64]) -> Result<Self, StatsError> {
        StatsError::require(MIN_GROUP_SIZE, first.len())?;
        StatsError::require(MIN_GROUP_SIZE, second.len())?;

        let first = DescriptiveStats::new(first.iter().copied())
            .ok_or(StatsError::InsufficientData { required: MIN_GROUP_SIZE, actual: 0 })?;
        let second = DescriptiveStats::new(second.iter().copied())
            .ok_or(StatsError::InsufficientData { required: MIN_GROUP_SIZE, actual: 0 })?;

        let n1 = first.count as f64;
        let n2 = second.count as f64;
        let se1 = first.variance / n1;
        let se2 = second.variance / n2;
        let se_sum = se1 + se2;
        if se_sum <= 0.0 {
            return Err(StatsError::ZeroVariance);
        }

        let t = (first.mean - second.mean) / se_sum.sqrt();
        let df = se_sum.powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
        let p_value = significance::two_tailed_p(t, df)?;

        Ok(Self {
            t,
            df,
            p_value,
            first,
            second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_means() {
        let test = WelchTest::new(&[1.0, 2.0, 3.0], &[0.0, 2.0, 4.0]).unwrap();
        assert_eq!(test.t, 0.0);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_direction_follows_argument_order() {
        let low = [1.0, 2.0, 3.0, 2.0];
        let high = [7.0, 9.0, 8.0, 10.0];
        let forward = WelchTest::new(&low, &high).unwrap();
        let backward = WelchTest::new(&high, &low).unwrap();
        assert!(forward.t < 0.0);
        assert_eq!(forward.t, -backward.t);
        assert_eq!(forward.p_value, backward.p_value);
        assert!(forward.t.is_finite() && forward.p_value.is_finite());
    }

    #[test]
    fn test_group_too_small() {
        assert_eq!(
            WelchTest::new(&[1.0], &[2.0, 3.0]),
            Err(StatsError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_both_constant() {
        assert_eq!(
            WelchTest::new(&[1.0, 1.0], &[2.0, 2.0]),
            Err(StatsError::ZeroVariance)
        );
    }
}
