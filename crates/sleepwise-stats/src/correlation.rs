//! Pearson product-moment correlation with two-tailed significance.

use serde::Serialize;

use crate::{error::StatsError, significance};

/// Minimum number of paired observations for a correlation test (df = n - 2 >= 1).
pub const MIN_PAIRS: usize = 3;

/// Pearson correlation between two paired samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    /// Correlation coefficient in [-1, 1].
    pub r: f64,
    /// Two-tailed p-value for H0: r = 0.
    pub p_value: f64,
    /// Number of pairs used.
    pub n: usize,
}

impl Correlation {
    /// Computes Pearson's r and its two-tailed p-value from paired observations.
    ///
    /// The statistic `t = r * sqrt((n - 2) / (1 - r^2))` is tested against
    /// Student's t with `n - 2` degrees of freedom.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleepwise_stats::correlation::Correlation;
    ///
    /// let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
    /// let corr = Correlation::pearson(&pairs).unwrap();
    /// assert!((corr.r - 0.774_596_669).abs() < 1e-6);
    /// assert!((corr.p_value - 0.124_027).abs() < 1e-4);
    /// assert_eq!(corr.n, 5);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn pearson(pairs: &[(f64, f64)]) -> Result<Self, StatsError> {
        StatsError::require(MIN_PAIRS, pairs.len())?;
        let r = coefficient(pairs).ok_or(StatsError::ZeroVariance)?;
        let n = pairs.len();
        let df = (n - 2) as f64;

        let p_value = if 1.0 - r * r <= f64::EPSILON {
            0.0
        } else {
            let t = r * (df / (1.0 - r * r)).sqrt();
            significance::two_tailed_p(t, df)?
        };

        Ok(Self { r, p_value, n })
    }
}

/// Pearson's r without a significance test.
///
/// Returns `None` when either side has zero variance or fewer than two pairs
/// are given. Swapping the two sides of every pair yields the identical value.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn coefficient(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_perfect_positive() {
        let pairs = [(1.0, 10.0), (2.0, 20.0), (3.0, 30.0), (4.0, 40.0)];
        let corr = Correlation::pearson(&pairs).unwrap();
        assert_relative_eq!(corr.r, 1.0);
        assert_eq!(corr.p_value, 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [(1.0, 3.2), (2.5, 1.1), (3.0, 4.8), (4.2, 4.1), (6.0, 5.5)];
        let swapped = pairs.iter().map(|&(x, y)| (y, x)).collect::<Vec<_>>();
        assert_eq!(
            Correlation::pearson(&pairs).unwrap(),
            Correlation::pearson(&swapped).unwrap()
        );
    }

    #[test]
    fn test_too_few_pairs() {
        assert_eq!(
            Correlation::pearson(&[(1.0, 2.0), (2.0, 3.0)]),
            Err(StatsError::InsufficientData {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_constant_column() {
        let pairs = [(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        assert_eq!(Correlation::pearson(&pairs), Err(StatsError::ZeroVariance));
        assert_eq!(coefficient(&pairs), None);
    }
}
