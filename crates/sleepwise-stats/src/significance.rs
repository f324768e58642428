use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::StatsError;

/// Two-tailed p-value of a t statistic under Student's t with `df` degrees of freedom.
///
/// # Examples
///
/// ```
/// use sleepwise_stats::significance::two_tailed_p;
///
/// let p = two_tailed_p(0.0, 10.0).unwrap();
/// assert!((p - 1.0).abs() < 1e-12);
/// ```
pub fn two_tailed_p(t: f64, df: f64) -> Result<f64, StatsError> {
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| StatsError::DegenerateDistribution { df })?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_known_quantile() {
        // t = 2.228 is the 97.5% quantile for df = 10
        assert_abs_diff_eq!(two_tailed_p(2.228, 10.0).unwrap(), 0.05, epsilon = 1e-3);
        assert_abs_diff_eq!(two_tailed_p(-2.228, 10.0).unwrap(), 0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_infinite_statistic() {
        assert_eq!(two_tailed_p(f64::INFINITY, 3.0).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_df() {
        assert_eq!(
            two_tailed_p(1.0, 0.0),
            Err(StatsError::DegenerateDistribution { df: 0.0 })
        );
    }
}
