use serde::Serialize;

use crate::percentiles::Quartiles;

/// Summary of one numeric column after missing answers are dropped.
///
/// Quartiles use linear interpolation (see
/// [`compute_percentile`](crate::percentiles::compute_percentile)); variance
/// and standard deviation use the sample (`n - 1`) denominator and are zero for
/// a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values` in any order. Returns `None` for an empty input.
    ///
    /// ```
    /// # use sleepwise_stats::descriptive::DescriptiveStats;
    /// let trait_anxiety = [52.0, 38.0, 47.0, 61.0, 42.0];
    /// let stats = DescriptiveStats::new(trait_anxiety).unwrap();
    /// assert_eq!(stats.count, 5);
    /// assert_eq!(stats.min, 38.0);
    /// assert_eq!(stats.max, 61.0);
    /// assert_eq!(stats.median, 47.0);
    /// assert_eq!(stats.mean, 48.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted: Vec<f64> = values.into_iter().collect();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted)
    }

    /// Same as [`new`](Self::new) for input that is already ascending.
    ///
    /// # Panics
    ///
    /// Panics if `sorted` is not ascending.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        assert!(
            sorted.windows(2).all(|w| w[0] <= w[1]),
            "input is not in ascending order"
        );

        let quartiles = Quartiles::of_sorted(sorted)?;
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = match count {
            1 => 0.0,
            _ => {
                let squares = sorted.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
                squares / (count - 1) as f64
            }
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median: quartiles.median,
            q1: quartiles.q1,
            q3: quartiles.q3,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn test_two_level_scores() {
        let stats = DescriptiveStats::new([1.0, 1.0, 1.0, 2.0, 2.0, 2.0]).unwrap();
        assert_eq!(stats.count, 6);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 2.0);
        assert_eq!(stats.mean, 1.5);
        assert_eq!(stats.median, 1.5);
    }

    #[test]
    fn test_sample_variance() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(stats.variance, 32.0 / 7.0);
        assert_relative_eq!(stats.std_dev, (32.0_f64 / 7.0).sqrt());
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([3.5]).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q1, 3.5);
        assert_eq!(stats.q3, 3.5);
        assert_eq!(stats.variance, 0.0);
    }

    #[test]
    #[should_panic(expected = "ascending")]
    fn test_unsorted_input_panics() {
        let _ = DescriptiveStats::from_sorted(&[3.0, 1.0]);
    }
}
