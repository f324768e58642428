use std::ops::Range;

use serde::Serialize;

use crate::percentiles;

/// Default number of main bins for score distributions.
pub const DEFAULT_NUM_BINS: usize = 10;

/// Binned distribution of one numeric column.
///
/// The main bins cover P5–P95 of the data so that a few extreme answers do not
/// flatten the rest of the chart; values outside that range are counted in
/// dedicated underflow/overflow bins at either end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bins in ascending order, including underflow/overflow bins when present.
    pub bins: Vec<HistogramBin>,
}

/// One bin and the number of values in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// Number of values falling into the bin.
    pub count: u64,
}

/// Binning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSpec {
    /// Number of main bins (excluding underflow/overflow).
    pub num_bins: usize,
    /// Overrides the lower bound of the main range.
    pub min: Option<f64>,
    /// Overrides the upper bound of the main range.
    pub max: Option<f64>,
    /// Rounds the bin width up to a multiple of this unit (1.0 for integer scores).
    pub bin_width_unit: Option<f64>,
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            num_bins: DEFAULT_NUM_BINS,
            min: None,
            max: None,
            bin_width_unit: None,
        }
    }
}

impl Histogram {
    /// Bins `values` in any order.
    ///
    /// ```
    /// # use sleepwise_stats::histogram::{Histogram, HistogramSpec};
    /// let values = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 6.0, 10.0];
    /// let histogram = Histogram::new(values, HistogramSpec { num_bins: 5, ..Default::default() });
    /// let total: u64 = histogram.bins.iter().map(|b| b.count).sum();
    /// assert_eq!(total, 10);
    /// ```
    #[must_use]
    pub fn new<I>(values: I, spec: HistogramSpec) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, spec)
    }

    /// Same as [`new`](Self::new) for input that is already ascending.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not ascending.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], spec: HistogramSpec) -> Self {
        assert!(
            sorted_values.windows(2).all(|w| w[0] <= w[1]),
            "input is not in ascending order"
        );

        let (Some(&hard_min), Some(&hard_max)) = (sorted_values.first(), sorted_values.last())
        else {
            return Self { bins: vec![] };
        };
        if spec.num_bins == 0 {
            return Self { bins: vec![] };
        }
        let num_bins = spec.num_bins;

        let soft_min = spec
            .min
            .unwrap_or_else(|| percentiles::compute_percentile(sorted_values, 5.0));
        let soft_max = spec
            .max
            .unwrap_or_else(|| percentiles::compute_percentile(sorted_values, 95.0));

        let mut width = (soft_max - soft_min) / num_bins as f64;
        if width <= f64::EPSILON {
            // All central values coincide
            width = spec.bin_width_unit.unwrap_or(1.0);
        }
        if let Some(unit) = spec.bin_width_unit {
            width = (width / unit).ceil() * unit;
        }
        let main_end = soft_min + width * num_bins as f64;

        // The main range is closed at both ends so that P95 itself is never a tail value
        let has_underflow = hard_min < soft_min;
        let has_overflow = hard_max > main_end;

        let mut bins = Vec::with_capacity(num_bins + 2);
        if has_underflow {
            bins.push(HistogramBin {
                range: hard_min..soft_min,
                count: 0,
            });
        }
        let offset = bins.len();
        bins.extend((0..num_bins).map(|i| {
            let start = soft_min + width * i as f64;
            let end = if i + 1 == num_bins {
                main_end.next_up()
            } else {
                soft_min + width * (i + 1) as f64
            };
            HistogramBin {
                range: start..end,
                count: 0,
            }
        }));
        if has_overflow {
            bins.push(HistogramBin {
                range: main_end.next_up()..hard_max.next_up(),
                count: 0,
            });
        }

        for &value in sorted_values {
            let idx = if value < soft_min {
                0
            } else if value > main_end {
                bins.len() - 1
            } else {
                let pos = ((value - soft_min) / width).floor() as usize;
                offset + pos.min(num_bins - 1)
            };
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Total number of values counted.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        let histogram = Histogram::new(Vec::new(), HistogramSpec::default());
        assert!(histogram.bins.is_empty());
    }

    #[test]
    fn test_every_value_counted_once() {
        let values = (0..=21).map(f64::from).chain([3.0, 5.0, 5.0, 8.0]);
        let histogram = Histogram::new(values, HistogramSpec::default());
        assert_eq!(histogram.total(), 26);
    }

    #[test]
    fn test_explicit_bounds_without_tails() {
        let histogram = Histogram::new(
            [0.0, 1.0, 2.0, 3.0],
            HistogramSpec {
                num_bins: 4,
                min: Some(0.0),
                max: Some(4.0),
                bin_width_unit: Some(1.0),
            },
        );
        assert_eq!(histogram.bins.len(), 4);
        assert!(histogram.bins.iter().all(|bin| bin.count == 1));
    }

    #[test]
    fn test_outliers_go_to_tail_bins() {
        let mut values = vec![-100.0];
        values.extend((0..40).map(|i| f64::from(i % 10)));
        values.push(100.0);
        let histogram = Histogram::new(values, HistogramSpec::default());
        assert_eq!(histogram.bins.first().unwrap().count, 1);
        assert_eq!(histogram.bins.last().unwrap().count, 1);
        assert_eq!(histogram.total(), 42);
    }

    #[test]
    fn test_constant_values() {
        let histogram = Histogram::new([4.0; 5], HistogramSpec::default());
        assert_eq!(histogram.total(), 5);
    }
}
