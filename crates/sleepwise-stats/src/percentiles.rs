use serde::Serialize;

/// Lower quartile, median and upper quartile of a sample.
///
/// # Examples
///
/// ```
/// use sleepwise_stats::percentiles::Quartiles;
///
/// let quartiles = Quartiles::of_sorted(&[10.0, 20.0, 30.0, 40.0]).unwrap();
/// assert_eq!(quartiles.q1, 17.5);
/// assert_eq!(quartiles.median, 25.0);
/// assert_eq!(quartiles.q3, 32.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Quartiles of an ascending sample, or `None` when it is empty.
    #[must_use]
    pub fn of_sorted(sorted: &[f64]) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        Some(Self {
            q1: compute_percentile(sorted, 25.0),
            median: compute_percentile(sorted, 50.0),
            q3: compute_percentile(sorted, 75.0),
        })
    }

    /// Distance between the upper and lower quartile.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Value at percentile `percentile` (0 to 100) of an ascending sample.
///
/// Uses linear interpolation between the two closest ranks: the k-th percentile
/// sits at fractional position `(n - 1) * k / 100`. The 50th percentile is
/// therefore the usual median (mean of the middle pair for even `n`).
/// Out-of-range percentiles are clamped.
///
/// Returns `f64::NAN` if the input is empty.
///
/// ```
/// use sleepwise_stats::percentiles::compute_percentile;
///
/// let psqi_2_groups = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
/// assert_eq!(compute_percentile(&psqi_2_groups, 50.0), 1.5);
/// assert_eq!(compute_percentile(&psqi_2_groups, 0.0), 1.0);
/// assert_eq!(compute_percentile(&psqi_2_groups, 100.0), 2.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted: &[f64], percentile: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let below = (position.floor() as usize).min(last);
    let above = (position.ceil() as usize).min(last);
    let weight = position - position.floor();
    sorted[below] + (sorted[above] - sorted[below]) * weight
}
