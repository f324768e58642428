//! Ordinary least squares with a single predictor.

use serde::Serialize;

use crate::{error::StatsError, significance};

/// Minimum number of observations (residual df = n - 2 >= 1).
pub const MIN_OBSERVATIONS: usize = 3;

/// Fitted line `response = intercept + slope * predictor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Standard error of the slope.
    pub slope_std_err: f64,
    /// Two-tailed p-value for H0: slope = 0.
    pub p_value: f64,
    /// Number of observations used.
    pub n: usize,
}

impl LinearFit {
    /// Fits a least-squares line through `(predictor, response)` points.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleepwise_stats::regression::LinearFit;
    ///
    /// let points = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
    /// let fit = LinearFit::ols(&points).unwrap();
    /// assert!((fit.slope - 0.6).abs() < 1e-12);
    /// assert!((fit.intercept - 2.2).abs() < 1e-12);
    /// assert!((fit.r_squared - 0.6).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn ols(points: &[(f64, f64)]) -> Result<Self, StatsError> {
        StatsError::require(MIN_OBSERVATIONS, points.len())?;
        let n = points.len();
        let nf = n as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / nf;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / nf;

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }
        if sxx <= 0.0 {
            return Err(StatsError::ZeroVariance);
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        // A constant response is fitted exactly by a flat line.
        let r_squared = if syy > 0.0 {
            (sxy * sxy / (sxx * syy)).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let df = (n - 2) as f64;
        let sse = points
            .iter()
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum::<f64>();
        let slope_std_err = (sse / df / sxx).sqrt();
        let p_value = if slope_std_err > 0.0 {
            significance::two_tailed_p(slope / slope_std_err, df)?
        } else if slope == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            slope_std_err,
            p_value,
            n,
        })
    }

    /// Predicted response for a predictor value.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
