//! Ordinary least squares simple linear regression
//!
//! Fits `y = intercept + slope * x` and tests the slope against the null
//! hypothesis `slope = 0` with a two-sided Student's t test on `n - 2`
//! degrees of freedom.
//!
//! # Boundary behavior
//!
//! - Fewer than two points, or all `x` identical: no fit (`None`).
//! - Exactly two points: the line passes through both, `r_squared` is 1
//!   unless `y` is constant, and the p-value is 0 (distinct `y`) or 1
//!   (identical `y`) since no residual degrees of freedom remain.
//! - Constant `y`: slope 0, `r_squared` 0, p-value 1.

use statrs::distribution::{ContinuousCDF as _, StudentsT};

use crate::descriptive;

/// Result of a simple linear regression fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// Number of points used in the fit
    pub n: usize,
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Pearson correlation coefficient between x and y
    pub r_value: f64,
    /// Coefficient of determination (`r_value²`)
    pub r_squared: f64,
    /// Two-sided p-value for `slope = 0`
    pub p_value: f64,
    /// Standard error of the slope estimate
    pub std_err: f64,
}

impl LinearFit {
    /// Fits a line through paired observations.
    ///
    /// # Examples
    ///
    /// ```
    /// use combirank_stats::regression::LinearFit;
    ///
    /// let fit = LinearFit::new(&[2020.0, 2021.0, 2022.0], &[20.0, 21.0, 22.0]).unwrap();
    /// assert!((fit.slope - 1.0).abs() < 1e-9);
    /// assert!((fit.r_squared - 1.0).abs() < 1e-9);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return None;
        }

        let n = xs.len();
        let x_mean = descriptive::mean(xs)?;
        let y_mean = descriptive::mean(ys)?;
        let ss_x = descriptive::sum_of_squares(xs, x_mean);
        let ss_y = descriptive::sum_of_squares(ys, y_mean);
        let ss_xy = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - x_mean) * (y - y_mean))
            .sum::<f64>();

        if ss_x == 0.0 {
            return None;
        }

        let slope = ss_xy / ss_x;
        let intercept = y_mean - slope * x_mean;
        let r_value = if ss_y == 0.0 {
            0.0
        } else {
            (ss_xy / (ss_x * ss_y).sqrt()).clamp(-1.0, 1.0)
        };
        let r_squared = r_value * r_value;

        if n == 2 {
            let p_value = if ys[0] == ys[1] { 1.0 } else { 0.0 };
            return Some(Self {
                n,
                slope,
                intercept,
                r_value,
                r_squared,
                p_value,
                std_err: 0.0,
            });
        }

        let df = (n - 2) as f64;
        let std_err = ((1.0 - r_squared).max(0.0) * ss_y / ss_x / df).sqrt();
        let p_value = if r_squared >= 1.0 {
            0.0
        } else {
            let t = r_value * (df / (1.0 - r_squared)).sqrt();
            two_sided_t_p_value(t, df)?
        };

        Some(Self {
            n,
            slope,
            intercept,
            r_value,
            r_squared,
            p_value,
            std_err,
        })
    }

    /// Predicted `y` at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Two-sided tail probability of a Student's t statistic.
pub(crate) fn two_sided_t_p_value(t: f64, df: f64) -> Option<f64> {
    if t.is_infinite() {
        return Some(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).min(1.0))
}
