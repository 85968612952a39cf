//! Parametric significance tests for comparing sample means
//!
//! - [`TTest`]: Student's two-sample t test (pooled variance, two-sided)
//! - [`OneWayAnova`]: one-way analysis of variance across two or more samples
//! - [`effect_size`]: standardized mean difference
//!
//! Degenerate samples with zero within-sample spread do not produce NaN:
//! equal means give a statistic of 0 and a p-value of 1, different means an
//! infinite statistic and a p-value of 0.

use statrs::distribution::{ContinuousCDF as _, FisherSnedecor};

use crate::{descriptive, regression};

/// Minimum number of observations per sample for a two-sample test.
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Result of Student's independent two-sample t test.
#[derive(Debug, Clone, PartialEq)]
pub struct TTest {
    /// t statistic (`mean_a - mean_b` over its standard error)
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Degrees of freedom (`n_a + n_b - 2`)
    pub df: f64,
}

impl TTest {
    /// Runs the test on two independent samples assuming equal variances.
    ///
    /// Returns `None` if either sample has fewer than [`MIN_SAMPLE_SIZE`]
    /// observations.
    ///
    /// # Examples
    ///
    /// ```
    /// use combirank_stats::hypothesis::TTest;
    ///
    /// let test = TTest::independent(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0]).unwrap();
    /// assert!(test.statistic < 0.0);
    /// assert!(test.p_value > 0.05);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn independent(a: &[f64], b: &[f64]) -> Option<Self> {
        if a.len() < MIN_SAMPLE_SIZE || b.len() < MIN_SAMPLE_SIZE {
            return None;
        }
        let (n_a, n_b) = (a.len() as f64, b.len() as f64);
        let mean_a = descriptive::mean(a)?;
        let mean_b = descriptive::mean(b)?;
        let var_a = descriptive::sample_variance(a)?;
        let var_b = descriptive::sample_variance(b)?;

        let df = n_a + n_b - 2.0;
        let pooled_var = ((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / df;
        let std_err = (pooled_var * (1.0 / n_a + 1.0 / n_b)).sqrt();
        let diff = mean_a - mean_b;

        let (statistic, p_value) = if std_err == 0.0 {
            degenerate_outcome(diff)
        } else {
            let t = diff / std_err;
            (t, regression::two_sided_t_p_value(t, df)?)
        };

        Some(Self {
            statistic,
            p_value,
            df,
        })
    }
}

/// Result of a one-way analysis of variance.
#[derive(Debug, Clone, PartialEq)]
pub struct OneWayAnova {
    /// F statistic (between-group over within-group mean square)
    pub statistic: f64,
    /// Upper-tail p-value of the F statistic
    pub p_value: f64,
    /// Between-group degrees of freedom (`k - 1`)
    pub df_between: f64,
    /// Within-group degrees of freedom (`N - k`)
    pub df_within: f64,
}

impl OneWayAnova {
    /// Runs the test over `samples`.
    ///
    /// Returns `None` unless there are at least two samples, every sample is
    /// non-empty, and the total observation count exceeds the sample count.
    ///
    /// # Examples
    ///
    /// ```
    /// use combirank_stats::hypothesis::OneWayAnova;
    ///
    /// let low = [5.0, 5.0, 5.0];
    /// let high = [9.0, 9.0, 9.0];
    /// let anova = OneWayAnova::new(&[&low[..], &high[..]]).unwrap();
    /// assert_eq!(anova.p_value, 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(samples: &[&[f64]]) -> Option<Self> {
        let k = samples.len();
        let total = samples.iter().map(|s| s.len()).sum::<usize>();
        if k < 2 || samples.iter().any(|s| s.is_empty()) || total <= k {
            return None;
        }

        let grand_mean = samples.iter().flat_map(|s| s.iter()).sum::<f64>() / total as f64;
        let mut ss_between = 0.0;
        let mut ss_within = 0.0;
        for sample in samples {
            let mean = descriptive::mean(sample)?;
            ss_between += sample.len() as f64 * (mean - grand_mean).powi(2);
            ss_within += descriptive::sum_of_squares(sample, mean);
        }

        let df_between = (k - 1) as f64;
        let df_within = (total - k) as f64;

        let (statistic, p_value) = if ss_within == 0.0 {
            degenerate_outcome(ss_between)
        } else {
            let f = (ss_between / df_between) / (ss_within / df_within);
            let dist = FisherSnedecor::new(df_between, df_within).ok()?;
            (f, dist.sf(f).clamp(0.0, 1.0))
        };

        Some(Self {
            statistic,
            p_value,
            df_between,
            df_within,
        })
    }
}

/// Standardized mean difference `|mean_a - mean_b| / sqrt((var_a + var_b) / 2)`.
///
/// Returns `None` if either sample has fewer than [`MIN_SAMPLE_SIZE`]
/// observations. When both samples have zero spread the result is 0 for
/// equal means and infinity otherwise.
///
/// # Examples
///
/// ```
/// use combirank_stats::hypothesis::effect_size;
///
/// let d = effect_size(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(d, 1.0);
/// ```
#[must_use]
pub fn effect_size(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < MIN_SAMPLE_SIZE || b.len() < MIN_SAMPLE_SIZE {
        return None;
    }
    let diff = (descriptive::mean(a)? - descriptive::mean(b)?).abs();
    let pooled_std =
        f64::midpoint(descriptive::sample_variance(a)?, descriptive::sample_variance(b)?).sqrt();
    if pooled_std == 0.0 {
        return Some(if diff == 0.0 { 0.0 } else { f64::INFINITY });
    }
    Some(diff / pooled_std)
}

fn degenerate_outcome(signal: f64) -> (f64, f64) {
    if signal == 0.0 {
        (0.0, 1.0)
    } else {
        (f64::INFINITY.copysign(signal), 0.0)
    }
}
