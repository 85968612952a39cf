//! Equal-width binning over an observed value range
//!
//! The observed range `[min, max]` is split into `count` bins of width
//! `w = (max - min) / count`, giving boundaries
//! `[min, min + w, min + 2w, ..., max]`.
//!
//! Bins are open on the left and closed on the right, `(e_i, e_{i+1}]`,
//! except that the first bin also contains `min` itself. A value exactly on
//! an inner edge belongs to the lower bin. When every value is identical the
//! range has no width and all values are placed in the middle bin.
//!
//! # Examples
//!
//! ```
//! use combirank_stats::binning::EqualWidthBins;
//!
//! let bins = EqualWidthBins::new([0.0, 1.0, 2.0, 3.0], 3).unwrap();
//! assert_eq!(bins.bin_of(0.0), 0);
//! assert_eq!(bins.bin_of(1.0), 0);
//! assert_eq!(bins.bin_of(1.5), 1);
//! assert_eq!(bins.bin_of(3.0), 2);
//! ```

/// Equal-width partition of an observed value range.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualWidthBins {
    /// Lower bound of the first bin
    pub min: f64,
    /// Upper bound of the last bin (inclusive)
    pub max: f64,
    /// Number of bins
    pub count: usize,
}

impl EqualWidthBins {
    /// Builds bins spanning the range of `values`.
    ///
    /// Returns `None` if `values` is empty, contains a non-finite value, or
    /// `count` is zero.
    #[must_use]
    pub fn new<I>(values: I, count: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        if count == 0 {
            return None;
        }
        let mut range: Option<(f64, f64)> = None;
        for value in values {
            if !value.is_finite() {
                return None;
            }
            range = Some(match range {
                None => (value, value),
                Some((min, max)) => (min.min(value), max.max(value)),
            });
        }
        let (min, max) = range?;
        Some(Self { min, max, count })
    }

    /// Width of a single bin.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.count as f64
    }

    /// Bin boundaries, `count + 1` values from `min` to `max`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn edges(&self) -> Vec<f64> {
        let width = self.width();
        (0..=self.count)
            .map(|i| {
                if i == self.count {
                    self.max
                } else {
                    self.min + width * i as f64
                }
            })
            .collect()
    }

    /// Index of the bin containing `value`.
    ///
    /// Values outside `[min, max]` are clamped to the first or last bin.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn bin_of(&self, value: f64) -> usize {
        let width = self.width();
        if width <= 0.0 {
            return (self.count - 1) / 2;
        }
        if value >= self.max {
            return self.count - 1;
        }
        if value <= self.min {
            return 0;
        }
        let position = ((value - self.min) / width).ceil() - 1.0;
        (position.max(0.0) as usize).min(self.count - 1)
    }
}
