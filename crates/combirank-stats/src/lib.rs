//! Numeric kernels for the Combirank analysis pipeline.
//!
//! This crate is free of any domain vocabulary. It provides:
//!
//! - **Descriptive statistics**: mean, unbiased sample variance
//! - **Binning**: equal-width partition of an observed range
//! - **Regression**: ordinary least squares line with a slope significance test
//! - **Hypothesis tests**: Student's two-sample t test, one-way ANOVA, effect size
//! - **Clustering**: seeded k-means with k-means++ initialization
//!
//! Inputs that cannot produce a meaningful result (empty samples, too few
//! observations, non-finite values) yield `None` instead of NaN.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`binning`]: Equal-width bins for tiering a value range
//! - [`regression`]: Simple linear regression
//! - [`hypothesis`]: Significance tests and effect size
//! - [`kmeans`]: Reproducible k-means clustering
//!
//! # Examples
//!
//! ## Comparing two samples
//!
//! ```
//! use combirank_stats::hypothesis::{TTest, effect_size};
//!
//! let a = [20.5, 21.0, 22.3, 21.7];
//! let b = [24.1, 25.0, 24.4, 25.3];
//! let test = TTest::independent(&a, &b).unwrap();
//! assert!(test.p_value < 0.05);
//! assert!(effect_size(&a, &b).unwrap() > 2.0);
//! ```
//!
//! ## Fitting a trend
//!
//! ```
//! use combirank_stats::regression::LinearFit;
//!
//! let fit = LinearFit::new(&[2020.0, 2021.0, 2022.0, 2023.0], &[21.0, 21.5, 21.4, 22.0]).unwrap();
//! assert!(fit.slope > 0.0);
//! ```

pub mod binning;
pub mod descriptive;
pub mod hypothesis;
pub mod kmeans;
pub mod regression;
