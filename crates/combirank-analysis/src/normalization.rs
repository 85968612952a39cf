//! Z-score standardization of indicators across groups
//!
//! For each requested indicator the mean `μ` and sample standard deviation
//! `σ` are taken over all groups of the run, and every group's value becomes
//! `(raw - μ) / σ`.
//!
//! An indicator on which all groups agree (`σ = 0`, or a single group) has no
//! scale: its standardized value is defined as `0` for every group and the
//! indicator is listed in [`NormalizedFeatureSet::degenerate`].
//!
//! # Example
//!
//! ```
//! use combirank_analysis::{normalization::NormalizedFeatureSet, record::MetricRecord};
//!
//! let records = vec![
//!     MetricRecord::new("A00", None).with("pass_rate", 70.0),
//!     MetricRecord::new("B00", None).with("pass_rate", 90.0),
//! ];
//! let normalized = NormalizedFeatureSet::from_records(&records, &["pass_rate"])?;
//! assert!(normalized.get("A00", "pass_rate").unwrap() < 0.0);
//! assert!(normalized.get("B00", "pass_rate").unwrap() > 0.0);
//! # Ok::<(), combirank_analysis::AnalysisError>(())
//! ```

use std::collections::{BTreeMap, btree_map::Entry};

use combirank_stats::descriptive;
use serde::Serialize;

use crate::{AnalysisError, record::MetricRecord};

/// Group code → indicator name → value.
pub type FeatureTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Location and scale used to standardize one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZScoreParam {
    pub mean: f64,
    /// Sample standard deviation; `0` for a degenerate indicator
    pub std_dev: f64,
}

impl ZScoreParam {
    #[must_use]
    pub fn standardize(&self, raw: f64) -> f64 {
        if self.std_dev > 0.0 {
            (raw - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

/// Standardized indicator values for the groups of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFeatureSet {
    /// Standardized values keyed by group, then indicator
    pub values: FeatureTable,
    /// Parameters used for each indicator
    pub params: BTreeMap<String, ZScoreParam>,
    /// Indicators with zero spread, standardized to `0`
    pub degenerate: Vec<String>,
}

impl NormalizedFeatureSet {
    /// Standardizes `indicators` over `records`, one record per group.
    ///
    /// Fails if a group appears twice or a record lacks a requested
    /// indicator.
    pub fn from_records<S>(
        records: &[MetricRecord],
        indicators: &[S],
    ) -> Result<Self, AnalysisError>
    where
        S: AsRef<str>,
    {
        let mut raw: FeatureTable = BTreeMap::new();
        for record in records {
            let mut values = BTreeMap::new();
            for indicator in indicators {
                let indicator = indicator.as_ref();
                values.insert(indicator.to_owned(), record.require(indicator)?);
            }
            match raw.entry(record.group.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(values);
                }
                Entry::Occupied(entry) => {
                    return Err(AnalysisError::DuplicateGroup {
                        group: entry.key().clone(),
                    });
                }
            }
        }

        let mut params = BTreeMap::new();
        let mut degenerate = vec![];
        for indicator in indicators {
            let indicator = indicator.as_ref();
            let column = raw.values().map(|v| v[indicator]).collect::<Vec<_>>();
            // Compared exactly: the rounded mean of equal values may leave
            // residuals that would otherwise rescale to arbitrary z-scores.
            let param = if column.iter().all(|v| *v == column[0]) {
                tracing::debug!(
                    indicator,
                    groups = column.len(),
                    "indicator has no spread, standardized to zero"
                );
                degenerate.push(indicator.to_owned());
                ZScoreParam {
                    mean: column.first().copied().unwrap_or(0.0),
                    std_dev: 0.0,
                }
            } else {
                ZScoreParam {
                    mean: descriptive::mean(&column).unwrap_or(0.0),
                    std_dev: descriptive::sample_variance(&column).map_or(0.0, f64::sqrt),
                }
            };
            params.insert(indicator.to_owned(), param);
        }

        let values = raw
            .into_iter()
            .map(|(group, row)| {
                let row = row
                    .into_iter()
                    .map(|(indicator, value)| {
                        let z = params[&indicator].standardize(value);
                        (indicator, z)
                    })
                    .collect();
                (group, row)
            })
            .collect();

        Ok(Self {
            values,
            params,
            degenerate,
        })
    }

    #[must_use]
    pub fn get(&self, group: &str, indicator: &str) -> Option<f64> {
        self.values.get(group)?.get(indicator).copied()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Standardized indicators, in the order used by [`Self::vector`].
    pub fn indicators(&self) -> impl Iterator<Item = &str> + '_ {
        self.params.keys().map(String::as_str)
    }

    /// A group's standardized values ordered by indicator name.
    #[must_use]
    pub fn vector(&self, group: &str) -> Option<Vec<f64>> {
        let row = self.values.get(group)?;
        Some(self.indicators().map(|i| row[i]).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
