//! Input records consumed by the analysis components
//!
//! The core works on [`MetricRecord`]: a group code, an optional period and a
//! set of named numeric indicators. Data providers supply three tables
//! ([`CombinationInfo`], [`OutcomeRecord`], [`DistributionRecord`]) bundled
//! in a [`Dataset`]; the outcome and distribution rows convert into metric
//! records with the indicator names defined in [`indicator`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Indicator names produced by the built-in record conversions.
pub mod indicator {
    /// Mean examination score of a distribution row
    pub const MEAN_SCORE: &str = "mean_score";
    /// Standard deviation of examination scores of a distribution row
    pub const SCORE_STD_DEV: &str = "score_std_dev";
    /// Number of candidates of a distribution row
    pub const PARTICIPANTS: &str = "participants";
    /// Share of candidates reaching the pass mark, in percent
    pub const PASS_RATE: &str = "pass_rate";
    /// Admission cutoff score of an outcome row
    pub const CUTOFF_SCORE: &str = "cutoff_score";
    /// Admission quota of an outcome row
    pub const QUOTA: &str = "quota";
    /// Per-group mean of [`CUTOFF_SCORE`]
    pub const MEAN_CUTOFF: &str = "mean_cutoff";
}

/// A group's indicator values, optionally tied to a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Group code (e.g. a subject combination such as `A00`)
    pub group: String,
    /// Period (year) the values refer to, if any
    #[serde(default)]
    pub period: Option<i32>,
    /// Raw indicator values by name
    pub values: BTreeMap<String, f64>,
}

impl MetricRecord {
    #[must_use]
    pub fn new(group: impl Into<String>, period: Option<i32>) -> Self {
        Self {
            group: group.into(),
            period,
            values: BTreeMap::new(),
        }
    }

    /// Adds or replaces an indicator value.
    #[must_use]
    pub fn with(mut self, indicator: impl Into<String>, value: f64) -> Self {
        self.values.insert(indicator.into(), value);
        self
    }

    #[must_use]
    pub fn value(&self, indicator: &str) -> Option<f64> {
        self.values.get(indicator).copied()
    }

    /// Returns the value of `indicator`, failing if it is absent or not finite.
    pub fn require(&self, indicator: &str) -> Result<f64, AnalysisError> {
        let value = self
            .value(indicator)
            .ok_or_else(|| AnalysisError::MissingIndicator {
                group: self.group.clone(),
                indicator: indicator.to_owned(),
            })?;
        if !value.is_finite() {
            return Err(AnalysisError::NonFiniteValue {
                group: self.group.clone(),
                indicator: indicator.to_owned(),
                value,
            });
        }
        Ok(value)
    }
}

/// Descriptive metadata of a subject combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationInfo {
    pub code: String,
    pub subjects: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// One admission outcome: a program's cutoff score for a combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub period: i32,
    pub group: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub region: String,
    pub cutoff_score: f64,
    #[serde(default)]
    pub quota: u32,
}

impl OutcomeRecord {
    #[must_use]
    pub fn to_metric_record(&self) -> MetricRecord {
        MetricRecord::new(&self.group, Some(self.period))
            .with(indicator::CUTOFF_SCORE, self.cutoff_score)
            .with(indicator::QUOTA, f64::from(self.quota))
    }
}

/// Summary of one period's score distribution for a combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub period: i32,
    pub group: String,
    pub mean_score: f64,
    pub std_dev: f64,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub min_score: Option<f64>,
    pub participants: u64,
    pub pass_rate: f64,
}

impl DistributionRecord {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn to_metric_record(&self) -> MetricRecord {
        MetricRecord::new(&self.group, Some(self.period))
            .with(indicator::MEAN_SCORE, self.mean_score)
            .with(indicator::SCORE_STD_DEV, self.std_dev)
            .with(indicator::PARTICIPANTS, self.participants as f64)
            .with(indicator::PASS_RATE, self.pass_rate)
    }
}

/// The three input tables of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub combinations: Vec<CombinationInfo>,
    pub outcomes: Vec<OutcomeRecord>,
    pub distributions: Vec<DistributionRecord>,
}

impl Dataset {
    #[must_use]
    pub fn outcome_records(&self) -> Vec<MetricRecord> {
        self.outcomes
            .iter()
            .map(OutcomeRecord::to_metric_record)
            .collect()
    }

    #[must_use]
    pub fn distribution_records(&self) -> Vec<MetricRecord> {
        self.distributions
            .iter()
            .map(DistributionRecord::to_metric_record)
            .collect()
    }
}

/// Averages `indicators` over all records of each group.
///
/// The result holds one period-less record per group, ordered by group code.
/// Every record must carry every requested indicator.
pub fn average_by_group<S>(
    records: &[MetricRecord],
    indicators: &[S],
) -> Result<Vec<MetricRecord>, AnalysisError>
where
    S: AsRef<str>,
{
    let mut sums: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
    for record in records {
        let (totals, count) = sums
            .entry(&record.group)
            .or_insert_with(|| (vec![0.0; indicators.len()], 0));
        for (total, indicator) in totals.iter_mut().zip(indicators) {
            *total += record.require(indicator.as_ref())?;
        }
        *count += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(group, (totals, count))| {
            let mut averaged = MetricRecord::new(group, None);
            for (total, indicator) in totals.into_iter().zip(indicators) {
                #[expect(clippy::cast_precision_loss)]
                let mean = total / count as f64;
                averaged = averaged.with(indicator.as_ref(), mean);
            }
            averaged
        })
        .collect())
}

/// Collects each group's values of `indicator`, in record order.
pub fn samples_by_group(
    records: &[MetricRecord],
    indicator: &str,
) -> Result<BTreeMap<String, Vec<f64>>, AnalysisError> {
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        let value = record.require(indicator)?;
        samples
            .entry(record.group.clone())
            .or_default()
            .push(value);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_missing_indicator() {
        let record = MetricRecord::new("A00", Some(2021)).with("mean_score", 6.5);
        assert_eq!(record.require("mean_score"), Ok(6.5));
        assert_eq!(
            record.require("pass_rate"),
            Err(AnalysisError::MissingIndicator {
                group: "A00".into(),
                indicator: "pass_rate".into(),
            })
        );
    }

    #[test]
    fn test_require_rejects_non_finite() {
        let record = MetricRecord::new("A00", None).with("x", f64::NAN);
        assert!(matches!(
            record.require("x"),
            Err(AnalysisError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_average_by_group() {
        let records = vec![
            MetricRecord::new("B00", Some(2020)).with("x", 1.0).with("y", 10.0),
            MetricRecord::new("A00", Some(2020)).with("x", 4.0).with("y", 0.0),
            MetricRecord::new("B00", Some(2021)).with("x", 3.0).with("y", 20.0),
        ];
        let averaged = average_by_group(&records, &["x", "y"]).unwrap();
        assert_eq!(averaged.len(), 2);
        assert_eq!(averaged[0].group, "A00");
        assert_eq!(averaged[1].value("x"), Some(2.0));
        assert_eq!(averaged[1].value("y"), Some(15.0));
        assert_eq!(averaged[1].period, None);
    }

    #[test]
    fn test_average_by_group_fails_on_missing_value() {
        let records = vec![MetricRecord::new("A00", None).with("x", 1.0)];
        assert!(average_by_group(&records, &["x", "y"]).is_err());
    }

    #[test]
    fn test_distribution_conversion() {
        let row = DistributionRecord {
            period: 2022,
            group: "D01".into(),
            mean_score: 6.4,
            std_dev: 1.8,
            max_score: None,
            min_score: None,
            participants: 120_000,
            pass_rate: 81.5,
        };
        let record = row.to_metric_record();
        assert_eq!(record.period, Some(2022));
        assert_eq!(record.value(indicator::PARTICIPANTS), Some(120_000.0));
        assert_eq!(record.value(indicator::SCORE_STD_DEV), Some(1.8));
    }

    #[test]
    fn test_dataset_deserializes_with_missing_tables() {
        let json = r#"{ "outcomes": [
            { "period": 2021, "group": "A00", "cutoff_score": 25.5 }
        ] }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert!(dataset.distributions.is_empty());
        assert_eq!(dataset.outcomes[0].quota, 0);
        assert_eq!(
            dataset.outcome_records()[0].value(indicator::CUTOFF_SCORE),
            Some(25.5)
        );
    }

    #[test]
    fn test_samples_by_group() {
        let records = vec![
            MetricRecord::new("A00", None).with("x", 1.0),
            MetricRecord::new("A00", None).with("x", 2.0),
            MetricRecord::new("C00", None).with("x", 3.0),
        ];
        let samples = samples_by_group(&records, "x").unwrap();
        assert_eq!(samples["A00"], vec![1.0, 2.0]);
        assert_eq!(samples["C00"], vec![3.0]);
    }
}
