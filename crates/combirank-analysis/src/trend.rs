//! Per-period summaries and linear trends
//!
//! [`summarize_by_period`] reduces time-indexed records to one mean per
//! `(period, group)`; [`extract_trends`] regresses those means on the period
//! and labels each group by the fitted slope.
//!
//! Groups observed in fewer than [`MIN_TREND_OBSERVATIONS`] distinct periods
//! get no trend at all: they are absent from the returned map rather than
//! labeled `stable`.

use std::{collections::BTreeMap, fmt};

use combirank_stats::{descriptive::DescriptiveStats, regression::LinearFit};
use serde::Serialize;

use crate::{AnalysisError, record::MetricRecord};

/// Slope magnitude above which a trend counts as a change.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.05;

/// Minimum number of periods for a trend fit.
pub const MIN_TREND_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendLabel {
    #[must_use]
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_SLOPE_THRESHOLD {
            Self::Increasing
        } else if slope < -TREND_SLOPE_THRESHOLD {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Summary of one group's values within one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: i32,
    pub group: String,
    pub mean: f64,
    /// Sample standard deviation; absent for a single observation
    pub std_dev: Option<f64>,
    pub count: usize,
}

/// Summarizes `indicator` per `(period, group)`, ordered by period then group.
///
/// Records without a period are skipped.
pub fn summarize_by_period(
    records: &[MetricRecord],
    indicator: &str,
) -> Result<Vec<PeriodSummary>, AnalysisError> {
    let mut cells: BTreeMap<(i32, &str), Vec<f64>> = BTreeMap::new();
    for record in records {
        let Some(period) = record.period else {
            continue;
        };
        let value = record.require(indicator)?;
        cells.entry((period, &record.group)).or_default().push(value);
    }

    Ok(cells
        .into_iter()
        .filter_map(|((period, group), values)| {
            let stats = DescriptiveStats::new(values)?;
            Some(PeriodSummary {
                period,
                group: group.to_owned(),
                mean: stats.mean,
                std_dev: stats.std_dev(),
                count: stats.count,
            })
        })
        .collect())
}

/// Fitted trend of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub group: String,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Two-sided p-value of the slope against zero
    pub p_value: f64,
    pub label: TrendLabel,
    /// Number of periods used in the fit
    pub periods: usize,
}

/// Fits a trend for every group of `summaries` with enough periods.
pub fn extract_trends(summaries: &[PeriodSummary]) -> BTreeMap<String, TrendResult> {
    let mut series: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for summary in summaries {
        let (xs, ys) = series.entry(&summary.group).or_default();
        xs.push(f64::from(summary.period));
        ys.push(summary.mean);
    }

    let mut trends = BTreeMap::new();
    for (group, (xs, ys)) in series {
        if xs.len() < MIN_TREND_OBSERVATIONS {
            tracing::debug!(group, periods = xs.len(), "too few periods for a trend, omitted");
            continue;
        }
        let Some(fit) = LinearFit::new(&xs, &ys) else {
            tracing::debug!(group, "trend fit not computable, omitted");
            continue;
        };
        trends.insert(
            group.to_owned(),
            TrendResult {
                group: group.to_owned(),
                slope: fit.slope,
                intercept: fit.intercept,
                r_squared: fit.r_squared,
                p_value: fit.p_value,
                label: TrendLabel::from_slope(fit.slope),
                periods: fit.n,
            },
        );
    }
    trends
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn summary(group: &str, period: i32, mean: f64) -> PeriodSummary {
        PeriodSummary {
            period,
            group: group.to_owned(),
            mean,
            std_dev: None,
            count: 1,
        }
    }

    #[test]
    fn test_labels_from_slope() {
        let trends = extract_trends(&[
            summary("up", 2020, 1.0),
            summary("up", 2021, 1.1),
            summary("down", 2020, 1.0),
            summary("down", 2021, 0.9),
            summary("flat", 2020, 1.0),
            summary("flat", 2021, 1.0),
        ]);
        assert_eq!(trends["up"].label, TrendLabel::Increasing);
        assert_eq!(trends["down"].label, TrendLabel::Decreasing);
        assert_eq!(trends["flat"].label, TrendLabel::Stable);
        assert_relative_eq!(trends["up"].slope, 0.1, epsilon = 1e-9);
        assert_eq!(trends["flat"].slope, 0.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(TrendLabel::from_slope(0.05), TrendLabel::Stable);
        assert_eq!(TrendLabel::from_slope(-0.05), TrendLabel::Stable);
        assert_eq!(TrendLabel::from_slope(0.051), TrendLabel::Increasing);
        assert_eq!(TrendLabel::Decreasing.to_string(), "decreasing");
    }

    #[test]
    fn test_single_period_groups_are_omitted() {
        let trends = extract_trends(&[
            summary("once", 2020, 1.0),
            summary("twice", 2020, 1.0),
            summary("twice", 2022, 2.0),
        ]);
        assert!(!trends.contains_key("once"));
        assert_eq!(trends["twice"].periods, 2);
        assert_relative_eq!(trends["twice"].slope, 0.5);
    }

    #[test]
    fn test_fit_reports_regression_statistics() {
        let summaries = [2.0, 4.0, 5.0, 4.0, 5.0]
            .iter()
            .zip(2019..)
            .map(|(mean, period)| summary("A00", period, *mean))
            .collect::<Vec<_>>();
        let trend = &extract_trends(&summaries)["A00"];
        assert_relative_eq!(trend.slope, 0.6, epsilon = 1e-9);
        assert_relative_eq!(trend.r_squared, 0.6, epsilon = 1e-9);
        assert_relative_eq!(trend.p_value, 0.124_027, epsilon = 1e-5);
        assert_eq!(trend.label, TrendLabel::Increasing);
    }

    #[test]
    fn test_summarize_by_period() {
        let records = vec![
            MetricRecord::new("B00", Some(2021)).with("cutoff", 24.0),
            MetricRecord::new("A00", Some(2021)).with("cutoff", 20.0),
            MetricRecord::new("A00", Some(2021)).with("cutoff", 22.0),
            MetricRecord::new("A00", Some(2020)).with("cutoff", 19.0),
            MetricRecord::new("A00", None).with("cutoff", 99.0),
        ];
        let summaries = summarize_by_period(&records, "cutoff").unwrap();
        let keys = summaries
            .iter()
            .map(|s| (s.period, s.group.as_str(), s.count))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![(2020, "A00", 1), (2021, "A00", 2), (2021, "B00", 1)]
        );
        assert_eq!(summaries[1].mean, 21.0);
        assert_relative_eq!(summaries[1].std_dev.unwrap(), 2.0_f64.sqrt());
        assert_eq!(summaries[0].std_dev, None);
    }
}
