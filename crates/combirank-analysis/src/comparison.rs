//! Significance tests between groups
//!
//! - Omnibus: one-way ANOVA across every group's sample
//! - Pairwise: Student's two-sample t test for each pair of groups, with the
//!   standardized effect size `|m1 - m2| / sqrt((v1 + v2) / 2)`
//! - Partition: the pairwise test between the two halves of each group's
//!   sample split by a two-valued key (e.g. region)
//!
//! A pair where either side has fewer than
//! [`MIN_SAMPLE_SIZE`](combirank_stats::hypothesis::MIN_SAMPLE_SIZE)
//! observations is not tested and does not appear in the result.

use std::collections::BTreeMap;

use combirank_stats::{
    descriptive,
    hypothesis::{self, OneWayAnova, TTest},
};
use serde::Serialize;

use crate::record::OutcomeRecord;

/// Significance level for every test in this module.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Two-sample comparison of group `a` against group `b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub group_a: String,
    pub group_b: String,
    pub mean_a: f64,
    pub mean_b: f64,
    /// t statistic; infinite when both samples have zero spread and
    /// different means
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub effect_size: f64,
}

/// One-way ANOVA across all groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmnibusComparison {
    pub statistic: f64,
    pub p_value: f64,
    pub significant: bool,
    pub df_between: f64,
    pub df_within: f64,
    /// Groups included in the test
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Absent when fewer than two groups or too few observations
    pub omnibus: Option<OmnibusComparison>,
    /// Tested pairs, `group_a < group_b`, ordered by `(group_a, group_b)`
    pub pairwise: Vec<PairwiseComparison>,
}

impl ComparisonResult {
    /// Looks up the comparison of two groups in either order.
    #[must_use]
    pub fn pair(&self, a: &str, b: &str) -> Option<&PairwiseComparison> {
        self.pairwise
            .iter()
            .find(|p| (p.group_a == a && p.group_b == b) || (p.group_a == b && p.group_b == a))
    }
}

/// Compares two samples, or returns `None` if either is too small.
#[must_use]
pub fn compare_pair(
    group_a: &str,
    a: &[f64],
    group_b: &str,
    b: &[f64],
) -> Option<PairwiseComparison> {
    let test = TTest::independent(a, b)?;
    Some(PairwiseComparison {
        group_a: group_a.to_owned(),
        group_b: group_b.to_owned(),
        mean_a: descriptive::mean(a)?,
        mean_b: descriptive::mean(b)?,
        statistic: test.statistic,
        p_value: test.p_value,
        significant: test.p_value < SIGNIFICANCE_LEVEL,
        effect_size: hypothesis::effect_size(a, b)?,
    })
}

/// Runs the omnibus test over all `samples`.
#[must_use]
pub fn omnibus(samples: &BTreeMap<String, Vec<f64>>) -> Option<OmnibusComparison> {
    let slices = samples.values().map(Vec::as_slice).collect::<Vec<_>>();
    let anova = OneWayAnova::new(&slices)?;
    Some(OmnibusComparison {
        statistic: anova.statistic,
        p_value: anova.p_value,
        significant: anova.p_value < SIGNIFICANCE_LEVEL,
        df_between: anova.df_between,
        df_within: anova.df_within,
        groups: samples.keys().cloned().collect(),
    })
}

/// Runs the omnibus test and every pairwise test over `samples`.
#[must_use]
pub fn compare_groups(samples: &BTreeMap<String, Vec<f64>>) -> ComparisonResult {
    let omnibus = omnibus(samples);
    if omnibus.is_none() {
        tracing::debug!(groups = samples.len(), "omnibus test not computable, omitted");
    }

    let entries = samples.iter().collect::<Vec<_>>();
    let mut pairwise = vec![];
    for (i, (group_a, a)) in entries.iter().enumerate() {
        for (group_b, b) in &entries[i + 1..] {
            match compare_pair(group_a, a, group_b, b) {
                Some(comparison) => pairwise.push(comparison),
                None => tracing::debug!(
                    group_a = group_a.as_str(),
                    group_b = group_b.as_str(),
                    "too few observations for a pairwise test, omitted"
                ),
            }
        }
    }

    ComparisonResult { omnibus, pairwise }
}

/// Pairwise test between the two partitions of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionComparison {
    pub group: String,
    /// `group_a`/`group_b` hold the partition values
    pub comparison: PairwiseComparison,
}

/// Compares the cutoff scores of partition `first` against `second` within
/// each group, keyed by the outcome's region.
///
/// Groups where either partition has too few outcomes are omitted.
#[must_use]
pub fn compare_partitions(
    outcomes: &[OutcomeRecord],
    first: &str,
    second: &str,
) -> Vec<PartitionComparison> {
    let mut split: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for outcome in outcomes {
        let (a, b) = split.entry(&outcome.group).or_default();
        if outcome.region == first {
            a.push(outcome.cutoff_score);
        } else if outcome.region == second {
            b.push(outcome.cutoff_score);
        }
    }

    split
        .into_iter()
        .filter_map(|(group, (a, b))| {
            let Some(comparison) = compare_pair(first, &a, second, &b) else {
                tracing::debug!(
                    group,
                    first = a.len(),
                    second = b.len(),
                    "too few observations in a partition, omitted"
                );
                return None;
            };
            Some(PartitionComparison {
                group: group.to_owned(),
                comparison,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(entries: &[(&str, &[f64])]) -> BTreeMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(g, v)| ((*g).to_owned(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_separated_groups_are_significant() {
        let result = compare_groups(&samples(&[("X", &[5.0, 5.0, 5.0]), ("Y", &[9.0, 9.0, 9.0])]));

        let omnibus = result.omnibus.as_ref().unwrap();
        assert!(omnibus.significant);
        assert_eq!(omnibus.groups, vec!["X".to_owned(), "Y".to_owned()]);

        let pair = result.pair("Y", "X").unwrap();
        assert!(pair.significant);
        assert!(pair.effect_size > 2.0);
        assert_eq!((pair.mean_a, pair.mean_b), (5.0, 9.0));
    }

    #[test]
    fn test_equal_samples_are_not_significant() {
        let pair = compare_pair("A", &[1.0, 2.0, 3.0], "B", &[1.0, 2.0, 3.0]).unwrap();
        assert!(!pair.significant);
        assert_eq!(pair.effect_size, 0.0);
        assert_eq!(pair.statistic, 0.0);
    }

    #[test]
    fn test_small_pairs_are_omitted() {
        let result = compare_groups(&samples(&[
            ("A", &[1.0, 2.0, 3.0]),
            ("B", &[4.0]),
            ("C", &[2.0, 3.0, 4.0]),
        ]));
        assert_eq!(result.pairwise.len(), 1);
        assert!(result.pair("A", "B").is_none());
        assert!(result.pair("A", "C").is_some());
        assert!(result.omnibus.is_some());
    }

    #[test]
    fn test_single_group_has_no_omnibus() {
        let result = compare_groups(&samples(&[("A", &[1.0, 2.0])]));
        assert!(result.omnibus.is_none());
        assert!(result.pairwise.is_empty());
    }

    #[test]
    fn test_partition_comparison() {
        let outcome = |group: &str, region: &str, cutoff_score: f64| OutcomeRecord {
            period: 2023,
            group: group.to_owned(),
            institution: String::new(),
            program: String::new(),
            region: region.to_owned(),
            cutoff_score,
            quota: 0,
        };
        let outcomes = vec![
            outcome("A00", "North", 25.0),
            outcome("A00", "North", 26.0),
            outcome("A00", "South", 22.0),
            outcome("A00", "South", 23.0),
            outcome("A00", "Central", 99.0),
            outcome("B00", "North", 20.0),
            outcome("B00", "South", 21.0),
            outcome("B00", "South", 22.0),
        ];
        let result = compare_partitions(&outcomes, "North", "South");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].group, "A00");
        assert_eq!(result[0].comparison.group_a, "North");
        assert_eq!(result[0].comparison.mean_a, 25.5);
        assert!(result[0].comparison.statistic > 0.0);
    }
}
