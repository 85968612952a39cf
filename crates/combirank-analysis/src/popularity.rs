//! Program counts and quotas per group

use std::collections::BTreeMap;

use combirank_stats::descriptive::DescriptiveStats;
use serde::Serialize;

use crate::record::OutcomeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularityRow {
    pub group: String,
    /// Number of outcome rows (programs admitting with this group)
    pub programs: usize,
    pub total_quota: u64,
    pub mean_cutoff: f64,
    /// Absent for a group with a single program
    pub std_cutoff: Option<f64>,
}

/// Summarizes `outcomes` per group, most programs first, ties by group code.
#[must_use]
pub fn popularity(outcomes: &[OutcomeRecord]) -> Vec<PopularityRow> {
    let mut groups: BTreeMap<&str, (Vec<f64>, u64)> = BTreeMap::new();
    for outcome in outcomes {
        let (cutoffs, quota) = groups.entry(&outcome.group).or_default();
        cutoffs.push(outcome.cutoff_score);
        *quota += u64::from(outcome.quota);
    }

    let mut rows = groups
        .into_iter()
        .filter_map(|(group, (cutoffs, total_quota))| {
            let stats = DescriptiveStats::new(cutoffs)?;
            Some(PopularityRow {
                group: group.to_owned(),
                programs: stats.count,
                total_quota,
                mean_cutoff: stats.mean,
                std_cutoff: stats.std_dev(),
            })
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.programs.cmp(&a.programs).then_with(|| a.group.cmp(&b.group)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(group: &str, cutoff_score: f64, quota: u32) -> OutcomeRecord {
        OutcomeRecord {
            period: 2023,
            group: group.to_owned(),
            institution: String::new(),
            program: String::new(),
            region: String::new(),
            cutoff_score,
            quota,
        }
    }

    #[test]
    fn test_orders_by_program_count() {
        let rows = popularity(&[
            outcome("D01", 20.0, 50),
            outcome("A00", 24.0, 100),
            outcome("A00", 26.0, 80),
            outcome("C00", 18.0, 30),
        ]);
        let order = rows.iter().map(|r| r.group.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["A00", "C00", "D01"]);
        assert_eq!(rows[0].programs, 2);
        assert_eq!(rows[0].total_quota, 180);
        assert_eq!(rows[0].mean_cutoff, 25.0);
        assert_eq!(rows[0].std_cutoff, Some(2.0_f64.sqrt()));
        assert_eq!(rows[1].std_cutoff, None);
    }
}
