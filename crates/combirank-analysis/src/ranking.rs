//! Dense ranking and difficulty tiers
//!
//! Groups are ordered by composite score, highest first. Ranking is dense:
//! tied scores share a rank and the next distinct score gets the next
//! integer (`1, 1, 2`, never `1, 1, 3`).
//!
//! Tiers come from a [`TierScheme`]. The default splits the observed score
//! range into equal-width bins labeled `easy`, `medium`, `hard` in
//! ascending score order; a score on an inner edge takes the lower tier.

use std::collections::BTreeMap;

use combirank_stats::binning::EqualWidthBins;
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// One tier boundary of [`TierScheme::Thresholds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCutoff {
    /// Inclusive lower bound of the tier
    pub min: f64,
    pub label: String,
}

/// How scores are assigned to tier labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierScheme {
    /// Equal-width bins over the observed score range, one per label,
    /// labels given from lowest to highest score
    EqualWidth { labels: Vec<String> },
    /// Fixed cutoffs in strictly descending order of `min`; a score takes
    /// the label of the first cutoff it reaches, or `below` if none
    Thresholds {
        cutoffs: Vec<TierCutoff>,
        below: String,
    },
}

impl Default for TierScheme {
    fn default() -> Self {
        Self::EqualWidth {
            labels: ["easy", "medium", "hard"].map(String::from).to_vec(),
        }
    }
}

impl TierScheme {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |reason: &str| {
            Err(AnalysisError::InvalidTierScheme {
                reason: reason.to_owned(),
            })
        };
        match self {
            Self::EqualWidth { labels } => {
                if labels.is_empty() {
                    return invalid("equal-width scheme needs at least one label");
                }
            }
            Self::Thresholds { cutoffs, .. } => {
                if cutoffs.iter().any(|c| !c.min.is_finite()) {
                    return invalid("threshold cutoffs must be finite");
                }
                if cutoffs.windows(2).any(|w| w[0].min <= w[1].min) {
                    return invalid("threshold cutoffs must be strictly descending");
                }
            }
        }
        Ok(())
    }
}

/// A group's position in the difficulty ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub group: String,
    pub score: f64,
    /// Dense rank, `1` for the highest score
    pub rank: usize,
    pub tier: String,
}

/// Ranks `scores` and assigns tiers.
///
/// The result is ordered by rank; tied groups are ordered by group code.
pub fn rank_groups(
    scores: &BTreeMap<String, f64>,
    tiers: &TierScheme,
) -> Result<Vec<RankedGroup>, AnalysisError> {
    tiers.validate()?;
    if let Some((group, score)) = scores.iter().find(|(_, s)| !s.is_finite()) {
        return Err(AnalysisError::NonFiniteValue {
            group: group.clone(),
            indicator: "score".to_owned(),
            value: *score,
        });
    }

    let mut ordered = scores.iter().collect::<Vec<_>>();
    ordered.sort_by(|(ga, sa), (gb, sb)| sb.total_cmp(sa).then_with(|| ga.cmp(gb)));

    let bins = match tiers {
        TierScheme::EqualWidth { labels } => EqualWidthBins::new(scores.values().copied(), labels.len()),
        TierScheme::Thresholds { .. } => None,
    };
    let tier_of = |score: f64| -> String {
        match tiers {
            TierScheme::EqualWidth { labels } => bins
                .as_ref()
                .map_or_else(String::new, |bins| labels[bins.bin_of(score)].clone()),
            TierScheme::Thresholds { cutoffs, below } => cutoffs
                .iter()
                .find(|c| score >= c.min)
                .map_or_else(|| below.clone(), |c| c.label.clone()),
        }
    };

    let mut ranked = Vec::with_capacity(ordered.len());
    let mut rank = 0;
    let mut previous: Option<f64> = None;
    for (group, &score) in ordered {
        if previous != Some(score) {
            rank += 1;
            previous = Some(score);
        }
        ranked.push(RankedGroup {
            group: group.clone(),
            score,
            rank,
            tier: tier_of(score),
        });
    }
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn scores(values: &[(&str, f64)]) -> BTreeMap<String, f64> {
        values.iter().map(|(g, s)| ((*g).to_owned(), *s)).collect()
    }

    #[test]
    fn test_dense_rank_with_ties() {
        let ranked = rank_groups(
            &scores(&[("A", 2.0), ("B", 3.0), ("C", 3.0), ("D", 1.0)]),
            &TierScheme::default(),
        )
        .unwrap();
        let ranks = ranked
            .iter()
            .map(|r| (r.group.as_str(), r.rank))
            .collect::<Vec<_>>();
        assert_eq!(ranks, vec![("B", 1), ("C", 1), ("A", 2), ("D", 3)]);
    }

    #[test]
    fn test_equal_width_tiers() {
        let ranked = rank_groups(
            &scores(&[("A", 0.0), ("B", 1.0), ("C", 1.5), ("D", 3.0)]),
            &TierScheme::default(),
        )
        .unwrap();
        let tiers = ranked
            .iter()
            .map(|r| (r.group.as_str(), r.tier.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            tiers,
            vec![("D", "hard"), ("C", "medium"), ("B", "easy"), ("A", "easy")]
        );
    }

    #[test]
    fn test_score_on_inner_edge_takes_lower_tier() {
        let ranked = rank_groups(
            &scores(&[("A", 0.0), ("B", 1.0), ("C", 3.0)]),
            &TierScheme::default(),
        )
        .unwrap();
        let tier = |group: &str| {
            ranked
                .iter()
                .find(|r| r.group == group)
                .map(|r| r.tier.as_str())
                .unwrap()
        };
        assert_eq!(tier("A"), "easy");
        assert_eq!(tier("B"), "easy");
        assert_eq!(tier("C"), "hard");
    }

    #[test]
    fn test_identical_scores_share_middle_tier() {
        let ranked = rank_groups(&scores(&[("A", 0.5), ("B", 0.5)]), &TierScheme::default()).unwrap();
        assert!(ranked.iter().all(|r| r.rank == 1 && r.tier == "medium"));
    }

    #[test]
    fn test_threshold_tiers() {
        let scheme = TierScheme::Thresholds {
            cutoffs: vec![
                TierCutoff { min: 7.5, label: "very hard".into() },
                TierCutoff { min: 6.0, label: "hard".into() },
                TierCutoff { min: 4.5, label: "medium".into() },
            ],
            below: "easy".into(),
        };
        let ranked = rank_groups(
            &scores(&[("A", 7.5), ("B", 6.1), ("C", 4.5), ("D", 1.0)]),
            &scheme,
        )
        .unwrap();
        let tiers = ranked.iter().map(|r| r.tier.as_str()).collect::<Vec<_>>();
        assert_eq!(tiers, vec!["very hard", "hard", "medium", "easy"]);
    }

    #[test]
    fn test_invalid_schemes_are_rejected() {
        let empty = TierScheme::EqualWidth { labels: vec![] };
        assert!(matches!(
            rank_groups(&scores(&[("A", 1.0)]), &empty),
            Err(AnalysisError::InvalidTierScheme { .. })
        ));

        let unordered = TierScheme::Thresholds {
            cutoffs: vec![
                TierCutoff { min: 1.0, label: "a".into() },
                TierCutoff { min: 2.0, label: "b".into() },
            ],
            below: "c".into(),
        };
        assert!(unordered.validate().is_err());
    }

    #[test]
    fn test_empty_scores_give_empty_ranking() {
        let ranked = rank_groups(&BTreeMap::new(), &TierScheme::default()).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_scheme_deserializes_from_json() {
        let scheme: TierScheme =
            serde_json::from_str(r#"{ "equal_width": { "labels": ["low", "high"] } }"#).unwrap();
        assert_eq!(
            scheme,
            TierScheme::EqualWidth {
                labels: vec!["low".into(), "high".into()]
            }
        );
    }

    proptest! {
        #[test]
        fn prop_ranks_are_dense(values in prop::collection::vec(0_u8..6, 1..24)) {
            let scores = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("g{i:02}"), f64::from(*v)))
                .collect::<BTreeMap<_, _>>();
            let ranked = rank_groups(&scores, &TierScheme::default()).unwrap();

            prop_assert_eq!(ranked[0].rank, 1);
            for pair in ranked.windows(2) {
                if pair[0].score == pair[1].score {
                    prop_assert_eq!(pair[0].rank, pair[1].rank);
                } else {
                    prop_assert!(pair[0].score > pair[1].score);
                    prop_assert_eq!(pair[0].rank + 1, pair[1].rank);
                }
            }
        }
    }
}
