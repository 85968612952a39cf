//! End-to-end analysis of a [`Dataset`]
//!
//! [`run`] validates the whole [`AnalysisConfig`] first and then derives every
//! result table:
//!
//! | Table              | Source rows   | Metric                          |
//! |--------------------|---------------|---------------------------------|
//! | popularity         | outcomes      | cutoff score, quota             |
//! | period summaries   | outcomes      | cutoff score per period         |
//! | trends             | summaries     | slope of the period means       |
//! | group comparison   | outcomes      | cutoff score samples            |
//! | partitions         | outcomes      | cutoff score split by region    |
//! | difficulty ranking | group features| configured weighted indicators  |
//! | clusters           | group features| configured clustering indicators|
//!
//! Group features are the per-group averages of the distribution rows plus
//! the group's mean cutoff score. A group lacking any indicator a stage needs
//! (typically one without outcome rows) is left out of that stage and listed
//! in its `omitted` field. An indicator that no group carries fails the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    AnalysisError,
    clustering::{ClusterConfig, ClusterPartitioner},
    comparison::{self, ComparisonResult, PartitionComparison},
    normalization::{FeatureTable, NormalizedFeatureSet},
    popularity::{self, PopularityRow},
    ranking::{self, TierScheme},
    record::{self, Dataset, MetricRecord, indicator},
    scoring::{CompositeScorer, Direction, FeatureWeights, GroupModifiers},
    trend::{self, PeriodSummary, TrendResult},
};

/// Configuration of the difficulty ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Weight and sign convention of every scored indicator
    pub indicators: FeatureWeights,
    /// Indicators standardized before scoring; the rest are scored raw
    pub normalized: Vec<String>,
    pub modifiers: GroupModifiers,
    pub tiers: TierScheme,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        let indicators = FeatureWeights::new()
            .with(indicator::MEAN_SCORE, 1.0, Direction::LowerIsHarder)
            .with(indicator::SCORE_STD_DEV, 1.0, Direction::HigherIsHarder)
            .with(indicator::MEAN_CUTOFF, 1.0, Direction::HigherIsHarder);
        let normalized = indicators.indicators().map(String::from).collect();
        Self {
            indicators,
            normalized,
            modifiers: GroupModifiers::default(),
            tiers: TierScheme::default(),
        }
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.indicators.validate()?;
        self.indicators.require(&self.normalized)?;
        self.modifiers.validate()?;
        self.tiers.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub difficulty: DifficultyConfig,
    pub clustering: ClusterConfig,
    /// The two region values compared within each group, if any
    pub regions: Option<[String; 2]>,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.difficulty.validate()?;
        ClusterPartitioner::new(self.clustering.clone())?;
        Ok(())
    }
}

/// Per-group averages of the distribution rows, with the mean cutoff score
/// added for groups that have outcome rows.
pub fn group_features(dataset: &Dataset) -> Result<Vec<MetricRecord>, AnalysisError> {
    let averaged = record::average_by_group(
        &dataset.distribution_records(),
        &[
            indicator::MEAN_SCORE,
            indicator::SCORE_STD_DEV,
            indicator::PARTICIPANTS,
            indicator::PASS_RATE,
        ],
    )?;
    let cutoffs = record::average_by_group(&dataset.outcome_records(), &[indicator::CUTOFF_SCORE])?
        .into_iter()
        .filter_map(|r| Some((r.group.clone(), r.value(indicator::CUTOFF_SCORE)?)))
        .collect::<BTreeMap<_, _>>();

    Ok(averaged
        .into_iter()
        .map(|record| match cutoffs.get(&record.group) {
            Some(cutoff) => record.with(indicator::MEAN_CUTOFF, *cutoff),
            None => record,
        })
        .collect())
}

/// Splits `records` into those carrying every indicator and the groups left
/// out.
///
/// Fails if an indicator is carried by none of the records.
fn complete_records<S>(
    records: &[MetricRecord],
    indicators: &[S],
    stage: &str,
) -> Result<(Vec<MetricRecord>, Vec<String>), AnalysisError>
where
    S: AsRef<str>,
{
    if records.is_empty() {
        return Ok((vec![], vec![]));
    }
    if let Some(absent) = indicators
        .iter()
        .map(AsRef::<str>::as_ref)
        .find(|i| records.iter().all(|record| record.value(i).is_none()))
    {
        return Err(AnalysisError::UnavailableIndicator {
            indicator: absent.to_owned(),
        });
    }

    let mut complete = vec![];
    let mut omitted = vec![];
    for record in records {
        let missing = indicators
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|i| record.value(i).is_none());
        match missing {
            Some(missing) => {
                tracing::warn!(
                    stage,
                    group = record.group.as_str(),
                    indicator = missing,
                    "group lacks an indicator, omitted"
                );
                omitted.push(record.group.clone());
            }
            None => complete.push(record.clone()),
        }
    }
    Ok((complete, omitted))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyRow {
    pub group: String,
    /// Indicator values as scored (standardized where configured)
    pub features: BTreeMap<String, f64>,
    pub score: f64,
    pub rank: usize,
    pub tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DifficultyRanking {
    /// Ordered by rank
    pub rows: Vec<DifficultyRow>,
    /// Standardized indicators without spread
    pub degenerate: Vec<String>,
    /// Groups lacking a scored indicator, not ranked
    pub omitted: Vec<String>,
}

/// Standardizes, scores, ranks and tiers `features`.
///
/// Groups lacking a scored indicator are listed in
/// [`DifficultyRanking::omitted`]; an indicator no group carries is an
/// error.
pub fn difficulty_ranking(
    features: &[MetricRecord],
    config: &DifficultyConfig,
) -> Result<DifficultyRanking, AnalysisError> {
    config.validate()?;
    let indicators = config
        .indicators
        .indicators()
        .map(String::from)
        .collect::<Vec<_>>();
    let (records, omitted) = complete_records(features, &indicators, "difficulty")?;
    let normalized = NormalizedFeatureSet::from_records(&records, &config.normalized)?;

    let mut table = FeatureTable::new();
    for record in &records {
        let mut row = BTreeMap::new();
        for indicator in &indicators {
            let value = match normalized.get(&record.group, indicator) {
                Some(z) => z,
                None => record.require(indicator)?,
            };
            row.insert(indicator.clone(), value);
        }
        table.insert(record.group.clone(), row);
    }

    let scorer = CompositeScorer::new(config.indicators.clone(), config.modifiers.clone())?;
    let scores = scorer.score(&table)?;
    let rows = ranking::rank_groups(&scores, &config.tiers)?
        .into_iter()
        .map(|ranked| DifficultyRow {
            features: table.remove(&ranked.group).unwrap_or_default(),
            group: ranked.group,
            score: ranked.score,
            rank: ranked.rank,
            tier: ranked.tier,
        })
        .collect();

    Ok(DifficultyRanking {
        rows,
        degenerate: normalized.degenerate,
        omitted,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRow {
    pub group: String,
    pub cluster: usize,
    pub label: String,
    /// Raw (unstandardized) clustering indicators
    pub features: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterSummary {
    /// Ordered by group code
    pub rows: Vec<ClusterRow>,
    /// Centroids in standardized space, indexed by cluster id; coordinates
    /// follow the configured clustering indicators
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub degenerate: Vec<String>,
    /// Groups lacking a clustering indicator, not clustered
    pub omitted: Vec<String>,
}

/// Standardizes the clustering indicators of `features` and partitions the
/// groups.
pub fn cluster_groups(
    features: &[MetricRecord],
    config: &ClusterConfig,
) -> Result<ClusterSummary, AnalysisError> {
    let partitioner = ClusterPartitioner::new(config.clone())?;
    let (records, omitted) = complete_records(features, &config.indicators, "clustering")?;
    let normalized = NormalizedFeatureSet::from_records(&records, &config.indicators)?;
    let partition = partitioner.partition(&normalized)?;

    let raw = records
        .into_iter()
        .map(|record| (record.group, record.values))
        .collect::<BTreeMap<_, _>>();
    let rows = partition
        .assignments
        .into_iter()
        .map(|assignment| {
            let features = raw
                .get(&assignment.group)
                .map(|values| {
                    config
                        .indicators
                        .iter()
                        .filter_map(|i| Some((i.clone(), *values.get(i)?)))
                        .collect()
                })
                .unwrap_or_default();
            ClusterRow {
                group: assignment.group,
                cluster: assignment.cluster,
                label: assignment.label,
                features,
            }
        })
        .collect();

    Ok(ClusterSummary {
        rows,
        centroids: partition.centroids,
        inertia: partition.inertia,
        degenerate: normalized.degenerate,
        omitted,
    })
}

/// Every result table of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub popularity: Vec<PopularityRow>,
    pub period_summaries: Vec<PeriodSummary>,
    /// Groups with too few periods are absent
    pub trends: BTreeMap<String, TrendResult>,
    pub comparison: ComparisonResult,
    /// Empty unless regions are configured
    pub partitions: Vec<PartitionComparison>,
    pub difficulty: DifficultyRanking,
    pub clusters: ClusterSummary,
}

/// Runs every analysis over `dataset`.
///
/// The configuration is validated before any table is computed.
pub fn run(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    tracing::info!(
        combinations = dataset.combinations.len(),
        outcomes = dataset.outcomes.len(),
        distributions = dataset.distributions.len(),
        "starting analysis"
    );

    let outcomes = dataset.outcome_records();

    let popularity = popularity::popularity(&dataset.outcomes);
    tracing::info!(groups = popularity.len(), "popularity computed");

    let period_summaries = trend::summarize_by_period(&outcomes, indicator::CUTOFF_SCORE)?;
    let trends = trend::extract_trends(&period_summaries);
    tracing::info!(
        summaries = period_summaries.len(),
        trends = trends.len(),
        "trends extracted"
    );

    let samples = record::samples_by_group(&outcomes, indicator::CUTOFF_SCORE)?;
    let comparison = comparison::compare_groups(&samples);
    let partitions = config
        .regions
        .as_ref()
        .map(|[first, second]| comparison::compare_partitions(&dataset.outcomes, first, second))
        .unwrap_or_default();
    tracing::info!(
        pairs = comparison.pairwise.len(),
        partitions = partitions.len(),
        "groups compared"
    );

    let features = group_features(dataset)?;
    let difficulty = difficulty_ranking(&features, &config.difficulty)?;
    tracing::info!(groups = difficulty.rows.len(), "difficulty ranked");

    let clusters = cluster_groups(&features, &config.clustering)?;
    tracing::info!(groups = clusters.rows.len(), "groups clustered");

    Ok(AnalysisReport {
        popularity,
        period_summaries,
        trends,
        comparison,
        partitions,
        difficulty,
        clusters,
    })
}
