//! Partition of groups into clusters of similar standardized profiles
//!
//! Wraps the seeded k-means of [`combirank_stats::kmeans`]. Cluster ids are
//! only meaningful within one run; human-readable names are looked up in a
//! caller-supplied [`ClusterLabels`] table and fall back to the id.

use std::collections::BTreeMap;

use combirank_stats::kmeans::KMeans;
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, normalization::NormalizedFeatureSet, record::indicator};

/// Cluster id → display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabels(BTreeMap<usize, String>);

impl ClusterLabels {
    #[must_use]
    pub fn with(mut self, cluster: usize, label: impl Into<String>) -> Self {
        self.0.insert(cluster, label.into());
        self
    }

    /// The registered label of `cluster`, or the id itself.
    #[must_use]
    pub fn label_for(&self, cluster: usize) -> String {
        self.0
            .get(&cluster)
            .cloned()
            .unwrap_or_else(|| cluster.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub k: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub restarts: usize,
    /// Indicators standardized and clustered on
    pub indicators: Vec<String>,
    pub labels: ClusterLabels,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let kmeans = KMeans::new(3);
        Self {
            k: kmeans.k,
            seed: kmeans.seed,
            max_iterations: kmeans.max_iterations,
            restarts: kmeans.restarts,
            indicators: [
                indicator::MEAN_SCORE,
                indicator::SCORE_STD_DEV,
                indicator::PARTICIPANTS,
                indicator::PASS_RATE,
                indicator::MEAN_CUTOFF,
            ]
            .map(String::from)
            .to_vec(),
            labels: ClusterLabels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    pub group: String,
    pub cluster: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPartition {
    /// One entry per group, ordered by group code
    pub assignments: Vec<ClusterAssignment>,
    /// Centroids in standardized space, indexed by cluster id; coordinates
    /// follow [`ClusterConfig::indicators`]
    pub centroids: Vec<Vec<f64>>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPartitioner {
    config: ClusterConfig,
}

impl ClusterPartitioner {
    pub fn new(config: ClusterConfig) -> Result<Self, AnalysisError> {
        if config.k == 0 {
            return Err(AnalysisError::InvalidClusterCount {
                requested: 0,
                available: 0,
            });
        }
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Clusters the groups of `features` on the configured indicators.
    ///
    /// Other indicators of `features` are ignored. Fails if a configured
    /// indicator was not standardized or there are fewer groups than
    /// clusters.
    pub fn partition(
        &self,
        features: &NormalizedFeatureSet,
    ) -> Result<ClusterPartition, AnalysisError> {
        if let Some(absent) = self
            .config
            .indicators
            .iter()
            .find(|i| !features.params.contains_key(i.as_str()))
        {
            return Err(AnalysisError::UnavailableIndicator {
                indicator: absent.clone(),
            });
        }
        let invalid = || AnalysisError::InvalidClusterCount {
            requested: self.config.k,
            available: features.len(),
        };
        if self.config.k > features.len() {
            return Err(invalid());
        }

        let groups = features.groups().collect::<Vec<_>>();
        let points = groups
            .iter()
            .filter_map(|group| {
                self.config
                    .indicators
                    .iter()
                    .map(|i| features.get(group, i))
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Vec<_>>();
        let kmeans = KMeans {
            k: self.config.k,
            seed: self.config.seed,
            max_iterations: self.config.max_iterations,
            restarts: self.config.restarts,
            ..KMeans::new(self.config.k)
        };
        let fit = kmeans.fit(&points).ok_or_else(invalid)?;
        tracing::debug!(
            k = self.config.k,
            groups = groups.len(),
            inertia = fit.inertia,
            iterations = fit.iterations,
            "clustered groups"
        );

        let assignments = groups
            .into_iter()
            .zip(fit.labels)
            .map(|(group, cluster)| ClusterAssignment {
                group: group.to_owned(),
                cluster,
                label: self.config.labels.label_for(cluster),
            })
            .collect();

        Ok(ClusterPartition {
            assignments,
            centroids: fit.centroids,
            inertia: fit.inertia,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricRecord;

    fn features() -> NormalizedFeatureSet {
        let rows = [
            ("A00", 1.0, 1.0),
            ("A01", 1.2, 0.9),
            ("B00", 5.0, 5.1),
            ("B08", 5.2, 4.9),
            ("C00", 9.0, 1.0),
            ("C03", 9.1, 1.2),
        ];
        let records = rows
            .iter()
            .map(|(g, x, y)| MetricRecord::new(*g, None).with("x", *x).with("y", *y))
            .collect::<Vec<_>>();
        NormalizedFeatureSet::from_records(&records, &["x", "y"]).unwrap()
    }

    fn config(k: usize) -> ClusterConfig {
        ClusterConfig {
            k,
            indicators: vec!["x".into(), "y".into()],
            ..ClusterConfig::default()
        }
    }

    #[test]
    fn test_separates_obvious_clusters() {
        let partition = ClusterPartitioner::new(config(3))
            .unwrap()
            .partition(&features())
            .unwrap();
        let cluster = |group: &str| {
            partition
                .assignments
                .iter()
                .find(|a| a.group == group)
                .map(|a| a.cluster)
                .unwrap()
        };
        assert_eq!(cluster("A00"), cluster("A01"));
        assert_eq!(cluster("B00"), cluster("B08"));
        assert_eq!(cluster("C00"), cluster("C03"));
        assert_ne!(cluster("A00"), cluster("B00"));
        assert_ne!(cluster("A00"), cluster("C00"));
        assert_ne!(cluster("B00"), cluster("C00"));
        assert_eq!(partition.centroids.len(), 3);
    }

    #[test]
    fn test_is_deterministic_for_a_seed() {
        let partitioner = ClusterPartitioner::new(config(2)).unwrap();
        let first = partitioner.partition(&features()).unwrap();
        let second = partitioner.partition(&features()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_labels_fall_back_to_cluster_id() {
        let mut config = config(3);
        config.labels = ClusterLabels::default().with(0, "low");
        let partition = ClusterPartitioner::new(config)
            .unwrap()
            .partition(&features())
            .unwrap();
        for assignment in &partition.assignments {
            let expected = if assignment.cluster == 0 {
                "low".to_owned()
            } else {
                assignment.cluster.to_string()
            };
            assert_eq!(assignment.label, expected);
        }
    }

    #[test]
    fn test_rejects_invalid_cluster_counts() {
        assert!(ClusterPartitioner::new(config(0)).is_err());
        let result = ClusterPartitioner::new(config(7))
            .unwrap()
            .partition(&features());
        assert_eq!(
            result,
            Err(AnalysisError::InvalidClusterCount {
                requested: 7,
                available: 6,
            })
        );
    }

    #[test]
    fn test_clusters_only_on_configured_indicators() {
        let records = [
            ("A00", 1.0, 100.0),
            ("A01", 1.1, -50.0),
            ("B00", 9.0, 100.0),
            ("B08", 9.2, -50.0),
        ]
        .iter()
        .map(|(g, x, noise)| MetricRecord::new(*g, None).with("x", *x).with("noise", *noise))
        .collect::<Vec<_>>();
        let features = NormalizedFeatureSet::from_records(&records, &["x", "noise"]).unwrap();
        let config = ClusterConfig {
            k: 2,
            indicators: vec!["x".into()],
            ..ClusterConfig::default()
        };
        let partition = ClusterPartitioner::new(config)
            .unwrap()
            .partition(&features)
            .unwrap();
        let clusters = partition
            .assignments
            .iter()
            .map(|a| a.cluster)
            .collect::<Vec<_>>();
        assert_eq!(clusters[0], clusters[1]);
        assert_eq!(clusters[2], clusters[3]);
        assert_ne!(clusters[0], clusters[2]);
        assert!(partition.centroids.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_unstandardized_indicator_is_rejected() {
        let mut config = config(2);
        config.indicators.push("z".into());
        assert_eq!(
            ClusterPartitioner::new(config).unwrap().partition(&features()),
            Err(AnalysisError::UnavailableIndicator {
                indicator: "z".into()
            })
        );
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ClusterConfig =
            serde_json::from_str(r#"{ "k": 2, "labels": { "0": "hard", "1": "easy" } }"#).unwrap();
        assert_eq!(config.k, 2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.labels.label_for(1), "easy");
        assert_eq!(config.labels.label_for(2), "2");
        assert_eq!(config.indicators.len(), 5);
    }
}
