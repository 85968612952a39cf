//! Difficulty ranking and comparison of examination subject combinations
//!
//! This crate turns per-group metric records into ranked, tested and
//! clustered result tables. Every component is a pure function of its
//! inputs: nothing here reads files, keeps global state, or installs a
//! logger (events are emitted through `tracing` for the caller to collect).
//!
//! # Overview
//!
//! ```text
//! MetricRecord ──► Normalizer ──┬──► Composite Scorer ──► Ranker / Tiers
//!                               │            └──────────► Group Comparator
//!                               └──► Cluster Partitioner
//! time-indexed records ──► Trend Extractor
//! ```
//!
//! - [`record`]: Input rows and the generic [`record::MetricRecord`]
//! - [`normalization`]: Z-score standardization across groups
//! - [`scoring`]: Weighted composite difficulty index with explicit sign conventions
//! - [`ranking`]: Dense ranking and difficulty tiers
//! - [`trend`]: Per-period summaries and linear trend classification
//! - [`comparison`]: Omnibus and pairwise significance tests with effect sizes
//! - [`clustering`]: Seeded k-means partition with externally supplied labels
//! - [`popularity`]: Program counts and quotas per group
//! - [`pipeline`]: Runs every component over a [`record::Dataset`]
//!
//! # Errors
//!
//! Configuration problems abort with an [`AnalysisError`] before any score
//! is produced, as does an indicator that no group carries. Groups or pairs
//! without enough observations are left out of their result table instead
//! of failing the run; the pipeline lists such groups alongside the table.
//!
//! # Example
//!
//! ```
//! use combirank_analysis::{
//!     normalization::NormalizedFeatureSet,
//!     ranking::{TierScheme, rank_groups},
//!     record::MetricRecord,
//!     scoring::{CompositeScorer, Direction, FeatureWeights, GroupModifiers},
//! };
//!
//! let records = vec![
//!     MetricRecord::new("A00", None).with("mean_score", 6.1).with("cutoff", 25.0),
//!     MetricRecord::new("C00", None).with("mean_score", 7.4).with("cutoff", 21.5),
//!     MetricRecord::new("D01", None).with("mean_score", 6.8).with("cutoff", 23.0),
//! ];
//! let normalized = NormalizedFeatureSet::from_records(&records, &["mean_score", "cutoff"])?;
//!
//! let weights = FeatureWeights::new()
//!     .with("mean_score", 1.0, Direction::LowerIsHarder)
//!     .with("cutoff", 1.0, Direction::HigherIsHarder);
//! let scorer = CompositeScorer::new(weights, GroupModifiers::default())?;
//! let scores = scorer.score(&normalized.values)?;
//!
//! let ranked = rank_groups(&scores, &TierScheme::default())?;
//! assert_eq!(ranked[0].group, "A00");
//! assert_eq!(ranked[0].tier, "hard");
//! # Ok::<(), combirank_analysis::AnalysisError>(())
//! ```

pub mod clustering;
pub mod comparison;
pub mod normalization;
pub mod pipeline;
pub mod popularity;
pub mod ranking;
pub mod record;
pub mod scoring;
pub mod trend;

/// Errors that abort an analysis run.
///
/// Only configuration-level and malformed-input problems are represented
/// here; insufficient data for a single group or pair is reported by
/// omission from the affected result table.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("indicator '{indicator}' has no declared weight or sign convention")]
    UndeclaredIndicator { indicator: String },
    #[display("group '{group}' has no value for indicator '{indicator}'")]
    MissingIndicator { group: String, indicator: String },
    #[display("indicator '{indicator}' is not present for any group")]
    UnavailableIndicator { indicator: String },
    #[display("indicator '{indicator}' of group '{group}' is not finite ({value})")]
    NonFiniteValue {
        group: String,
        indicator: String,
        value: f64,
    },
    #[display("group '{group}' appears more than once in a per-group table")]
    DuplicateGroup { group: String },
    #[display("indicator '{indicator}' has invalid weight {weight}")]
    InvalidWeight { indicator: String, weight: f64 },
    #[display("group '{group}' has invalid modifier {modifier}")]
    InvalidModifier { group: String, modifier: f64 },
    #[display("invalid tier scheme: {reason}")]
    InvalidTierScheme { reason: String },
    #[display("cannot partition {available} groups into {requested} clusters")]
    InvalidClusterCount { requested: usize, available: usize },
}
