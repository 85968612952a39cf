//! Weighted composite difficulty index
//!
//! ```text
//! score(g) = modifier(g) * Σ_i weight(i) * sign(i) * value(g, i)
//! ```
//!
//! The sign of every indicator is part of its declaration ([`Direction`]); it
//! is never inferred from the indicator's name. Weights need not sum to one,
//! so a score is only meaningful relative to the other groups of a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, normalization::FeatureTable};

/// How an indicator relates to difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger values mean a harder group (e.g. a cutoff score)
    HigherIsHarder,
    /// Smaller values mean a harder group (e.g. an average exam score)
    LowerIsHarder,
}

impl Direction {
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::HigherIsHarder => 1.0,
            Self::LowerIsHarder => -1.0,
        }
    }
}

/// Weight and sign convention of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeight {
    pub weight: f64,
    pub direction: Direction,
}

impl IndicatorWeight {
    #[must_use]
    pub fn signed(&self) -> f64 {
        self.weight * self.direction.sign()
    }
}

/// Declared indicators of a composite score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureWeights(BTreeMap<String, IndicatorWeight>);

impl FeatureWeights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, indicator: impl Into<String>, weight: f64, direction: Direction) -> Self {
        self.0
            .insert(indicator.into(), IndicatorWeight { weight, direction });
        self
    }

    #[must_use]
    pub fn get(&self, indicator: &str) -> Option<&IndicatorWeight> {
        self.0.get(indicator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorWeight)> + '_ {
        self.0.iter().map(|(name, weight)| (name.as_str(), weight))
    }

    pub fn indicators(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rejects negative or non-finite weights.
    ///
    /// A negative weight would silently flip the declared direction.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (indicator, weight) in &self.0 {
            if !weight.weight.is_finite() || weight.weight < 0.0 {
                return Err(AnalysisError::InvalidWeight {
                    indicator: indicator.clone(),
                    weight: weight.weight,
                });
            }
        }
        Ok(())
    }

    /// Fails unless every name in `indicators` has a declaration.
    pub fn require<S>(&self, indicators: &[S]) -> Result<(), AnalysisError>
    where
        S: AsRef<str>,
    {
        for indicator in indicators {
            let indicator = indicator.as_ref();
            if !self.0.contains_key(indicator) {
                return Err(AnalysisError::UndeclaredIndicator {
                    indicator: indicator.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Per-group multiplicative adjustment; unlisted groups use `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupModifiers(BTreeMap<String, f64>);

impl GroupModifiers {
    pub const DEFAULT: f64 = 1.0;

    #[must_use]
    pub fn with(mut self, group: impl Into<String>, modifier: f64) -> Self {
        self.0.insert(group.into(), modifier);
        self
    }

    #[must_use]
    pub fn get(&self, group: &str) -> f64 {
        self.0.get(group).copied().unwrap_or(Self::DEFAULT)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (group, modifier) in &self.0 {
            if !modifier.is_finite() {
                return Err(AnalysisError::InvalidModifier {
                    group: group.clone(),
                    modifier: *modifier,
                });
            }
        }
        Ok(())
    }
}

/// Computes composite scores from declared weights and group modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScorer {
    weights: FeatureWeights,
    modifiers: GroupModifiers,
}

impl CompositeScorer {
    pub fn new(weights: FeatureWeights, modifiers: GroupModifiers) -> Result<Self, AnalysisError> {
        weights.validate()?;
        modifiers.validate()?;
        Ok(Self { weights, modifiers })
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    /// Scores every group of `features`.
    ///
    /// Each declared indicator must be present and finite for each group,
    /// including indicators whose weight is zero. All groups are checked
    /// before any score is computed, so an error never comes with a partial
    /// result. Indicators present in `features` but not declared are
    /// ignored.
    pub fn score(&self, features: &FeatureTable) -> Result<BTreeMap<String, f64>, AnalysisError> {
        for (group, row) in features {
            for indicator in self.weights.indicators() {
                let value = row.get(indicator).copied().ok_or_else(|| {
                    AnalysisError::MissingIndicator {
                        group: group.clone(),
                        indicator: indicator.to_owned(),
                    }
                })?;
                if !value.is_finite() {
                    return Err(AnalysisError::NonFiniteValue {
                        group: group.clone(),
                        indicator: indicator.to_owned(),
                        value,
                    });
                }
            }
        }

        Ok(features
            .iter()
            .map(|(group, row)| {
                let sum = self
                    .weights
                    .iter()
                    .map(|(indicator, weight)| weight.signed() * row[indicator])
                    .sum::<f64>();
                (group.clone(), self.modifiers.get(group) * sum)
            })
            .collect())
    }
}
