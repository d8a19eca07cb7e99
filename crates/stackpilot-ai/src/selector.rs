//! Ranking settled candidates.
//!
//! A [`Selector`] narrows a list of [`BoardFeatures`] down to the indices of
//! the best candidates. Two strategies are provided:
//!
//! - [`CascadeSelector`] applies single-metric filters in order, each keeping
//!   only the candidates with the best value of its metric.
//! - [`WeightedSumSelector`] folds every metric into one scaled weight and
//!   falls back to a cascade for candidates with equal weight.
//!
//! Neither picks a single winner; that is left to the
//! [`TieBreaker`](crate::tie_break::TieBreaker).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{board_analysis::BoardFeatures, config::ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[display("score-delta")]
    ScoreDelta,
    #[display("holes")]
    Holes,
    #[display("bottom-row-holes")]
    BottomRowHoles,
    #[display("mean-height")]
    MeanHeight,
    #[display("height-variance")]
    HeightVariance,
    #[display("height-range")]
    HeightRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Goal {
    Maximize,
    Minimize,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::ScoreDelta,
        Metric::Holes,
        Metric::BottomRowHoles,
        Metric::MeanHeight,
        Metric::HeightVariance,
        Metric::HeightRange,
    ];

    /// Only the score is worth maximizing; every other metric is a penalty.
    #[must_use]
    pub const fn goal(self) -> Goal {
        match self {
            Metric::ScoreDelta => Goal::Maximize,
            Metric::Holes
            | Metric::BottomRowHoles
            | Metric::MeanHeight
            | Metric::HeightVariance
            | Metric::HeightRange => Goal::Minimize,
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn value(self, features: &BoardFeatures) -> f64 {
        match self {
            Metric::ScoreDelta => f64::from(features.score_delta),
            Metric::Holes => f64::from(features.holes),
            Metric::BottomRowHoles => f64::from(features.bottom_row_holes),
            Metric::MeanHeight => f64::from(features.mean_height),
            Metric::HeightVariance => features.height_variance as f64,
            Metric::HeightRange => f64::from(features.height_range),
        }
    }
}

/// Narrows candidates to the best-ranked subset.
pub trait Selector: fmt::Debug + Send + Sync {
    /// Indices into `features` of the best candidates, in ascending order.
    ///
    /// Non-empty whenever `features` is non-empty.
    fn select(&self, features: &[BoardFeatures]) -> Vec<usize>;
}

/// Keeps the indices whose `metric` value is the best among `indices`.
fn keep_best(metric: Metric, features: &[BoardFeatures], indices: &[usize]) -> Vec<usize> {
    if indices.len() <= 1 {
        return indices.to_vec();
    }
    let values: Vec<f64> = indices.iter().map(|&i| metric.value(&features[i])).collect();
    let best = values
        .iter()
        .copied()
        .reduce(|a, b| match metric.goal() {
            Goal::Maximize => a.max(b),
            Goal::Minimize => a.min(b),
        })
        .unwrap_or_default();
    indices
        .iter()
        .zip(&values)
        .filter(|(_, value)| value.total_cmp(&best).is_eq())
        .map(|(&i, _)| i)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeSelector {
    stages: Vec<Metric>,
}

impl Default for CascadeSelector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STAGES.to_vec())
    }
}

impl CascadeSelector {
    /// Score first, then structural damage, then the shape of the surface.
    pub const DEFAULT_STAGES: [Metric; 6] = [
        Metric::ScoreDelta,
        Metric::Holes,
        Metric::BottomRowHoles,
        Metric::HeightVariance,
        Metric::MeanHeight,
        Metric::HeightRange,
    ];

    #[must_use]
    pub fn new(stages: Vec<Metric>) -> Self {
        Self { stages }
    }

    #[must_use]
    pub fn stages(&self) -> &[Metric] {
        &self.stages
    }

    /// Runs every stage over `indices`, a subset of `features`' indices.
    #[must_use]
    pub fn narrow(&self, features: &[BoardFeatures], indices: Vec<usize>) -> Vec<usize> {
        self.stages
            .iter()
            .fold(indices, |kept, &metric| keep_best(metric, features, &kept))
    }

    /// The surviving indices after each stage, in stage order.
    #[must_use]
    pub fn stage_outputs(&self, features: &[BoardFeatures]) -> Vec<Vec<usize>> {
        let mut kept: Vec<usize> = (0..features.len()).collect();
        self.stages
            .iter()
            .map(|&metric| {
                kept = keep_best(metric, features, &kept);
                kept.clone()
            })
            .collect()
    }
}

impl Selector for CascadeSelector {
    fn select(&self, features: &[BoardFeatures]) -> Vec<usize> {
        self.narrow(features, (0..features.len()).collect())
    }
}

/// One term of a weighted sum: `coefficient * value / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WeightedTerm {
    pub metric: Metric,
    pub coefficient: f64,
    pub scale: f64,
}

impl WeightedTerm {
    #[must_use]
    pub const fn new(metric: Metric, coefficient: f64, scale: f64) -> Self {
        Self {
            metric,
            coefficient,
            scale,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(ConfigError::InvalidScale {
                metric: self.metric,
                scale: self.scale,
            });
        }
        if !self.coefficient.is_finite() {
            return Err(ConfigError::InvalidCoefficient {
                metric: self.metric,
                coefficient: self.coefficient,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn contribution(&self, features: &BoardFeatures) -> f64 {
        self.coefficient * self.metric.value(features) / self.scale
    }
}

/// Lower weight is better.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSumSelector {
    terms: Vec<WeightedTerm>,
    tie_break: CascadeSelector,
}

impl WeightedSumSelector {
    /// Scales approximate each metric's range on a 10×24 board. The score
    /// term is negative because score is a reward.
    pub const DEFAULT_TERMS: [WeightedTerm; 6] = [
        WeightedTerm::new(Metric::ScoreDelta, -1.0, 8.0),
        WeightedTerm::new(Metric::Holes, 1.0, 48.0),
        WeightedTerm::new(Metric::BottomRowHoles, 0.2, 10.0),
        WeightedTerm::new(Metric::MeanHeight, 0.6, 24.0),
        WeightedTerm::new(Metric::HeightVariance, 0.3, 14_400.0),
        WeightedTerm::new(Metric::HeightRange, 0.4, 24.0),
    ];

    pub fn new(terms: Vec<WeightedTerm>, tie_break: CascadeSelector) -> Result<Self, ConfigError> {
        for term in &terms {
            term.validate()?;
        }
        Ok(Self { terms, tie_break })
    }

    #[must_use]
    pub fn terms(&self) -> &[WeightedTerm] {
        &self.terms
    }

    #[must_use]
    pub fn weight(&self, features: &BoardFeatures) -> f64 {
        self.terms.iter().map(|term| term.contribution(features)).sum()
    }
}

impl Default for WeightedSumSelector {
    fn default() -> Self {
        Self {
            terms: Self::DEFAULT_TERMS.to_vec(),
            tie_break: CascadeSelector::default(),
        }
    }
}

impl Selector for WeightedSumSelector {
    fn select(&self, features: &[BoardFeatures]) -> Vec<usize> {
        let weights: Vec<f64> = features.iter().map(|f| self.weight(f)).collect();
        let Some(min) = weights.iter().copied().reduce(f64::min) else {
            return vec![];
        };
        let lightest = weights
            .iter()
            .enumerate()
            .filter(|(_, weight)| weight.total_cmp(&min).is_eq())
            .map(|(i, _)| i)
            .collect();
        self.tie_break.narrow(features, lightest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(holes: u32, height_range: u32, score_delta: f32) -> BoardFeatures {
        BoardFeatures {
            holes,
            height_range,
            score_delta,
            ..BoardFeatures::default()
        }
    }

    #[test]
    fn test_metric_goals() {
        assert!(Metric::ScoreDelta.goal().is_maximize());
        for metric in &Metric::ALL[1..] {
            assert!(metric.goal().is_minimize(), "{metric}");
        }
    }

    #[test]
    fn test_cascade_prefers_score_then_holes() {
        let candidates = [
            features(0, 0, 0.0),
            features(3, 0, 1.0),
            features(1, 2, 1.0),
            features(1, 1, 1.0),
        ];
        let selector = CascadeSelector::default();
        assert_eq!(selector.select(&candidates), vec![3]);
    }

    #[test]
    fn test_cascade_keeps_all_ties() {
        let candidates = [features(0, 1, 0.0), features(0, 1, 0.0), features(2, 1, 0.0)];
        assert_eq!(CascadeSelector::default().select(&candidates), vec![0, 1]);
    }

    #[test]
    fn test_cascade_stage_outputs_are_nonempty_subsets() {
        let candidates: Vec<_> = (0..40)
            .map(|i| features(i % 3, (i * 7) % 5, (i % 2) as f32))
            .collect();
        let selector = CascadeSelector::default();
        let outputs = selector.stage_outputs(&candidates);
        assert_eq!(outputs.len(), selector.stages().len());

        let mut previous: Vec<usize> = (0..candidates.len()).collect();
        for output in &outputs {
            assert!(!output.is_empty());
            assert!(output.iter().all(|i| previous.contains(i)));
            previous.clone_from(output);
        }
        assert_eq!(outputs.last().unwrap(), &selector.select(&candidates));
    }

    #[test]
    fn test_cascade_passes_through_small_inputs() {
        let selector = CascadeSelector::default();
        assert!(selector.select(&[]).is_empty());
        assert_eq!(selector.select(&[features(9, 9, 0.0)]), vec![0]);
    }

    #[test]
    fn test_custom_stage_order() {
        let candidates = [features(0, 3, 0.0), features(2, 0, 0.0)];
        let range_first = CascadeSelector::new(vec![Metric::HeightRange, Metric::Holes]);
        assert_eq!(range_first.select(&candidates), vec![1]);
        let holes_first = CascadeSelector::new(vec![Metric::Holes, Metric::HeightRange]);
        assert_eq!(holes_first.select(&candidates), vec![0]);
    }

    #[test]
    fn test_weighted_sum_prefers_lower_weight() {
        let selector = WeightedSumSelector::default();
        let candidates = [features(4, 0, 0.0), features(0, 0, 0.0), features(0, 0, 2.0)];
        assert!(selector.weight(&candidates[2]) < selector.weight(&candidates[1]));
        assert_eq!(selector.select(&candidates), vec![2]);
    }

    #[test]
    fn test_weighted_sum_falls_back_to_cascade() {
        // Only holes are weighted, so both candidates weigh the same.
        let selector = WeightedSumSelector::new(
            vec![WeightedTerm::new(Metric::Holes, 1.0, 1.0)],
            CascadeSelector::new(vec![Metric::HeightRange]),
        )
        .unwrap();
        let candidates = [features(1, 5, 0.0), features(1, 2, 0.0)];
        assert_eq!(selector.select(&candidates), vec![1]);
    }

    #[test]
    fn test_weighted_sum_rejects_bad_scales() {
        for scale in [0.0, f64::NAN, f64::INFINITY] {
            let result = WeightedSumSelector::new(
                vec![WeightedTerm::new(Metric::Holes, 1.0, scale)],
                CascadeSelector::default(),
            );
            assert!(matches!(result, Err(ConfigError::InvalidScale { .. })));
        }
        let result = WeightedSumSelector::new(
            vec![WeightedTerm::new(Metric::Holes, f64::NAN, 1.0)],
            CascadeSelector::default(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidCoefficient { .. })));
    }

    #[test]
    fn test_metric_serialization() {
        let json = serde_json::to_string(&CascadeSelector::DEFAULT_STAGES).unwrap();
        assert_eq!(
            json,
            r#"["score-delta","holes","bottom-row-holes","height-variance","mean-height","height-range"]"#
        );
    }
}
