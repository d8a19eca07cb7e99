//! Serializable engine configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration:
//!
//! ```json
//! {
//!   "selector": { "kind": "cascade", "stages": ["score-delta", "holes", "height-range"] },
//!   "tie_break": { "policy": "seeded", "seed": 7 },
//!   "lookahead_depth": 1
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    decision_engine::DecisionEngine,
    lookahead::MAX_LOOKAHEAD_DEPTH,
    selector::{CascadeSelector, Metric, Selector, WeightedSumSelector, WeightedTerm},
    tie_break::TieBreak,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("scale of {metric} must be finite and non-zero, got {scale}")]
    InvalidScale { metric: Metric, scale: f64 },
    #[display("coefficient of {metric} must be finite, got {coefficient}")]
    InvalidCoefficient { metric: Metric, coefficient: f64 },
    #[display("lookahead depth must be at most {max}, got {depth}")]
    LookaheadTooDeep { depth: u8, max: u8 },
    #[display("max_candidates must be at least 1")]
    ZeroMaxCandidates,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SelectorConfig {
    Cascade {
        stages: Vec<Metric>,
    },
    WeightedSum {
        terms: Vec<WeightedTerm>,
        /// Cascade applied among candidates of equal weight.
        tie_break_stages: Vec<Metric>,
    },
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig::Cascade {
            stages: CascadeSelector::DEFAULT_STAGES.to_vec(),
        }
    }
}

impl SelectorConfig {
    /// The default weighted-sum selector, as a starting point for tuning.
    #[must_use]
    pub fn default_weighted_sum() -> Self {
        SelectorConfig::WeightedSum {
            terms: WeightedSumSelector::DEFAULT_TERMS.to_vec(),
            tie_break_stages: CascadeSelector::DEFAULT_STAGES.to_vec(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn Selector>, ConfigError> {
        let selector: Box<dyn Selector> = match self {
            SelectorConfig::Cascade { stages } => Box::new(CascadeSelector::new(stages.clone())),
            SelectorConfig::WeightedSum {
                terms,
                tie_break_stages,
            } => Box::new(WeightedSumSelector::new(
                terms.clone(),
                CascadeSelector::new(tie_break_stages.clone()),
            )?),
        };
        Ok(selector)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selector: SelectorConfig,
    pub tie_break: TieBreak,
    /// 0 disables the lookahead; at most [`MAX_LOOKAHEAD_DEPTH`].
    pub lookahead_depth: u8,
    /// Simulate candidates in parallel. Decisions are identical either way.
    pub parallel: bool,
    /// Cap on enumerated candidates per decision.
    pub max_candidates: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selector: SelectorConfig::default(),
            tie_break: TieBreak::First,
            lookahead_depth: 0,
            parallel: false,
            max_candidates: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead_depth > MAX_LOOKAHEAD_DEPTH {
            return Err(ConfigError::LookaheadTooDeep {
                depth: self.lookahead_depth,
                max: MAX_LOOKAHEAD_DEPTH,
            });
        }
        if self.max_candidates == Some(0) {
            return Err(ConfigError::ZeroMaxCandidates);
        }
        if let SelectorConfig::WeightedSum { terms, .. } = &self.selector {
            for term in terms {
                term.validate()?;
            }
        }
        Ok(())
    }

    /// Validates and builds a fresh engine; each call starts a new tie-break stream.
    pub fn build(&self) -> Result<DecisionEngine, ConfigError> {
        self.validate()?;
        Ok(DecisionEngine::new(self.selector.build()?)
            .with_tie_break(self.tie_break)
            .with_lookahead_depth(self.lookahead_depth)
            .with_parallel(self.parallel)
            .with_max_candidates(self.max_candidates))
    }
}
