//! Choosing the action list for the current piece.
//!
//! [`DecisionEngine::choose_action`] runs the whole pipeline:
//!
//! 1. **Enumerate** one candidate per distinct rotation and target column
//! 2. **Simulate** each candidate on its own board clone and extract features
//! 3. **Look ahead** (optional) at the best placement of the next piece
//! 4. **Select** the best-ranked subset with the injected [`Selector`]
//! 5. **Tie-break** to a single candidate
//! 6. **Synthesize** the actions that reproduce the chosen placement
//!
//! The caller's board is never modified.
//!
//! # Example
//!
//! ```
//! use stackpilot_ai::{
//!     decision_engine::DecisionEngine, selector::CascadeSelector, tie_break::TieBreak,
//! };
//! use stackpilot_engine::{Action, GameField, PieceSeed};
//!
//! let field = GameField::new(PieceSeed::from_u64(3));
//! let mut engine = DecisionEngine::new(Box::new(CascadeSelector::default()))
//!     .with_tie_break(TieBreak::Seeded { seed: 3 })
//!     .with_lookahead_depth(1);
//!
//! let actions = engine.choose_action(&field);
//! assert_eq!(actions.last(), Some(&Action::HardDrop));
//! ```

use rayon::prelude::*;
use stackpilot_engine::Action;
use tracing::{debug, trace};

use crate::{
    board_analysis::BoardFeatures,
    board_contract::Board,
    candidate::Candidate,
    enumerator::enumerate_candidates,
    lookahead::{self, MAX_LOOKAHEAD_DEPTH},
    selector::Selector,
    tie_break::{TieBreak, TieBreaker},
};

#[derive(Debug)]
pub struct DecisionEngine {
    selector: Box<dyn Selector>,
    tie_breaker: TieBreaker,
    lookahead_depth: u8,
    parallel: bool,
    max_candidates: Option<usize>,
}

impl DecisionEngine {
    /// Engine with first-candidate tie-breaks, no lookahead, sequential simulation.
    #[must_use]
    pub fn new(selector: Box<dyn Selector>) -> Self {
        Self {
            selector,
            tie_breaker: TieBreaker::new(TieBreak::First),
            lookahead_depth: 0,
            parallel: false,
            max_candidates: None,
        }
    }

    #[must_use]
    pub fn with_tie_break(mut self, policy: TieBreak) -> Self {
        self.tie_breaker = TieBreaker::new(policy);
        self
    }

    /// Depths beyond [`MAX_LOOKAHEAD_DEPTH`] are clamped.
    #[must_use]
    pub fn with_lookahead_depth(mut self, depth: u8) -> Self {
        self.lookahead_depth = depth.min(MAX_LOOKAHEAD_DEPTH);
        self
    }

    /// Simulates candidates on the rayon thread pool.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: Option<usize>) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    #[must_use]
    pub fn lookahead_depth(&self) -> u8 {
        self.lookahead_depth
    }

    /// Enumerates and fully evaluates the candidates for `board`'s falling piece.
    #[must_use]
    pub fn evaluate<B>(&self, board: &B) -> Vec<Candidate<B>>
    where
        B: Board,
    {
        self.evaluate_at_depth(board, self.lookahead_depth, self.parallel)
    }

    /// Indices of the best-ranked candidates, before the tie-break.
    ///
    /// Topped-out candidates are only considered when every candidate topped out.
    #[must_use]
    pub fn best_indices<B>(&self, candidates: &[Candidate<B>]) -> Vec<usize>
    where
        B: Board,
    {
        let mut pool: Vec<usize> = (0..candidates.len())
            .filter(|&i| !candidates[i].is_topped_out())
            .collect();
        if pool.is_empty() {
            pool = (0..candidates.len()).collect();
        }
        let features: Vec<BoardFeatures> = pool
            .iter()
            .map(|&i| candidates[i].ranking_features().unwrap_or_default())
            .collect();
        self.selector
            .select(&features)
            .into_iter()
            .map(|j| pool[j])
            .collect()
    }

    /// Selects and tie-breaks; `None` only for an empty list.
    pub fn choose_candidate<'c, B>(&mut self, candidates: &'c [Candidate<B>]) -> Option<&'c Candidate<B>>
    where
        B: Board,
    {
        let best = self.best_indices(candidates);
        self.tie_breaker.pick(&best).map(|i| &candidates[i])
    }

    /// Actions placing the falling piece; `[HardDrop]` when nothing is falling.
    pub fn choose_action<B>(&mut self, board: &B) -> Vec<Action>
    where
        B: Board,
    {
        if board.falling_piece().is_none() {
            return vec![Action::HardDrop];
        }
        let candidates = self.evaluate(board);
        let Some(chosen) = self.choose_candidate(&candidates) else {
            return vec![Action::HardDrop];
        };
        debug!(
            candidates = candidates.len(),
            rotation = chosen.achieved_rotation(),
            shift = chosen.achieved_shift(),
            topped_out = chosen.is_topped_out(),
            "chose placement"
        );
        chosen.actions()
    }

    fn evaluate_at_depth<B>(&self, board: &B, depth: u8, parallel: bool) -> Vec<Candidate<B>>
    where
        B: Board,
    {
        let mut candidates = enumerate_candidates(board, self.max_candidates);
        let evaluate = |candidate: &mut Candidate<B>| self.evaluate_candidate(candidate, depth);
        if parallel {
            candidates.par_iter_mut().for_each(evaluate);
        } else {
            candidates.iter_mut().for_each(evaluate);
        }
        candidates
    }

    fn evaluate_candidate<B>(&self, candidate: &mut Candidate<B>, depth: u8)
    where
        B: Board,
    {
        candidate.simulate();
        if depth > 0 {
            lookahead::look_ahead(candidate, |next| self.best_follow_up(next, depth - 1));
        }
        trace!(
            column = candidate.target_column(),
            rotation = candidate.target_rotation(),
            features = ?candidate.ranking_features(),
            "evaluated candidate"
        );
    }

    /// Nested searches always take the first of the best candidates.
    fn best_follow_up<B>(&self, board: &B, depth: u8) -> Option<BoardFeatures>
    where
        B: Board,
    {
        let candidates = self.evaluate_at_depth(board, depth, false);
        let best = self.best_indices(&candidates);
        best.first().and_then(|&i| candidates[i].ranking_features())
    }
}
