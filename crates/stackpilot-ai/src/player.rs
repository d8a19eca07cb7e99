//! Strategies a game loop can drive.

use rand::{SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg32;
use stackpilot_engine::Action;

use crate::{board_contract::Board, decision_engine::DecisionEngine};

/// Anything that can decide what to do with the falling piece.
pub trait Player<B>
where
    B: Board,
{
    /// Actions for this turn, applied in order. An empty list lets gravity act.
    fn choose_action(&mut self, board: &B) -> Vec<Action>;
}

impl<B> Player<B> for DecisionEngine
where
    B: Board,
{
    fn choose_action(&mut self, board: &B) -> Vec<Action> {
        DecisionEngine::choose_action(self, board)
    }
}

/// Baseline player: one uniformly random non-dropping action per turn.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: Pcg32,
}

impl RandomPlayer {
    pub const ACTIONS: [Action; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::SoftDown,
        Action::RotateAnticlockwise,
        Action::RotateClockwise,
    ];

    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl<B> Player<B> for RandomPlayer
where
    B: Board,
{
    fn choose_action(&mut self, _board: &B) -> Vec<Action> {
        Self::ACTIONS.choose(&mut self.rng).copied().into_iter().collect()
    }
}
