//! One hypothesized placement and the simulation that realizes it.
//!
//! A [`Candidate`] owns its own clone of the board. Simulation walks the
//! falling piece through a small state machine:
//!
//! ```text
//! Rotating ──(target rotation reached)──▶ Translating ──(target column reached)──▶ Landed
//!     │                                        │
//!     └──────(blocked or supported)────────────┴──────────────────────────────────▶ Landed
//! ```
//!
//! A blocked primitive never aborts the candidate: it keeps whatever
//! rotation and shift it achieved, and that is what gets settled, scored and,
//! if chosen, replayed.

use std::cmp::Ordering;

use stackpilot_engine::{Action, Direction, Rotation};

use crate::{
    action_synthesizer::{rotation_primitives, synthesize_actions},
    board_analysis::{self, BoardAnalysis, BoardFeatures},
    board_contract::Board,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SimulationPhase {
    Rotating,
    Translating,
    Landed,
}

/// Result of a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// A primitive moved the piece.
    Applied,
    /// Nothing left to do in the current phase; the simulation moved on.
    BlockedReachedTarget,
    /// The piece could not continue before reaching its target; it lands here.
    BlockedBeforeTarget,
}

#[derive(Debug, Clone)]
pub struct Candidate<B> {
    board: B,
    target_column: i32,
    target_rotation: u8,
    rotation_progress: u8,
    achieved_rotation: u8,
    achieved_shift: i32,
    phase: SimulationPhase,
    initial_score: usize,
    features: Option<BoardFeatures>,
    lookahead_features: Option<BoardFeatures>,
    topped_out: bool,
}

impl<B> Candidate<B>
where
    B: Board,
{
    /// Clones `board` for a placement aiming at `target_column` (the piece's
    /// leftmost column) after `target_rotation` anticlockwise quarter turns.
    #[must_use]
    pub fn new(board: &B, target_column: i32, target_rotation: u8) -> Self {
        let square = board.falling_piece().is_some_and(|piece| piece.is_square());
        let target_rotation = if square { 0 } else { target_rotation % 4 };
        Self {
            board: board.clone(),
            target_column,
            target_rotation,
            rotation_progress: 0,
            achieved_rotation: 0,
            achieved_shift: 0,
            phase: SimulationPhase::Rotating,
            initial_score: board.score(),
            features: None,
            lookahead_features: None,
            topped_out: false,
        }
    }

    #[must_use]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[must_use]
    pub fn target_column(&self) -> i32 {
        self.target_column
    }

    #[must_use]
    pub fn target_rotation(&self) -> u8 {
        self.target_rotation
    }

    #[must_use]
    pub fn achieved_rotation(&self) -> u8 {
        self.achieved_rotation
    }

    /// Signed number of column moves applied after rotating (positive is right).
    #[must_use]
    pub fn achieved_shift(&self) -> i32 {
        self.achieved_shift
    }

    #[must_use]
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Features of the settled board; `None` until [`Candidate::simulate`] ran.
    #[must_use]
    pub fn features(&self) -> Option<BoardFeatures> {
        self.features
    }

    /// Features the selectors rank by: the lookahead result when present.
    #[must_use]
    pub fn ranking_features(&self) -> Option<BoardFeatures> {
        self.lookahead_features.or(self.features)
    }

    #[must_use]
    pub fn is_topped_out(&self) -> bool {
        self.topped_out
    }

    /// Actions that reproduce this candidate's placement on the original board.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        synthesize_actions(self.achieved_rotation, self.achieved_shift)
    }

    /// Advances the simulation by one primitive.
    pub fn step(&mut self) -> StepOutcome {
        match self.phase {
            SimulationPhase::Rotating => self.step_rotation(),
            SimulationPhase::Translating => self.step_translation(),
            SimulationPhase::Landed => StepOutcome::BlockedReachedTarget,
        }
    }

    /// Runs the simulation to the end, then drops, clears lines and scores.
    ///
    /// Calling it again is a no-op.
    pub fn simulate(&mut self) {
        if self.features.is_some() {
            return;
        }
        while !self.phase.is_landed() {
            self.step();
        }
        if self.board.falling_piece().is_some() {
            self.board.apply_hard_drop();
        }
        self.board.clear_completed_lines();
        let delta = board_analysis::score_delta(self.initial_score, self.board.score());
        self.features = Some(BoardAnalysis::from_board(&self.board).features(delta));
    }

    /// Ranks this candidate by the best follow-up placement instead.
    ///
    /// The follow-up's score delta is added to this placement's own.
    pub(crate) fn override_with_follow_up(&mut self, follow_up: BoardFeatures) {
        let own_delta = self.features.map_or(0.0, |features| features.score_delta);
        self.lookahead_features = Some(BoardFeatures {
            score_delta: own_delta + follow_up.score_delta,
            ..follow_up
        });
    }

    pub(crate) fn mark_topped_out(&mut self) {
        self.topped_out = true;
    }

    fn land(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.phase = SimulationPhase::Landed;
        outcome
    }

    fn step_rotation(&mut self) -> StepOutcome {
        let (rotation, turns) = rotation_primitives(self.target_rotation);
        if self.rotation_progress >= turns {
            self.phase = SimulationPhase::Translating;
            return StepOutcome::BlockedReachedTarget;
        }
        if self.board.falling_piece().is_none()
            || self.board.is_supported()
            || !self.board.rotate_piece(rotation)
        {
            return self.land(StepOutcome::BlockedBeforeTarget);
        }
        self.rotation_progress += 1;
        self.achieved_rotation = match rotation {
            Rotation::Anticlockwise => self.rotation_progress,
            Rotation::Clockwise => (4 - self.rotation_progress) % 4,
        };
        StepOutcome::Applied
    }

    fn step_translation(&mut self) -> StepOutcome {
        let Some(piece) = self.board.falling_piece() else {
            return self.land(StepOutcome::BlockedBeforeTarget);
        };
        let (direction, delta) = match piece.left.cmp(&self.target_column) {
            Ordering::Equal => return self.land(StepOutcome::BlockedReachedTarget),
            Ordering::Less => (Direction::Right, 1),
            Ordering::Greater => (Direction::Left, -1),
        };
        if self.board.is_supported() || !self.board.move_piece(direction) {
            return self.land(StepOutcome::BlockedBeforeTarget);
        }
        self.achieved_shift += delta;
        StepOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use stackpilot_engine::{BitBoard, GameField, PieceKind};

    use super::*;

    fn field_with(kind: PieceKind) -> GameField {
        GameField::scripted(BitBoard::default(), Some(kind), [])
    }

    #[test]
    fn test_candidates_own_independent_boards() {
        let field = field_with(PieceKind::T);
        let mut first = Candidate::new(&field, 0, 0);
        let second = Candidate::new(&field, 0, 0);
        assert!(!ptr::eq(first.board(), &field));
        assert!(!ptr::eq(first.board(), second.board()));

        first.simulate();
        assert_eq!(first.board().board().occupied_cells().count(), 4);
        assert_eq!(field.board().occupied_cells().count(), 0);
        assert!(field.falling_piece().is_some());
    }

    #[test]
    fn test_square_pieces_never_rotate() {
        let field = field_with(PieceKind::O);
        assert_eq!(Candidate::new(&field, 2, 3).target_rotation(), 0);
        let field = field_with(PieceKind::T);
        assert_eq!(Candidate::new(&field, 2, 7).target_rotation(), 3);
    }

    #[test]
    fn test_step_outcomes_reaching_target() {
        let field = field_with(PieceKind::O);
        let mut candidate = Candidate::new(&field, 2, 0);
        assert_eq!(candidate.step(), StepOutcome::BlockedReachedTarget);
        assert!(candidate.phase().is_translating());
        assert_eq!(candidate.step(), StepOutcome::Applied);
        assert_eq!(candidate.step(), StepOutcome::Applied);
        assert_eq!(candidate.step(), StepOutcome::BlockedReachedTarget);
        assert!(candidate.phase().is_landed());
        assert_eq!(candidate.achieved_shift(), -2);
    }

    #[test]
    fn test_blocked_move_keeps_partial_placement() {
        let board = BitBoard::from_ascii(
            6,
            r"
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ...#......
            ",
        );
        let field = GameField::scripted(board, Some(PieceKind::O), []);
        let mut candidate = Candidate::new(&field, 0, 0);
        assert_eq!(candidate.step(), StepOutcome::BlockedReachedTarget);
        assert_eq!(candidate.step(), StepOutcome::BlockedBeforeTarget);
        assert!(candidate.phase().is_landed());

        candidate.simulate();
        assert_eq!(candidate.achieved_shift(), 0);
        assert_eq!(candidate.actions(), vec![Action::HardDrop]);
        let cells: Vec<_> = candidate.board().board().occupied_cells().collect();
        assert!(cells.contains(&(4, 5)));
        assert!(cells.contains(&(5, 4)));
    }

    #[test]
    fn test_clockwise_shortcut_for_three_turns() {
        let field = field_with(PieceKind::T);
        let mut candidate = Candidate::new(&field, 5, 3);
        assert_eq!(candidate.step(), StepOutcome::Applied);
        assert_eq!(candidate.achieved_rotation(), 3);
        assert_eq!(candidate.step(), StepOutcome::BlockedReachedTarget);
        candidate.simulate();
        assert_eq!(candidate.actions()[0], Action::RotateClockwise);
        assert_eq!(
            Board::falling_piece(candidate.board()),
            None,
            "settled candidates have no falling piece"
        );
    }

    #[test]
    fn test_simulate_scores_line_clear() {
        let board = BitBoard::from_ascii(
            24,
            r"
            ####..####
            ####..####
            ",
        );
        let field = GameField::scripted(board, Some(PieceKind::O), []);
        let mut candidate = Candidate::new(&field, 4, 0);
        candidate.simulate();
        let features = candidate.features().unwrap();
        assert!((features.score_delta - 3.0).abs() < f32::EPSILON);
        assert_eq!(features.holes, 0);
        assert_eq!(features.bottom_row_holes, 10);
        assert_eq!(candidate.board().score(), 300);
        assert_eq!(candidate.ranking_features(), Some(features));
    }

    #[test]
    fn test_follow_up_overrides_ranking() {
        let field = field_with(PieceKind::O);
        let mut candidate = Candidate::new(&field, 0, 0);
        candidate.simulate();
        let follow_up = BoardFeatures {
            holes: 7,
            score_delta: 2.0,
            ..BoardFeatures::default()
        };
        candidate.override_with_follow_up(follow_up);
        assert_eq!(candidate.ranking_features().unwrap().holes, 7);
        assert_ne!(candidate.features().unwrap().holes, 7);
        assert!((candidate.ranking_features().unwrap().score_delta - 2.0).abs() < f32::EPSILON);
    }
}
