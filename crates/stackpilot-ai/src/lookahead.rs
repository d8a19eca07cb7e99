//! Re-ranking a placement by the best placement of the next piece.
//!
//! When the next piece is known, each settled candidate board spawns it and
//! runs a nested search. The nested winner's features replace the
//! candidate's ranking features, with both score deltas summed. A candidate
//! whose board cannot take the next piece is flagged as topped out.

use crate::{board_analysis::BoardFeatures, board_contract::Board, candidate::Candidate};

/// Deepest supported lookahead: the current piece plus one preview piece.
pub const MAX_LOOKAHEAD_DEPTH: u8 = 1;

/// State of a settled board once the next piece enters.
#[derive(Debug, derive_more::IsVariant)]
pub enum FollowUp<B> {
    /// No preview piece is known.
    Unknown,
    /// The next piece collides on spawn.
    ToppedOut,
    /// The next piece is falling on this board.
    Ready(B),
}

#[must_use]
pub fn follow_up<B>(settled: &B) -> FollowUp<B>
where
    B: Board,
{
    if settled.next_piece().is_none() {
        return FollowUp::Unknown;
    }
    let mut board = settled.clone();
    if board.spawn_next_piece() {
        FollowUp::Ready(board)
    } else {
        FollowUp::ToppedOut
    }
}

/// Applies the lookahead to one simulated candidate.
///
/// `best_follow_up` runs the nested search on a board with the next piece
/// falling and returns the winner's ranking features.
pub fn look_ahead<B, F>(candidate: &mut Candidate<B>, best_follow_up: F)
where
    B: Board,
    F: FnOnce(&B) -> Option<BoardFeatures>,
{
    match follow_up(candidate.board()) {
        FollowUp::Unknown => {}
        FollowUp::ToppedOut => candidate.mark_topped_out(),
        FollowUp::Ready(board) => {
            if let Some(features) = best_follow_up(&board) {
                candidate.override_with_follow_up(features);
            }
        }
    }
}
