//! Candidate placements for the falling piece.

use crate::{action_synthesizer::rotation_primitives, board_contract::Board, candidate::Candidate};

/// Enumerates one candidate per distinct rotation and reachable left column.
///
/// Rotations come first (`0..distinct_rotations`), then columns left to
/// right. For each rotation the column range is `0..=width - w`, where `w`
/// is the piece width in that rotation. `max_candidates` truncates the list;
/// the candidates themselves are not simulated yet.
///
/// Returns an empty list when no piece is falling.
#[must_use]
pub fn enumerate_candidates<B>(board: &B, max_candidates: Option<usize>) -> Vec<Candidate<B>>
where
    B: Board,
{
    let Some(piece) = board.falling_piece() else {
        return vec![];
    };
    let board_width = i32::try_from(board.width()).unwrap_or(i32::MAX);

    let mut candidates = vec![];
    for rotation in 0..piece.distinct_rotations() {
        let piece_width = rotated_width(board, rotation).unwrap_or(piece.width());
        for column in 0..=(board_width - piece_width).max(0) {
            candidates.push(Candidate::new(board, column, rotation));
        }
    }
    if let Some(max) = max_candidates {
        candidates.truncate(max.max(1));
    }
    candidates
}

/// Width of the falling piece after `rotation` quarter turns, probed on a clone.
fn rotated_width<B>(board: &B, rotation: u8) -> Option<i32>
where
    B: Board,
{
    let (direction, turns) = rotation_primitives(rotation);
    let mut probe = board.clone();
    for _ in 0..turns {
        if !probe.rotate_piece(direction) {
            return None;
        }
    }
    probe.falling_piece().map(|piece| piece.width())
}
