//! The view of a board the decision core relies on.
//!
//! The core never looks inside a concrete board type. It reads occupied
//! cells and the falling piece's bounding box, and drives the piece through
//! the same one-step primitives a human player would use. [`GameField`] is
//! the reference implementation.

pub use stackpilot_engine::{Action, Direction, PieceKind, Rotation};

use stackpilot_engine::GameField;

/// Bounding box and orientation of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingPiece {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Quarter turns from the spawn orientation, `0..4`.
    pub rotation: u8,
    /// Number of orientations with distinct footprints (1, 2 or 4).
    pub symmetry: u8,
}

impl FallingPiece {
    #[must_use]
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }

    /// A 1×1 or 2×2 bounding box looks the same in every orientation.
    #[must_use]
    pub fn is_square(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w == h && w <= 2
    }

    /// Rotation counts worth enumerating for this piece.
    #[must_use]
    pub fn distinct_rotations(&self) -> u8 {
        if self.is_square() {
            1
        } else {
            self.symmetry.clamp(1, 4)
        }
    }
}

/// A mutable game board the decision core can analyze and simulate on.
///
/// Rows are numbered from 0 at the top to `height() - 1` at the floor.
/// Cloning must produce a fully independent board: candidates mutate their
/// clones freely.
pub trait Board: Clone + Send + Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Settled cells as `(column, row)`; never includes the falling piece.
    fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_;

    fn falling_piece(&self) -> Option<FallingPiece>;
    fn next_piece(&self) -> Option<PieceKind>;
    fn score(&self) -> usize;

    /// Moves the falling piece one cell. Returns `false` when blocked.
    fn move_piece(&mut self, direction: Direction) -> bool;

    /// Rotates the falling piece a quarter turn. Returns `false` when blocked.
    fn rotate_piece(&mut self, rotation: Rotation) -> bool;

    /// Whether the falling piece can no longer move down.
    fn is_supported(&self) -> bool;

    /// Drops the falling piece and locks it into the stack.
    fn apply_hard_drop(&mut self);

    /// Removes full rows. Returns `(lines_cleared, score_delta)`.
    fn clear_completed_lines(&mut self) -> (usize, usize);

    /// Brings in the next piece. Returns `false` on top-out or an empty queue.
    fn spawn_next_piece(&mut self) -> bool;

    /// Applies one player action. Returns `false` when it had no effect.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_piece(Direction::Left),
            Action::MoveRight => self.move_piece(Direction::Right),
            Action::SoftDown => self.move_piece(Direction::Down),
            Action::RotateClockwise => self.rotate_piece(Rotation::Clockwise),
            Action::RotateAnticlockwise => self.rotate_piece(Rotation::Anticlockwise),
            Action::HardDrop => {
                if self.falling_piece().is_none() {
                    return false;
                }
                self.apply_hard_drop();
                true
            }
        }
    }
}

impl Board for GameField {
    fn width(&self) -> usize {
        self.board().width()
    }

    fn height(&self) -> usize {
        self.board().height()
    }

    fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.board().occupied_cells()
    }

    fn falling_piece(&self) -> Option<FallingPiece> {
        GameField::falling_piece(self).map(|piece| {
            let bounds = piece.bounds();
            FallingPiece {
                left: bounds.left,
                right: bounds.right,
                top: bounds.top,
                bottom: bounds.bottom,
                rotation: piece.rotation().as_u8(),
                symmetry: piece.kind().distinct_rotations(),
            }
        })
    }

    fn next_piece(&self) -> Option<PieceKind> {
        GameField::next_piece(self)
    }

    fn score(&self) -> usize {
        GameField::score(self)
    }

    fn move_piece(&mut self, direction: Direction) -> bool {
        self.try_move(direction).is_ok()
    }

    fn rotate_piece(&mut self, rotation: Rotation) -> bool {
        self.try_rotate(rotation).is_ok()
    }

    fn is_supported(&self) -> bool {
        self.is_piece_supported()
    }

    fn apply_hard_drop(&mut self) {
        self.hard_drop();
    }

    fn clear_completed_lines(&mut self) -> (usize, usize) {
        self.clear_lines()
    }

    fn spawn_next_piece(&mut self) -> bool {
        GameField::spawn_next_piece(self).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use stackpilot_engine::BitBoard;

    use super::*;

    #[test]
    fn test_falling_piece_view() {
        let field = GameField::scripted(BitBoard::default(), Some(PieceKind::O), []);
        let piece = Board::falling_piece(&field).unwrap();
        assert_eq!((piece.left, piece.right), (4, 5));
        assert_eq!(piece.width(), 2);
        assert!(piece.is_square());
        assert_eq!(piece.distinct_rotations(), 1);

        let field = GameField::scripted(BitBoard::default(), Some(PieceKind::I), []);
        let piece = Board::falling_piece(&field).unwrap();
        assert_eq!((piece.left, piece.right, piece.top), (3, 6, 1));
        assert_eq!(piece.distinct_rotations(), 2);

        let field = GameField::scripted(BitBoard::default(), Some(PieceKind::T), []);
        assert_eq!(Board::falling_piece(&field).unwrap().distinct_rotations(), 4);
    }

    #[test]
    fn test_apply_action() {
        let mut field = GameField::scripted(BitBoard::default(), Some(PieceKind::T), [PieceKind::O]);
        assert!(field.apply_action(Action::MoveLeft));
        assert!(field.apply_action(Action::RotateClockwise));
        assert!(field.apply_action(Action::SoftDown));
        assert!(field.apply_action(Action::HardDrop));
        assert!(Board::falling_piece(&field).is_none());
        assert!(!field.apply_action(Action::HardDrop));
        assert!(!field.apply_action(Action::MoveRight));
        assert_eq!(Board::occupied_cells(&field).count(), 4);
        assert!(Board::spawn_next_piece(&mut field));
        assert!(!Board::spawn_next_piece(&mut field));
    }
}
