use crate::{
    PieceCollisionError, SpawnError,
    core::{
        action::{Direction, Rotation},
        bit_board::BitBoard,
        piece::{Piece, PieceKind},
    },
};

use super::{
    game_stats::GameStats,
    piece_buffer::{PieceBuffer, PieceGeneration, PieceSeed},
};

/// Board state of one game: settled cells, falling piece, piece queue and score.
///
/// Cloning a `GameField` produces a fully independent copy, including the
/// piece queue's random state.
#[derive(Debug, Clone)]
pub struct GameField {
    board: BitBoard,
    falling_piece: Option<Piece>,
    piece_buffer: PieceBuffer,
    stats: GameStats,
}

impl GameField {
    /// Starts a game on the default 10×24 board with a 7-bag queue.
    #[must_use]
    pub fn new(seed: PieceSeed) -> Self {
        Self::with_generation(BitBoard::default(), seed, PieceGeneration::SevenBag)
    }

    /// Starts a game on `board`, spawning the first piece from a seeded queue.
    ///
    /// If the first piece cannot spawn, the field starts without a falling piece.
    #[must_use]
    pub fn with_generation(board: BitBoard, seed: PieceSeed, generation: PieceGeneration) -> Self {
        let mut field = Self::from_parts(
            board,
            None,
            PieceBuffer::with_generation(seed, generation),
            GameStats::new(),
        );
        // A blocked spawn leaves `falling_piece` empty; callers see it as game over.
        let _ = field.spawn_next_piece();
        field
    }

    /// Assembles a field from its parts without spawning anything.
    #[must_use]
    pub fn from_parts(
        board: BitBoard,
        falling_piece: Option<Piece>,
        piece_buffer: PieceBuffer,
        stats: GameStats,
    ) -> Self {
        Self {
            board,
            falling_piece,
            piece_buffer,
            stats,
        }
    }

    /// Fixture helper: `falling` spawns at the top center, `next` is the whole queue.
    #[must_use]
    pub fn scripted<I>(board: BitBoard, falling: Option<PieceKind>, next: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let falling_piece = falling.map(|kind| Piece::spawn(kind, board.width()));
        Self::from_parts(
            board,
            falling_piece,
            PieceBuffer::scripted(next),
            GameStats::new(),
        )
    }

    #[must_use]
    pub fn board(&self) -> &BitBoard {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<Piece> {
        self.falling_piece
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<PieceKind> {
        self.piece_buffer.peek_next()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = Some(piece);
        Ok(())
    }

    /// Moves the falling piece one cell; fails without a piece or when blocked.
    pub fn try_move(&mut self, direction: Direction) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.ok_or(PieceCollisionError)?;
        self.set_falling_piece(piece.moved(direction))
    }

    /// Rotates the falling piece, trying wall kicks when the plain rotation collides.
    pub fn try_rotate(&mut self, rotation: Rotation) -> Result<(), PieceCollisionError> {
        let piece = self.falling_piece.ok_or(PieceCollisionError)?;
        let rotated = piece
            .super_rotated(rotation, &self.board)
            .ok_or(PieceCollisionError)?;
        self.falling_piece = Some(rotated);
        Ok(())
    }

    /// Whether the falling piece rests on the stack or the floor.
    ///
    /// Without a falling piece there is nothing left to move, so this is `true`.
    #[must_use]
    pub fn is_piece_supported(&self) -> bool {
        self.falling_piece
            .is_none_or(|piece| self.board.is_colliding(&piece.down()))
    }

    #[must_use]
    pub fn simulate_drop_position(&self) -> Option<Piece> {
        self.falling_piece
            .map(|piece| piece.simulate_drop_position(&self.board))
    }

    /// Drops the falling piece to its resting position and locks it.
    pub fn hard_drop(&mut self) {
        if let Some(piece) = self.simulate_drop_position() {
            self.falling_piece = Some(piece);
        }
        self.lock_piece();
    }

    /// Locks the falling piece where it is. No-op without a falling piece.
    pub fn lock_piece(&mut self) {
        if let Some(piece) = self.falling_piece.take() {
            self.board.fill_piece(&piece);
        }
    }

    /// Clears completed lines and scores them as one placement.
    ///
    /// Returns `(lines_cleared, score_delta)`.
    pub fn clear_lines(&mut self) -> (usize, usize) {
        let cleared_lines = self.board.clear_lines();
        let points = self.stats.complete_piece_drop(cleared_lines);
        (cleared_lines, points)
    }

    /// Makes the next queued piece the falling piece.
    pub fn spawn_next_piece(&mut self) -> Result<(), SpawnError> {
        let kind = self
            .piece_buffer
            .pop_next()
            .ok_or(SpawnError::QueueExhausted)?;
        let piece = Piece::spawn(kind, self.board.width());
        if self.board.is_colliding(&piece) {
            self.falling_piece = None;
            return Err(SpawnError::PieceCollision(PieceCollisionError));
        }
        self.falling_piece = Some(piece);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_has_falling_and_next_piece() {
        let field = GameField::new(PieceSeed::from_u64(1));
        assert!(field.falling_piece().is_some());
        assert!(field.next_piece().is_some());
        assert_eq!(field.score(), 0);
        assert_eq!(field.board().width(), 10);
        assert_eq!(field.board().height(), 24);
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut field = GameField::scripted(BitBoard::default(), Some(PieceKind::O), []);
        // O spawns at columns 4..=5
        for _ in 0..4 {
            field.try_move(Direction::Left).unwrap();
        }
        assert!(field.try_move(Direction::Left).is_err());
        assert_eq!(field.falling_piece().unwrap().bounds().left, 0);
        for _ in 0..8 {
            field.try_move(Direction::Right).unwrap();
        }
        assert!(field.try_move(Direction::Right).is_err());
        assert_eq!(field.falling_piece().unwrap().bounds().right, 9);
    }

    #[test]
    fn test_supported_and_hard_drop() {
        let board = BitBoard::from_ascii(
            24,
            r"
            #########.
            #########.
            ",
        );
        let mut field = GameField::scripted(board, Some(PieceKind::I), [PieceKind::O]);
        assert!(!field.is_piece_supported());
        field.try_rotate(Rotation::Anticlockwise).unwrap();
        // Vertical I: move into the rightmost column and drop into the well.
        while field.try_move(Direction::Right).is_ok() {}
        assert_eq!(field.falling_piece().unwrap().bounds().left, 9);
        field.hard_drop();
        assert!(field.falling_piece().is_none());
        assert!(field.is_piece_supported());
        assert_eq!(field.clear_lines(), (2, 300));
        assert_eq!(field.score(), 300);
        let cells: Vec<_> = field.board().occupied_cells().collect();
        assert_eq!(cells, vec![(9, 22), (9, 23)]);

        field.spawn_next_piece().unwrap();
        assert_eq!(field.falling_piece().unwrap().kind(), PieceKind::O);
        field.hard_drop();
        field.clear_lines();
        assert!(matches!(
            field.spawn_next_piece(),
            Err(SpawnError::QueueExhausted)
        ));
    }

    #[test]
    fn test_spawn_collision_is_game_over() {
        // Row 0 is blocked where the O-piece spawns
        let board = BitBoard::from_ascii(
            4,
            r"
            ....##....
            ..........
            ..........
            ..........
            ",
        );
        let mut field = GameField::scripted(board, None, [PieceKind::O]);
        let err = field.spawn_next_piece().unwrap_err();
        assert!(err.is_piece_collision());
        assert!(field.falling_piece().is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = GameField::new(PieceSeed::from_u64(5));
        let mut clone = original.clone();
        clone.hard_drop();
        clone.clear_lines();
        assert!(original.falling_piece().is_some());
        assert_eq!(original.board().occupied_cells().count(), 0);
        assert_eq!(clone.board().occupied_cells().count(), 4);
        assert_eq!(original.stats().completed_pieces(), 0);
    }
}
