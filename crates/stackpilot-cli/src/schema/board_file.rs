use anyhow::ensure;
use serde::{Deserialize, Serialize};
use stackpilot_engine::{BitBoard, GameField, GameStats, Piece, PieceBuffer, PieceKind};

/// A single position to decide on, as read by `stackpilot decide`.
///
/// ```json
/// {
///   "board": "10:000,000,...,1ff",
///   "falling_piece": "T#0@3,0",
///   "next_piece": "O",
///   "score": 1200
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardFile {
    /// Settled cells: width, then one hex value per row from the top
    pub board: BitBoard,
    /// Falling piece as `kind#rotation@x,y`
    #[serde(default)]
    pub falling_piece: Option<Piece>,
    /// Preview piece, enabling the lookahead
    #[serde(default)]
    pub next_piece: Option<PieceKind>,
    #[serde(default)]
    pub score: usize,
}

impl BoardFile {
    pub fn into_field(self) -> anyhow::Result<GameField> {
        let BoardFile {
            board,
            falling_piece,
            next_piece,
            score,
        } = self;
        if let Some(piece) = &falling_piece {
            ensure!(
                !board.is_colliding(piece),
                "falling piece is outside the board or overlaps settled cells"
            );
        }
        Ok(GameField::from_parts(
            board,
            falling_piece,
            PieceBuffer::scripted(next_piece),
            GameStats::with_score(score),
        ))
    }
}

#[cfg(test)]
mod tests {
    use stackpilot_ai::board_contract::Board;

    use super::*;

    #[test]
    fn test_parse_board_file() {
        let json = r#"{
            "board": "10:000,000,000,1ff",
            "falling_piece": "T#0@3,0",
            "next_piece": "O",
            "score": 1200
        }"#;
        let file: BoardFile = serde_json::from_str(json).unwrap();
        let field = file.into_field().unwrap();
        assert_eq!(Board::width(&field), 10);
        assert_eq!(Board::height(&field), 4);
        assert_eq!(Board::occupied_cells(&field).count(), 9);
        assert_eq!(Board::next_piece(&field), Some(PieceKind::O));
        assert_eq!(Board::score(&field), 1200);
        let piece = Board::falling_piece(&field).unwrap();
        assert_eq!((piece.left, piece.right), (3, 5));
    }

    #[test]
    fn test_defaults_and_overlap() {
        let file: BoardFile = serde_json::from_str(r#"{ "board": "4:0,0,f" }"#).unwrap();
        let field = file.into_field().unwrap();
        assert!(Board::falling_piece(&field).is_none());
        assert_eq!(Board::score(&field), 0);

        let file: BoardFile =
            serde_json::from_str(r#"{ "board": "4:f,0", "falling_piece": "O#0@0,0" }"#).unwrap();
        assert!(file.into_field().is_err());
    }
}
