//! Board state and game rules.
//!
//! - [`GameField`] - Board, falling piece, piece queue and score of one game
//! - [`GameStats`] - Score, cleared lines and placed pieces
//! - [`PieceBuffer`] - Seeded 7-bag or scripted piece queue
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Turn Flow
//!
//! 1. The falling piece spawns at the top center of the board
//! 2. The player moves and rotates it ([`GameField::try_move`], [`GameField::try_rotate`])
//! 3. The piece locks ([`GameField::hard_drop`], or gravity via [`GameField::lock_piece`])
//! 4. Completed lines are cleared and scored ([`GameField::clear_lines`])
//! 5. The next piece spawns ([`GameField::spawn_next_piece`]); a collision there ends the game
//!
//! # Example
//!
//! ```
//! use stackpilot_engine::{Direction, GameField, PieceSeed};
//!
//! let mut field = GameField::new(PieceSeed::from_u64(42));
//! field.try_move(Direction::Left).ok();
//! field.hard_drop();
//! let (lines, _score_delta) = field.clear_lines();
//! assert_eq!(lines, 0);
//! assert!(field.spawn_next_piece().is_ok());
//! ```

pub use self::{game_field::*, game_stats::*, piece_buffer::*};

mod game_field;
mod game_stats;
mod piece_buffer;
