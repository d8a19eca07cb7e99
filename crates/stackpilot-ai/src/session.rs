//! Driving a whole game with a [`Player`].
//!
//! Each turn the player returns a list of actions, which are applied in order
//! through the board's primitives. A hard drop settles the piece: lines are
//! cleared and the next piece spawns. A turn that ends without a drop gets
//! one step of gravity, which locks the piece once it is supported. The game
//! ends when a piece cannot spawn or the turn limit is reached.

use serde::Serialize;
use stackpilot_engine::{Action, Direction, GameField, GameStats};
use tracing::{debug, info};

use crate::{board_contract::Board, player::Player};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub score: usize,
    pub turns: usize,
    pub topped_out: bool,
    pub stats: GameStats,
}

/// Plays on `field` until top-out or `turn_limit` turns.
pub fn play_session<P>(field: &mut GameField, player: &mut P, turn_limit: usize) -> SessionResult
where
    P: Player<GameField> + ?Sized,
{
    let mut turns = 0;
    let mut topped_out = field.falling_piece().is_none() && field.spawn_next_piece().is_err();

    while !topped_out && turns < turn_limit {
        turns += 1;
        let mut locked = false;
        for action in player.choose_action(field) {
            field.apply_action(action);
            if action == Action::HardDrop {
                locked = true;
                break;
            }
        }
        if !locked && !field.move_piece(Direction::Down) {
            field.apply_hard_drop();
            locked = true;
        }
        if locked {
            let (lines, points) = field.clear_completed_lines();
            if lines > 0 {
                debug!(turn = turns, lines, points, "cleared lines");
            }
            topped_out = field.spawn_next_piece().is_err();
        }
    }

    info!(
        score = field.score(),
        turns,
        pieces = field.stats().completed_pieces(),
        topped_out,
        "game over"
    );
    SessionResult {
        score: field.score(),
        turns,
        topped_out,
        stats: field.stats().clone(),
    }
}
