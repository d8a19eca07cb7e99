//! Reference board engine for the falling-block puzzle.
//!
//! The engine owns everything the decision core treats as an external
//! collaborator: the grid, piece shapes and rotation, movement primitives,
//! line clearing, scoring and piece generation.
//!
//! - [`core`] - data structures ([`BitBoard`], [`Piece`], [`Action`])
//! - [`engine`] - board state and rules ([`GameField`], [`GameStats`], [`PieceBuffer`])

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum SpawnError {
    #[display("spawned piece collides with the stack")]
    PieceCollision(PieceCollisionError),
    #[display("piece queue is exhausted")]
    QueueExhausted,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board width must be in 1..={max}, got {width}")]
    InvalidWidth { width: usize, max: usize },
    #[display("board height must be in 1..={max}, got {height}")]
    InvalidHeight { height: usize, max: usize },
}
