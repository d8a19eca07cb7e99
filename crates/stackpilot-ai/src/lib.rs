//! Decision core for the falling-block puzzle.
//!
//! Given a board with a falling piece, the core answers one question: which
//! actions should the player take to place this piece? It works on any type
//! implementing the [`Board`](board_contract::Board) contract and never
//! modifies the caller's board.
//!
//! # Architecture
//!
//! ```text
//! DecisionEngine::choose_action
//!     ├─ enumerator          one Candidate per (rotation, column)
//!     ├─ candidate           simulate on a board clone: rotate → translate → land
//!     ├─ board_analysis      holes, heights, score delta of the settled clone
//!     ├─ lookahead           optional: best placement of the next piece
//!     ├─ selector            cascade or weighted sum → best subset
//!     ├─ tie_break           first or seeded random
//!     └─ action_synthesizer  rotations, moves, hard drop
//! ```
//!
//! Around the pipeline:
//!
//! - [`player`] - the [`Player`](player::Player) trait, implemented by the
//!   engine and by a seeded [`RandomPlayer`](player::RandomPlayer) baseline
//! - [`session`] - game loop driving a player until top-out or a turn limit
//! - [`config`] - serde-backed [`EngineConfig`](config::EngineConfig)
//!
//! # Design Principles
//!
//! ## Simulation by the player's own primitives
//!
//! Candidates are not computed geometrically. Each one replays rotate and
//! move primitives on a private clone, exactly as the synthesized actions
//! will later do on the real board. A blocked step clamps the placement
//! instead of discarding it, so the chosen action list always reproduces the
//! board that was scored.
//!
//! ## Lexicographic ranking
//!
//! The default [`CascadeSelector`](selector::CascadeSelector) compares metrics
//! one at a time rather than mixing them into a score, so no metric can be
//! traded against another. [`WeightedSumSelector`](selector::WeightedSumSelector)
//! is available when a trade-off is wanted.

pub mod action_synthesizer;
pub mod board_analysis;
pub mod board_contract;
pub mod candidate;
pub mod config;
pub mod decision_engine;
pub mod enumerator;
pub mod lookahead;
pub mod player;
pub mod selector;
pub mod session;
pub mod tie_break;
