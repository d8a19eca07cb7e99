pub use self::{action::*, bit_board::*, piece::*};

pub(crate) mod action;
pub(crate) mod bit_board;
pub(crate) mod piece;

/// Default playable width (columns).
pub const DEFAULT_WIDTH: usize = 10;
/// Default playable height (rows), row 0 at the top.
pub const DEFAULT_HEIGHT: usize = 24;
