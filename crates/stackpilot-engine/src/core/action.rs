use serde::{Deserialize, Serialize};

/// Horizontal or downward movement of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
pub enum Direction {
    Left,
    Right,
    Down,
}

impl Direction {
    /// Column/row offset applied by this movement.
    #[must_use]
    pub const fn offset(self) -> (i16, i16) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }
}

/// Rotation direction of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
pub enum Rotation {
    Clockwise,
    Anticlockwise,
}

/// A single discrete input the game loop applies to the falling piece.
///
/// Actions carry no physics of their own; [`GameField`](crate::GameField)
/// decides what each one does to the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDown,
    RotateClockwise,
    RotateAnticlockwise,
    HardDrop,
}

impl Action {
    /// All actions, in declaration order.
    pub const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::SoftDown,
        Action::RotateClockwise,
        Action::RotateAnticlockwise,
        Action::HardDrop,
    ];

    #[must_use]
    pub const fn from_direction(direction: Direction) -> Self {
        match direction {
            Direction::Left => Action::MoveLeft,
            Direction::Right => Action::MoveRight,
            Direction::Down => Action::SoftDown,
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Clockwise => Action::RotateClockwise,
            Rotation::Anticlockwise => Action::RotateAnticlockwise,
        }
    }
}
