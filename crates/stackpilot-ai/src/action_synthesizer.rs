//! Turns a simulated placement back into player actions.

use std::iter;

use stackpilot_engine::{Action, Rotation};

/// Primitive rotations that realize `quarter_turns` anticlockwise turns.
///
/// Up to two turns go anticlockwise; three turns are one clockwise turn.
/// Placement simulation and action synthesis both use this, so replaying
/// the actions reproduces the simulated board.
#[must_use]
pub fn rotation_primitives(quarter_turns: u8) -> (Rotation, u8) {
    match quarter_turns % 4 {
        3 => (Rotation::Clockwise, 1),
        n => (Rotation::Anticlockwise, n),
    }
}

/// Builds the action list for an achieved rotation and horizontal shift.
///
/// Rotations come first, then `|shift|` moves (right for positive shifts),
/// then a hard drop.
///
/// # Example
///
/// ```
/// use stackpilot_ai::action_synthesizer::synthesize_actions;
/// use stackpilot_engine::Action;
///
/// assert_eq!(synthesize_actions(0, 0), vec![Action::HardDrop]);
/// assert_eq!(
///     synthesize_actions(3, -2),
///     vec![Action::RotateClockwise, Action::MoveLeft, Action::MoveLeft, Action::HardDrop],
/// );
/// ```
#[must_use]
pub fn synthesize_actions(rotation: u8, shift: i32) -> Vec<Action> {
    let (direction, turns) = rotation_primitives(rotation);
    let rotate = iter::repeat_n(Action::from_rotation(direction), usize::from(turns));
    let step = if shift >= 0 {
        Action::MoveRight
    } else {
        Action::MoveLeft
    };
    let moves = iter::repeat_n(step, shift.unsigned_abs() as usize);
    rotate.chain(moves).chain([Action::HardDrop]).collect()
}
