//! Outbound notifications for animation, audio and match bookkeeping.

use crate::state::MovementState;

/// Collision axis reported by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Sign of the motion that was blocked along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Negative,
    Positive,
}

impl Direction {
    pub fn of(value: f32) -> Self {
        if value > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}

/// Something external collaborators may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    /// Drives animation selection.
    StateChanged(MovementState),
    /// Drives impact sounds and effects.
    Collision { axis: Axis, direction: Direction },
    JumpTriggered { is_double: bool },
    DashTriggered,
    DamageTaken { amount: i32 },
    /// Health ran out; life-loss and respawn bookkeeping happen outside.
    DeathThresholdReached { lives_remaining: i32 },
}
