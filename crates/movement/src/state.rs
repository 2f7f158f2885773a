//! Movement state machine.
//!
//! `next_state` is the complete transition table. Every change of
//! `MovementState` on the owning peer goes through `StateMachine::fire`,
//! so no state is reachable any other way.

use serde::{Deserialize, Serialize};

/// Mutually exclusive movement states. Discriminants are part of the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MovementState {
    #[default]
    Grounded = 0,
    Jumping = 1,
    Falling = 2,
    WallSlideLeft = 3,
    WallSlideRight = 4,
    WallJump = 5,
    Dashing = 6,
    Damaged = 7,
    Dying = 8,
}

impl MovementState {
    pub const ALL: [MovementState; 9] = [
        MovementState::Grounded,
        MovementState::Jumping,
        MovementState::Falling,
        MovementState::WallSlideLeft,
        MovementState::WallSlideRight,
        MovementState::WallJump,
        MovementState::Dashing,
        MovementState::Damaged,
        MovementState::Dying,
    ];

    pub fn is_wall_slide(self) -> bool {
        matches!(self, MovementState::WallSlideLeft | MovementState::WallSlideRight)
    }

    /// Hit-reaction states: no player control, immune to further hits.
    pub fn is_hit(self) -> bool {
        matches!(self, MovementState::Damaged | MovementState::Dying)
    }

    pub fn is_rising(self) -> bool {
        matches!(self, MovementState::Jumping | MovementState::WallJump)
    }

    pub fn wall_side(self) -> Option<WallSide> {
        match self {
            MovementState::WallSlideLeft => Some(WallSide::Left),
            MovementState::WallSlideRight => Some(WallSide::Right),
            _ => None,
        }
    }
}

/// Which side of the character a wall is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// Side hit when moving horizontally in the direction of `dx`.
    pub fn from_motion(dx: f32) -> Self {
        if dx > 0.0 {
            WallSide::Right
        } else {
            WallSide::Left
        }
    }

    fn slide_state(self) -> MovementState {
        match self {
            WallSide::Left => MovementState::WallSlideLeft,
            WallSide::Right => MovementState::WallSlideRight,
        }
    }
}

/// Events that may move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Jump input on the ground or in the air.
    Jump,
    /// Jump input while touching a wall.
    WallJump,
    /// Dash input that passed its cooldown check.
    Dash,
    /// Took damage with health remaining.
    Hit,
    /// Took damage that exhausted health.
    Killed,
    /// Horizontal ray hit while airborne.
    WallContact(WallSide),
    /// Horizontal contact cleared, or the player pushed off the wall.
    WallDetached,
    /// Vertical ray hit while descending.
    Landed,
    /// Grounded but the downward rays found nothing this tick.
    GroundLost,
    /// The current state's timer ran out.
    RecoveryElapsed,
    /// Rising speed spent or jump input released.
    JumpEnded,
}

/// The transition table. `None` means the trigger is ignored in `from`.
pub fn next_state(from: MovementState, trigger: Trigger) -> Option<MovementState> {
    use MovementState::*;
    match (trigger, from) {
        (Trigger::Jump, Grounded | Falling | WallJump | Jumping) => Some(Jumping),
        (Trigger::WallJump, Grounded | WallSlideLeft | WallSlideRight) => Some(WallJump),
        (Trigger::Dash, state) if !state.is_hit() => Some(Dashing),
        (Trigger::Hit, _) => Some(Damaged),
        (Trigger::Killed, _) => Some(Dying),
        (Trigger::WallContact(side), Jumping | Falling | WallJump | WallSlideLeft | WallSlideRight) => {
            Some(side.slide_state())
        }
        (Trigger::WallDetached, WallSlideLeft | WallSlideRight) => Some(Falling),
        (Trigger::Landed, state) if !state.is_hit() && state != Dashing => Some(Grounded),
        (Trigger::GroundLost, Grounded) => Some(Falling),
        (Trigger::RecoveryElapsed, Damaged | Dying | Dashing) => Some(Falling),
        (Trigger::RecoveryElapsed, WallJump) => Some(Jumping),
        (Trigger::JumpEnded, Jumping) => Some(Falling),
        _ => None,
    }
}

/// Result of firing a trigger that the table accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: MovementState,
    pub to: MovementState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Owns the authoritative movement state and when it was entered.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine {
    current: MovementState,
    entered_at: f32,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: MovementState::Grounded,
            entered_at: 0.0,
        }
    }

    pub fn current(&self) -> MovementState {
        self.current
    }

    /// Simulation time at which the current state was (re-)entered.
    pub fn entered_at(&self) -> f32 {
        self.entered_at
    }

    pub fn time_in_state(&self, now: f32) -> f32 {
        now - self.entered_at
    }

    /// Apply `trigger` at time `now`. Accepted triggers restart the state timer.
    pub fn fire(&mut self, trigger: Trigger, now: f32) -> Option<Transition> {
        let to = next_state(self.current, trigger)?;
        let transition = Transition {
            from: self.current,
            to,
        };
        if transition.changed() {
            log::debug!("Movement {:?} -> {:?} on {:?}", self.current, to, trigger);
        }
        self.current = to;
        self.entered_at = now;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MovementState::*;

    #[test]
    fn initial_state_is_grounded() {
        assert_eq!(StateMachine::new().current(), Grounded);
    }

    #[test]
    fn jump_sources() {
        for from in [Grounded, Falling, WallJump, Jumping] {
            assert_eq!(next_state(from, Trigger::Jump), Some(Jumping));
        }
        for from in [WallSlideLeft, WallSlideRight, Dashing, Damaged, Dying] {
            assert_eq!(next_state(from, Trigger::Jump), None);
        }
    }

    #[test]
    fn hits_override_everything() {
        for from in MovementState::ALL {
            assert_eq!(next_state(from, Trigger::Hit), Some(Damaged));
            assert_eq!(next_state(from, Trigger::Killed), Some(Dying));
        }
    }

    #[test]
    fn dash_blocked_only_by_hit_states() {
        for from in MovementState::ALL {
            let expected = if from.is_hit() { None } else { Some(Dashing) };
            assert_eq!(next_state(from, Trigger::Dash), expected);
        }
    }

    #[test]
    fn wall_contact_ignored_when_grounded_dashing_or_hit() {
        for from in [Grounded, Dashing, Damaged, Dying] {
            assert_eq!(next_state(from, Trigger::WallContact(WallSide::Left)), None);
        }
        assert_eq!(
            next_state(Falling, Trigger::WallContact(WallSide::Right)),
            Some(WallSlideRight)
        );
    }

    #[test]
    fn landing_ignored_when_dashing_or_hit() {
        for from in [Dashing, Damaged, Dying] {
            assert_eq!(next_state(from, Trigger::Landed), None);
        }
        assert_eq!(next_state(WallSlideLeft, Trigger::Landed), Some(Grounded));
    }

    #[test]
    fn recovery_targets() {
        assert_eq!(next_state(Damaged, Trigger::RecoveryElapsed), Some(Falling));
        assert_eq!(next_state(Dying, Trigger::RecoveryElapsed), Some(Falling));
        assert_eq!(next_state(Dashing, Trigger::RecoveryElapsed), Some(Falling));
        assert_eq!(next_state(WallJump, Trigger::RecoveryElapsed), Some(Jumping));
        assert_eq!(next_state(Grounded, Trigger::RecoveryElapsed), None);
    }

    #[test]
    fn every_reachable_state_has_a_source() {
        // Apart from the initial state, each state is the target of some row.
        let triggers = [
            Trigger::Jump,
            Trigger::WallJump,
            Trigger::Dash,
            Trigger::Hit,
            Trigger::Killed,
            Trigger::WallContact(WallSide::Left),
            Trigger::WallContact(WallSide::Right),
            Trigger::WallDetached,
            Trigger::Landed,
            Trigger::GroundLost,
            Trigger::RecoveryElapsed,
            Trigger::JumpEnded,
        ];
        for target in MovementState::ALL {
            let reachable = MovementState::ALL
                .iter()
                .any(|&from| triggers.iter().any(|&t| next_state(from, t) == Some(target)));
            assert!(reachable, "{:?} unreachable", target);
        }
    }

    #[test]
    fn fire_tracks_entry_time() {
        let mut machine = StateMachine::new();
        assert!(machine.fire(Trigger::JumpEnded, 1.0).is_none());
        assert_eq!(machine.entered_at(), 0.0);

        let t = machine.fire(Trigger::Jump, 2.0).unwrap();
        assert!(t.changed());
        assert_eq!(machine.current(), Jumping);
        assert_eq!(machine.time_in_state(2.5), 0.5);
    }
}
