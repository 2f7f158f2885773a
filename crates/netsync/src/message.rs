//! Typed messages exchanged between peers.

use glam::Vec2;
use movement::{CharacterKind, MovementEvent};
use serde::{Deserialize, Serialize};

use crate::snapshot::CharacterId;

/// Everything an owner tells the other peers about its characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PeerMessage {
    Spawn {
        id: CharacterId,
        kind: CharacterKind,
        position: Vec2,
    },
    /// Positionally encoded `SnapshotFrame`; the layout follows from the
    /// kind announced in `Spawn`.
    Snapshot { id: CharacterId, payload: Vec<u8> },
    Jump { id: CharacterId, is_double: bool },
    Dash { id: CharacterId },
    Damage { id: CharacterId, amount: i32 },
    Death { id: CharacterId, lives_remaining: i32 },
    Despawn { id: CharacterId },
}

impl PeerMessage {
    pub fn character(&self) -> CharacterId {
        match self {
            PeerMessage::Spawn { id, .. }
            | PeerMessage::Snapshot { id, .. }
            | PeerMessage::Jump { id, .. }
            | PeerMessage::Dash { id }
            | PeerMessage::Damage { id, .. }
            | PeerMessage::Death { id, .. }
            | PeerMessage::Despawn { id } => *id,
        }
    }

    /// The replicated form of an owner-side event, if replicas care about it.
    /// State changes and collisions are not relayed; snapshots carry state.
    pub fn from_event(id: CharacterId, event: &MovementEvent) -> Option<Self> {
        match *event {
            MovementEvent::JumpTriggered { is_double } => Some(PeerMessage::Jump { id, is_double }),
            MovementEvent::DashTriggered => Some(PeerMessage::Dash { id }),
            MovementEvent::DamageTaken { amount } => Some(PeerMessage::Damage { id, amount }),
            MovementEvent::DeathThresholdReached { lives_remaining } => {
                Some(PeerMessage::Death { id, lives_remaining })
            }
            MovementEvent::StateChanged(_) | MovementEvent::Collision { .. } => None,
        }
    }
}

/// What a receiving peer observed after dispatching a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicaEvent {
    Spawned(CharacterId),
    Despawned(CharacterId),
    SnapshotApplied { id: CharacterId, snapped: bool },
    SnapshotDropped(CharacterId),
    Jumped { id: CharacterId, is_double: bool },
    Dashed(CharacterId),
    Damaged { id: CharacterId, amount: i32 },
    Died { id: CharacterId, lives_remaining: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use movement::{Axis, Direction, MovementState};

    #[test]
    fn only_sound_events_are_relayed() {
        let id = CharacterId(3);
        assert_eq!(
            PeerMessage::from_event(id, &MovementEvent::JumpTriggered { is_double: true }),
            Some(PeerMessage::Jump { id, is_double: true })
        );
        assert_eq!(
            PeerMessage::from_event(id, &MovementEvent::DeathThresholdReached { lives_remaining: 1 }),
            Some(PeerMessage::Death {
                id,
                lives_remaining: 1
            })
        );
        assert_eq!(
            PeerMessage::from_event(id, &MovementEvent::StateChanged(MovementState::Falling)),
            None
        );
        assert_eq!(
            PeerMessage::from_event(
                id,
                &MovementEvent::Collision {
                    axis: Axis::Vertical,
                    direction: Direction::Negative
                }
            ),
            None
        );
    }

    #[test]
    fn every_message_names_its_character() {
        let id = CharacterId(9);
        let messages = [
            PeerMessage::Spawn {
                id,
                kind: CharacterKind::Goblin,
                position: Vec2::ZERO,
            },
            PeerMessage::Snapshot { id, payload: Vec::new() },
            PeerMessage::Dash { id },
            PeerMessage::Despawn { id },
        ];
        assert!(messages.iter().all(|m| m.character() == id));
    }
}
