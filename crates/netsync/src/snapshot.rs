//! Snapshot records sent from the owning peer to replicas.

use glam::Vec2;
use movement::{Character, CharacterKind, MovementState};
use serde::{Deserialize, Serialize};

/// Network identity of a character, assigned by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub u32);

/// Base snapshot fields. Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub state: MovementState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub controller: Vec2,
    pub primary_held: bool,
    pub secondary_held: bool,
    pub grab_held: bool,
}

impl NetworkSnapshot {
    pub fn capture(character: &Character) -> Self {
        let body = character.body();
        Self {
            state: character.state(),
            position: body.position,
            velocity: body.velocity,
            controller: body.controller,
            primary_held: body.primary_held,
            secondary_held: body.secondary_held,
            grab_held: body.grab_held,
        }
    }

    /// Resting snapshot used before the first frame arrives.
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            state: MovementState::Grounded,
            position,
            velocity: Vec2::ZERO,
            controller: Vec2::ZERO,
            primary_held: false,
            secondary_held: false,
            grab_held: false,
        }
    }
}

/// Explorer vitals appended after the base fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerExtension {
    pub health: i32,
    pub lives: i32,
    pub light_active: bool,
}

impl ExplorerExtension {
    pub fn capture(character: &Character) -> Option<Self> {
        character.vitals().map(|vitals| Self {
            health: vitals.health.current,
            lives: vitals.lives.remaining,
            light_active: vitals.light_active,
        })
    }
}

/// Which fields follow the base set. Both ends derive it from the kind,
/// since nothing on the wire says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotLayout {
    Base,
    Explorer,
}

impl SnapshotLayout {
    pub fn for_kind(kind: CharacterKind) -> Self {
        if kind.has_vitals() {
            SnapshotLayout::Explorer
        } else {
            SnapshotLayout::Base
        }
    }
}

/// Sequencing header written ahead of the snapshot fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub character: CharacterId,
    pub sequence: u32,
}

/// One complete network frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotFrame {
    pub header: FrameHeader,
    pub base: NetworkSnapshot,
    pub extension: Option<ExplorerExtension>,
}

impl SnapshotFrame {
    pub fn capture(id: CharacterId, sequence: u32, character: &Character) -> Self {
        Self {
            header: FrameHeader {
                character: id,
                sequence,
            },
            base: NetworkSnapshot::capture(character),
            extension: ExplorerExtension::capture(character),
        }
    }

    pub fn layout(&self) -> SnapshotLayout {
        match self.extension {
            Some(_) => SnapshotLayout::Explorer,
            None => SnapshotLayout::Base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movement::{MovementConfig, Powerups, TalentRanks};

    fn spawn(kind: CharacterKind) -> Character {
        Character::new(kind, Vec2::new(1.0, 2.0), MovementConfig::default(), &TalentRanks::new(), Powerups::default())
    }

    #[test]
    fn capture_copies_owner_state() {
        let mut character = spawn(CharacterKind::Goblin);
        character.set_controller_input(Vec2::new(-0.5, 0.25), true);
        character.trigger_primary_action();

        let snapshot = NetworkSnapshot::capture(&character);
        assert_eq!(snapshot.state, MovementState::Jumping);
        assert_eq!(snapshot.position, Vec2::new(1.0, 2.0));
        assert_eq!(snapshot.controller, Vec2::new(-0.5, 0.25));
        assert!(snapshot.primary_held);
        assert!(!snapshot.secondary_held);
        assert!(snapshot.grab_held);
    }

    #[test]
    fn only_explorers_carry_extension() {
        let explorer = SnapshotFrame::capture(CharacterId(1), 0, &spawn(CharacterKind::DoubleJumpExplorer));
        assert_eq!(explorer.layout(), SnapshotLayout::Explorer);
        assert_eq!(
            explorer.extension,
            Some(ExplorerExtension {
                health: 100,
                lives: 3,
                light_active: true
            })
        );

        let goblin = SnapshotFrame::capture(CharacterId(2), 0, &spawn(CharacterKind::Goblin));
        assert_eq!(goblin.layout(), SnapshotLayout::for_kind(CharacterKind::Goblin));
        assert!(goblin.extension.is_none());
    }
}
