//! Owner-side snapshot cadence and event relay.

use std::collections::HashMap;

use movement::{Character, MovementEvent};

use crate::codec::encode_frame;
use crate::message::PeerMessage;
use crate::snapshot::{CharacterId, SnapshotFrame};

#[derive(Debug, Default, Clone, Copy)]
struct Cadence {
    ticks: u32,
    sequence: u32,
}

/// Emits one snapshot per character every `interval` owner ticks.
#[derive(Debug)]
pub struct SnapshotPublisher {
    interval: u32,
    cadence: HashMap<CharacterId, Cadence>,
}

impl SnapshotPublisher {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            cadence: HashMap::new(),
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Count one owner tick for `id`; returns a snapshot when one is due.
    /// The first tick of every character always publishes.
    pub fn on_tick(&mut self, id: CharacterId, character: &Character) -> Option<PeerMessage> {
        let interval = self.interval;
        let cadence = self.cadence.entry(id).or_default();
        let due = cadence.ticks % interval == 0;
        cadence.ticks = cadence.ticks.wrapping_add(1);
        if !due {
            return None;
        }

        let sequence = cadence.sequence;
        cadence.sequence = cadence.sequence.wrapping_add(1);
        let frame = SnapshotFrame::capture(id, sequence, character);
        match encode_frame(&frame) {
            Ok(payload) => {
                log::trace!("Snapshot {} for {:?} ({} bytes)", sequence, id, payload.len());
                Some(PeerMessage::Snapshot { id, payload })
            }
            Err(err) => {
                log::warn!("Failed to encode snapshot for {:?}: {}", id, err);
                None
            }
        }
    }

    /// Replicated messages for the events of one owner tick.
    pub fn relay(&self, id: CharacterId, events: &[MovementEvent]) -> Vec<PeerMessage> {
        events
            .iter()
            .filter_map(|event| PeerMessage::from_event(id, event))
            .collect()
    }

    /// Forget a removed character.
    pub fn forget(&mut self, id: CharacterId) {
        self.cadence.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_frame;
    use crate::snapshot::SnapshotLayout;
    use glam::Vec2;
    use movement::{CharacterKind, MovementConfig, Powerups, TalentRanks};

    fn goblin() -> Character {
        Character::new(
            CharacterKind::Goblin,
            Vec2::new(2.0, 3.0),
            MovementConfig::default(),
            &TalentRanks::new(),
            Powerups::default(),
        )
    }

    #[test]
    fn publishes_every_interval_with_rising_sequence() {
        let mut publisher = SnapshotPublisher::new(3);
        let character = goblin();
        let id = CharacterId(4);

        let mut sequences = Vec::new();
        for tick in 0..9 {
            if let Some(PeerMessage::Snapshot { payload, .. }) = publisher.on_tick(id, &character) {
                assert_eq!(tick % 3, 0);
                let frame = decode_frame(&payload, SnapshotLayout::Base).unwrap();
                assert_eq!(frame.header.character, id);
                assert_eq!(frame.base.position, Vec2::new(2.0, 3.0));
                sequences.push(frame.header.sequence);
            }
        }
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn characters_have_independent_sequences() {
        let mut publisher = SnapshotPublisher::new(1);
        let character = goblin();
        publisher.on_tick(CharacterId(1), &character);
        publisher.on_tick(CharacterId(1), &character);
        let Some(PeerMessage::Snapshot { payload, .. }) = publisher.on_tick(CharacterId(2), &character) else {
            panic!("expected a snapshot");
        };
        let frame = decode_frame(&payload, SnapshotLayout::Base).unwrap();
        assert_eq!(frame.header.sequence, 0);
    }

    #[test]
    fn relay_filters_events() {
        let publisher = SnapshotPublisher::new(1);
        let events = [
            MovementEvent::DashTriggered,
            MovementEvent::StateChanged(movement::MovementState::Dashing),
        ];
        assert_eq!(
            publisher.relay(CharacterId(1), &events),
            vec![PeerMessage::Dash { id: CharacterId(1) }]
        );
    }
}
