//! Receiving-side dispatcher: maps each peer message to the local mutation.

use std::collections::BTreeMap;

use movement::MovementConfig;
use physics::RayCaster;

use crate::codec::{decode_frame, CodecError};
use crate::message::{PeerMessage, ReplicaEvent};
use crate::reconcile::ReconcileConfig;
use crate::replica::{ApplyOutcome, Replica};
use crate::snapshot::CharacterId;

/// All replicas known to one peer.
#[derive(Debug)]
pub struct ReplicaSet {
    movement: MovementConfig,
    reconcile: ReconcileConfig,
    replicas: BTreeMap<CharacterId, Replica>,
}

impl ReplicaSet {
    pub fn new(movement: MovementConfig, reconcile: ReconcileConfig) -> Self {
        Self {
            movement,
            reconcile,
            replicas: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: CharacterId) -> Option<&Replica> {
        self.replicas.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replica> {
        self.replicas.values()
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Apply one message. Snapshots for unknown characters or with the
    /// wrong shape are errors; the caller decides how loudly to drop them.
    pub fn dispatch(&mut self, message: PeerMessage) -> Result<ReplicaEvent, CodecError> {
        let event = match message {
            PeerMessage::Spawn { id, kind, position } => {
                let replica = Replica::new(id, kind, position, &self.movement, self.reconcile.clone());
                if self.replicas.insert(id, replica).is_some() {
                    log::warn!("Respawned replica {:?}", id);
                } else {
                    log::debug!("Spawned replica {:?} ({:?})", id, kind);
                }
                ReplicaEvent::Spawned(id)
            }
            PeerMessage::Snapshot { id, payload } => {
                let replica = self.replicas.get_mut(&id).ok_or(CodecError::UnknownLayout(id))?;
                let frame = decode_frame(&payload, replica.layout())?;
                if frame.header.character != id {
                    log::warn!("Snapshot for {:?} carried header {:?}", id, frame.header.character);
                    return Ok(ReplicaEvent::SnapshotDropped(id));
                }
                match replica.apply_frame(frame) {
                    ApplyOutcome::Applied { snapped } => ReplicaEvent::SnapshotApplied { id, snapped },
                    ApplyOutcome::Stale | ApplyOutcome::Rejected => ReplicaEvent::SnapshotDropped(id),
                }
            }
            PeerMessage::Jump { id, is_double } => ReplicaEvent::Jumped { id, is_double },
            PeerMessage::Dash { id } => ReplicaEvent::Dashed(id),
            PeerMessage::Damage { id, amount } => ReplicaEvent::Damaged { id, amount },
            PeerMessage::Death { id, lives_remaining } => {
                log::info!("Replica {:?} reached its death threshold ({} lives left)", id, lives_remaining);
                ReplicaEvent::Died { id, lives_remaining }
            }
            PeerMessage::Despawn { id } => {
                self.replicas.remove(&id);
                ReplicaEvent::Despawned(id)
            }
        };
        Ok(event)
    }

    /// Advance every replica by one local frame.
    pub fn tick(&mut self, dt: f32, geometry: Option<&dyn RayCaster>) {
        for replica in self.replicas.values_mut() {
            replica.tick(dt, geometry);
        }
    }
}
