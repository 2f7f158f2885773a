//! The two sides of a match: the owner simulates characters, the replica
//! peer mirrors them from snapshots.

use crate::config::RosterEntry;
use crate::level::Level;
use crate::script::{drive, ScriptedPlayer};
use glam::Vec2;
use hecs::World;
use input::ControlBindings;
use movement::{Character, MovementConfig, MovementState};
use netsync::{CharacterId, PeerLink, PeerMessage, ReconcileConfig, ReplicaEvent, ReplicaSet, SnapshotPublisher};

/// Drives one owner character.
pub struct Pilot(pub ScriptedPlayer);

/// Owning peer: authoritative characters stored in an ECS world.
pub struct OwnerPeer {
    world: World,
    publisher: SnapshotPublisher,
    next_id: u32,
}

impl OwnerPeer {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            world: World::new(),
            publisher: SnapshotPublisher::new(snapshot_interval),
            next_id: 1,
        }
    }

    /// Create a character for `entry`; returns its id and the spawn announcement.
    pub fn spawn(&mut self, entry: &RosterEntry, movement: &MovementConfig, seed: u64) -> (CharacterId, PeerMessage) {
        let id = CharacterId(self.next_id);
        self.next_id += 1;

        let position = Vec2::from(entry.spawn);
        let character = Character::new(
            entry.kind,
            position,
            movement.clone(),
            &entry.talent_ranks(),
            entry.powerups,
        );
        let pilot = Pilot(ScriptedPlayer::new(seed ^ u64::from(id.0), ControlBindings::default()));
        self.world.spawn((id, character, pilot));

        log::info!("Owner spawned {:?} as {:?}", entry.kind, id);
        (
            id,
            PeerMessage::Spawn {
                id,
                kind: entry.kind,
                position,
            },
        )
    }

    pub fn character_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Authoritative positions, by id.
    pub fn positions(&self) -> Vec<(CharacterId, Vec2)> {
        let mut positions: Vec<_> = self
            .world
            .query::<(&CharacterId, &Character)>()
            .iter()
            .map(|(_, (id, character))| (*id, character.position()))
            .collect();
        positions.sort_by_key(|(id, _)| *id);
        positions
    }

    /// Run one owner frame; outgoing messages are appended to `outbox`.
    pub fn frame(&mut self, dt: f32, level: &Level, outbox: &mut Vec<PeerMessage>) {
        let mut exiled = Vec::new();

        for (entity, (id, character, pilot)) in
            self.world.query_mut::<(&CharacterId, &mut Character, &mut Pilot)>()
        {
            rescue(character);

            let controls = pilot.0.frame(character.now());
            drive(character, &controls);
            let delta = character.tick(dt, level.geometry());
            if delta.state_changed() {
                log::debug!("{:?}: {:?} -> {:?}", id, delta.previous, delta.current);
            }

            if let Some(zone) = level.hazard_at(character.position()) {
                let away = (character.position() - Vec2::from(zone.center)).try_normalize().unwrap_or(Vec2::Y);
                character.apply_damage(away * zone.knockback, zone.damage, 0.0, zone.stun_time);
            }

            outbox.extend(self.publisher.relay(*id, &delta.events));
            if let Some(snapshot) = self.publisher.on_tick(*id, character) {
                outbox.push(snapshot);
            }

            let out_of_lives = character.vitals().is_some_and(|v| v.lives.is_out());
            if out_of_lives && character.state() != MovementState::Dying {
                exiled.push((entity, *id));
            }
        }

        self.resolve_attacks();

        for (entity, id) in exiled {
            log::info!("{:?} has no lives left and leaves the match", id);
            self.world.despawn(entity).ok();
            self.publisher.forget(id);
            outbox.push(PeerMessage::Despawn { id });
        }
    }

    /// Dashing nightmares hit the first standing explorer they overlap.
    /// Damage lands as a pending event and goes out with the next tick.
    fn resolve_attacks(&mut self) {
        let mut targets = Vec::new();
        let mut attackers = Vec::new();
        for (entity, (id, character)) in self.world.query::<(&CharacterId, &Character)>().iter() {
            match character.vitals() {
                Some(vitals) if !vitals.health.is_exhausted() => targets.push((entity, *id, character.bounds())),
                Some(_) => {}
                None if character.state() == MovementState::Dashing => {
                    attackers.push((entity, *id, character.bounds()))
                }
                None => {}
            }
        }

        for (attacker, attacker_id, reach) in attackers {
            let Some(&(victim, victim_id, _)) = targets.iter().find(|(_, _, bounds)| bounds.intersects(&reach)) else {
                continue;
            };
            let hit = match self.world.get::<&mut Character>(attacker) {
                Ok(mut character) => character
                    .strike()
                    .map(|impact| (impact, character.config().dash_attack_damage)),
                Err(_) => None,
            };
            let Some((impact, damage)) = hit else {
                continue;
            };
            if let Ok(mut target) = self.world.get::<&mut Character>(victim) {
                if target.apply_damage(impact, damage, 0.0, 0.0) {
                    log::info!("{:?} dashed into {:?} for {}", attacker_id, victim_id, damage);
                }
            }
        }
    }

    /// Remove every character, announcing each removal.
    pub fn despawn_all(&mut self) -> Vec<PeerMessage> {
        let ids: Vec<_> = self
            .world
            .query::<&CharacterId>()
            .iter()
            .map(|(entity, id)| (entity, *id))
            .collect();
        ids.into_iter()
            .map(|(entity, id)| {
                self.world.despawn(entity).ok();
                self.publisher.forget(id);
                PeerMessage::Despawn { id }
            })
            .collect()
    }
}

/// Teammates pick a downed explorer back up once the death animation ends.
fn rescue(character: &mut Character) {
    let downed = character
        .vitals()
        .is_some_and(|v| v.health.is_exhausted() && !v.lives.is_out());
    if downed && character.state() != MovementState::Dying {
        character.revive();
    }
}

/// What the replica peer has seen so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaStats {
    pub applied: u64,
    pub snapped: u64,
    pub dropped: u64,
    pub rejected: u64,
    pub sounds: u64,
    pub deaths: u64,
}

/// Receiving peer: replicas only, no authority.
pub struct ReplicaPeer {
    link: PeerLink,
    replicas: ReplicaSet,
    stats: ReplicaStats,
}

impl ReplicaPeer {
    pub fn new(link: PeerLink, movement: MovementConfig, reconcile: ReconcileConfig) -> Self {
        Self {
            link,
            replicas: ReplicaSet::new(movement, reconcile),
            stats: ReplicaStats::default(),
        }
    }

    pub fn replicas(&self) -> &ReplicaSet {
        &self.replicas
    }

    pub fn stats(&self) -> ReplicaStats {
        self.stats
    }

    /// Apply everything that arrived, then advance every replica.
    pub fn frame(&mut self, dt: f32, level: &Level) {
        for message in self.link.drain() {
            let id = message.character();
            match self.replicas.dispatch(message) {
                Ok(event) => self.record(event),
                Err(err) => {
                    log::warn!("Dropped message for {:?}: {}", id, err);
                    self.stats.rejected += 1;
                }
            }
        }
        self.replicas.tick(dt, Some(level.geometry()));
    }

    fn record(&mut self, event: ReplicaEvent) {
        let stats = &mut self.stats;
        match event {
            ReplicaEvent::SnapshotApplied { snapped, .. } => {
                stats.applied += 1;
                if snapped {
                    stats.snapped += 1;
                }
            }
            ReplicaEvent::SnapshotDropped(_) => stats.dropped += 1,
            ReplicaEvent::Jumped { .. } | ReplicaEvent::Dashed(_) | ReplicaEvent::Damaged { .. } => {
                stats.sounds += 1
            }
            ReplicaEvent::Died { .. } => stats.deaths += 1,
            ReplicaEvent::Spawned(_) | ReplicaEvent::Despawned(_) => {}
        }
    }
}
