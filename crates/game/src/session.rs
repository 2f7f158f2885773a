//! A headless match: owner peer, simulated network and replica peer
//! stepped together by a frame-coupled loop with variable frame times.

use crate::config::GameConfig;
use crate::level::Level;
use crate::net_sim::{NetStats, SimulatedNetwork};
use crate::peer::{OwnerPeer, ReplicaPeer, ReplicaStats};
use anyhow::{bail, Context, Result};
use engine_core::Time;
use netsync::PeerLink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Summary logged when a match ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchReport {
    pub frames: u64,
    pub seconds: f32,
    pub survivors: usize,
    pub network: NetStats,
    pub replica: ReplicaStats,
    /// Largest owner/replica position gap seen at the end of a frame.
    pub max_divergence: f32,
}

pub struct Session {
    frames: u32,
    frame_time: (f32, f32),
    rng: StdRng,
    time: Time,
    owner: OwnerPeer,
    owner_level: Level,
    network: SimulatedNetwork,
    replica: ReplicaPeer,
    replica_level: Level,
    outbox: Vec<netsync::PeerMessage>,
    max_divergence: f32,
}

impl Session {
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.movement.validate().context("movement config")?;
        if config.roster.is_empty() {
            bail!("roster is empty, nothing to simulate");
        }

        let (owner_end, replica_end) = PeerLink::pair();
        let frame_time = config.frame_time_range();
        let mut time = Time::new();
        time.set_max_delta(frame_time.1);
        let mut session = Self {
            frames: config.frames,
            frame_time,
            rng: StdRng::seed_from_u64(config.seed),
            time,
            owner: OwnerPeer::new(config.snapshot_interval),
            owner_level: Level::build(&config.level),
            network: SimulatedNetwork::new(owner_end, &config.network, config.seed.rotate_left(17)),
            replica: ReplicaPeer::new(replica_end, config.movement.clone(), config.reconcile.clone()),
            replica_level: Level::build(&config.level),
            outbox: Vec::new(),
            max_divergence: 0.0,
        };

        for entry in &config.roster {
            let (_, spawn) = session.owner.spawn(entry, &config.movement, config.seed);
            session.network.send(spawn, 0.0);
        }
        Ok(session)
    }

    /// One frame on both peers.
    pub fn step(&mut self) {
        let (min, max) = self.frame_time;
        let dt = if max > min { self.rng.gen_range(min..=max) } else { min };
        self.time.advance(dt);
        let dt = self.time.delta_seconds();
        let now = self.time.elapsed_seconds();

        self.owner.frame(dt, &self.owner_level, &mut self.outbox);
        for message in self.outbox.drain(..) {
            self.network.send(message, now);
        }
        self.network.pump(now);
        self.replica.frame(dt, &self.replica_level);

        let divergence = self.divergence();
        self.max_divergence = self.max_divergence.max(divergence);
        if self.time.frame_count() % 600 == 0 {
            log::debug!(
                "t={:.1}s ({:.0} fps) divergence {:.3}, {} in flight",
                now,
                self.time.fps(),
                divergence,
                self.network.in_flight()
            );
        }
    }

    /// Largest distance between an owner character and its replica.
    pub fn divergence(&self) -> f32 {
        self.owner
            .positions()
            .into_iter()
            .filter_map(|(id, position)| {
                self.replica
                    .replicas()
                    .get(id)
                    .map(|replica| replica.displayed().distance(position))
            })
            .fold(0.0, f32::max)
    }

    /// Run every configured frame, then tear the match down.
    pub fn run(mut self) -> MatchReport {
        for _ in 0..self.frames {
            self.step();
        }
        let survivors = self.owner.character_count();

        let now = self.time.elapsed_seconds();
        for message in self.owner.despawn_all() {
            self.network.send(message, now);
        }
        self.network.flush();
        self.replica.frame(0.0, &self.replica_level);
        if !self.replica.replicas().is_empty() {
            log::warn!("{} replicas outlived the match", self.replica.replicas().len());
        }

        MatchReport {
            frames: self.time.frame_count(),
            seconds: now,
            survivors,
            network: self.network.stats(),
            replica: self.replica.stats(),
            max_divergence: self.max_divergence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;

    fn short_match(network: NetworkConfig) -> GameConfig {
        GameConfig {
            frames: 300,
            network,
            ..Default::default()
        }
    }

    #[test]
    fn empty_roster_is_an_error() {
        let config = GameConfig {
            roster: Vec::new(),
            ..Default::default()
        };
        assert!(Session::new(&config).is_err());
    }

    #[test]
    fn invalid_movement_config_is_an_error() {
        let mut config = GameConfig::default();
        config.movement.max_speed = -1.0;
        let err = Session::new(&config).err().unwrap();
        assert!(format!("{:#}", err).contains("movement config"));
    }

    #[test]
    fn instant_network_replicates_every_snapshot() {
        let config = short_match(NetworkConfig {
            latency: 0.0,
            jitter: 0.0,
        });
        let report = Session::new(&config).unwrap().run();
        assert_eq!(report.frames, 300);
        assert_eq!(report.network.reordered, 0);
        assert_eq!(report.network.sent, report.network.delivered);
        assert_eq!(report.replica.rejected, 0);
        assert_eq!(report.replica.dropped, 0);
        // Four characters, one snapshot every three frames each.
        assert_eq!(report.replica.applied, 4 * 100);
    }

    #[test]
    fn jittery_network_still_converges_on_teardown() {
        let config = short_match(NetworkConfig {
            latency: 0.08,
            jitter: 0.2,
        });
        let report = Session::new(&config).unwrap().run();
        assert!(report.replica.applied > 0);
        assert_eq!(report.replica.rejected, 0);
        assert_eq!(report.network.sent, report.network.delivered);
    }

    #[test]
    fn same_seed_same_match() {
        let config = short_match(NetworkConfig::default());
        let a = Session::new(&config).unwrap().run();
        let b = Session::new(&config).unwrap().run();
        assert_eq!(a, b);
    }
}
