//! Simulated network between the two peers: fixed latency plus random
//! jitter on top of an in-process `PeerLink`.
//!
//! Lifecycle messages (spawn, death, despawn) travel in order and never
//! overtake anything sent before them. Snapshots and sound messages are
//! unordered, so jitter larger than the snapshot spacing reorders them.

use crate::config::NetworkConfig;
use netsync::{PeerLink, PeerMessage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug)]
struct InFlight {
    deliver_at: f32,
    order: u64,
    message: PeerMessage,
}

/// Delivery counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NetStats {
    pub sent: u64,
    pub delivered: u64,
    /// Messages delivered after one that was sent later.
    pub reordered: u64,
}

/// Sending end of the simulated link.
#[derive(Debug)]
pub struct SimulatedNetwork {
    link: PeerLink,
    latency: f32,
    jitter: f32,
    rng: StdRng,
    in_flight: Vec<InFlight>,
    next_order: u64,
    latest_delivery: f32,
    highest_delivered: Option<u64>,
    stats: NetStats,
}

fn is_ordered(message: &PeerMessage) -> bool {
    matches!(
        message,
        PeerMessage::Spawn { .. } | PeerMessage::Death { .. } | PeerMessage::Despawn { .. }
    )
}

impl SimulatedNetwork {
    pub fn new(link: PeerLink, config: &NetworkConfig, seed: u64) -> Self {
        Self {
            link,
            latency: config.latency.max(0.0),
            jitter: config.jitter.max(0.0),
            rng: StdRng::seed_from_u64(seed),
            in_flight: Vec::new(),
            next_order: 0,
            latest_delivery: 0.0,
            highest_delivered: None,
            stats: NetStats::default(),
        }
    }

    pub fn stats(&self) -> NetStats {
        self.stats
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Put `message` on the wire at time `now`.
    pub fn send(&mut self, message: PeerMessage, now: f32) {
        let mut deliver_at = now + self.latency;
        if is_ordered(&message) {
            deliver_at = deliver_at.max(self.latest_delivery);
        } else if self.jitter > 0.0 {
            deliver_at += self.rng.gen_range(0.0..self.jitter);
        }
        self.latest_delivery = self.latest_delivery.max(deliver_at);

        self.in_flight.push(InFlight {
            deliver_at,
            order: self.next_order,
            message,
        });
        self.next_order += 1;
        self.stats.sent += 1;
    }

    /// Hand every message due at `now` to the receiving end.
    pub fn pump(&mut self, now: f32) -> usize {
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|m| m.deliver_at <= now);
        self.in_flight = waiting;
        due.sort_by(|a, b| a.deliver_at.total_cmp(&b.deliver_at).then(a.order.cmp(&b.order)));

        let count = due.len();
        for InFlight { order, message, .. } in due {
            match self.highest_delivered {
                Some(highest) if order < highest => self.stats.reordered += 1,
                _ => self.highest_delivered = Some(order),
            }
            if self.link.send(message) {
                self.stats.delivered += 1;
            }
        }
        count
    }

    /// Deliver everything still in flight, regardless of time.
    pub fn flush(&mut self) -> usize {
        self.pump(f32::INFINITY)
    }
}
