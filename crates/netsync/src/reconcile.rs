//! Replica position reconciliation.
//!
//! A new authoritative position either snaps the displayed position (large
//! divergence) or becomes an offset that is bled off a fraction at a time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Reconciliation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Divergence above which the replica teleports.
    pub snap_distance: f32,
    /// Offsets shorter than this are applied in full.
    pub settle_distance: f32,
    /// Share of the offset applied per tick.
    pub decay_fraction: f32,
    /// When set, `decay_fraction` is per tick at this rate and scales with
    /// the actual frame time. When unset it applies once per tick.
    pub reference_rate_hz: Option<f32>,
    /// Advance replicas by their last received velocity between snapshots.
    pub extrapolate: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            snap_distance: 3.0,
            settle_distance: 0.1,
            decay_fraction: 0.25,
            reference_rate_hz: None,
            extrapolate: true,
        }
    }
}

/// How a replica should treat a new authoritative position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Jump straight to the authoritative position.
    Snap(Vec2),
    /// Keep the displayed position; bleed this offset over later ticks.
    Deferred(Vec2),
}

/// Pending positional correction of one replica.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
    offset: Vec2,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            offset: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_settled(&self) -> bool {
        self.offset == Vec2::ZERO
    }

    /// Replace the pending offset with the divergence to `authoritative`.
    pub fn on_authoritative(&mut self, displayed: Vec2, authoritative: Vec2) -> Correction {
        let delta = authoritative - displayed;
        if delta.length() > self.config.snap_distance {
            self.offset = Vec2::ZERO;
            Correction::Snap(authoritative)
        } else {
            self.offset = delta;
            Correction::Deferred(delta)
        }
    }

    /// Portion of the offset to apply this tick; the rest is retained.
    pub fn bleed(&mut self, dt: f32) -> Vec2 {
        if self.offset == Vec2::ZERO {
            return Vec2::ZERO;
        }
        if self.offset.length() < self.config.settle_distance {
            return std::mem::take(&mut self.offset);
        }
        let step = self.offset * self.fraction(dt);
        self.offset -= step;
        step
    }

    fn fraction(&self, dt: f32) -> f32 {
        let per_tick = self.config.decay_fraction.clamp(0.0, 1.0);
        match self.config.reference_rate_hz {
            Some(rate) if rate > 0.0 && dt.is_finite() && dt > 0.0 => {
                1.0 - (1.0 - per_tick).powf(dt * rate)
            }
            _ => per_tick,
        }
    }

    pub fn clear(&mut self) {
        self.offset = Vec2::ZERO;
    }
}
