//! Non-owner view of a character.
//!
//! A replica never runs the movement state machine or the integrator. It
//! copies snapshots verbatim, extrapolates along the last received
//! velocity, and reconciles its displayed position toward each new
//! authoritative one.

use engine_core::{Aabb, Facing};
use glam::Vec2;
use movement::{CharacterKind, CollisionResolver, MovementConfig, MovementState};
use physics::RayCaster;

use crate::reconcile::{Correction, ReconcileConfig, Reconciler};
use crate::snapshot::{CharacterId, ExplorerExtension, NetworkSnapshot, SnapshotFrame, SnapshotLayout};

/// Result of offering a frame to a replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { snapped: bool },
    /// A newer frame was already applied.
    Stale,
    /// Non-finite kinematics.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Replica {
    id: CharacterId,
    kind: CharacterKind,
    authoritative: NetworkSnapshot,
    extension: Option<ExplorerExtension>,
    displayed: Vec2,
    last_sequence: Option<u32>,
    reconciler: Reconciler,
    resolver: CollisionResolver,
    half_extents: Vec2,
    facing: Facing,
}

impl Replica {
    pub fn new(
        id: CharacterId,
        kind: CharacterKind,
        position: Vec2,
        movement: &MovementConfig,
        reconcile: ReconcileConfig,
    ) -> Self {
        let [hx, hy] = movement.half_extents;
        Self {
            id,
            kind,
            authoritative: NetworkSnapshot::at_rest(position),
            extension: None,
            displayed: position,
            last_sequence: None,
            reconciler: Reconciler::new(reconcile),
            resolver: CollisionResolver::from_config(movement),
            half_extents: Vec2::new(hx, hy),
            facing: Facing::default(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn kind(&self) -> CharacterKind {
        self.kind
    }

    pub fn layout(&self) -> SnapshotLayout {
        SnapshotLayout::for_kind(self.kind)
    }

    /// Movement state exactly as last received.
    pub fn state(&self) -> MovementState {
        self.authoritative.state
    }

    pub fn authoritative(&self) -> &NetworkSnapshot {
        &self.authoritative
    }

    pub fn extension(&self) -> Option<&ExplorerExtension> {
        self.extension.as_ref()
    }

    pub fn displayed(&self) -> Vec2 {
        self.displayed
    }

    pub fn offset(&self) -> Vec2 {
        self.reconciler.offset()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn last_sequence(&self) -> Option<u32> {
        self.last_sequence
    }

    /// Take a frame. Frames older than the newest applied one are dropped;
    /// a repeat of the newest is applied again.
    pub fn apply_frame(&mut self, frame: SnapshotFrame) -> ApplyOutcome {
        let sequence = frame.header.sequence;
        if self.last_sequence.is_some_and(|last| is_older(sequence, last)) {
            log::debug!(
                "Dropped stale frame {} for {:?} (have {:?})",
                sequence,
                self.id,
                self.last_sequence
            );
            return ApplyOutcome::Stale;
        }
        let base = frame.base;
        if !(base.position.is_finite() && base.velocity.is_finite() && base.controller.is_finite()) {
            log::warn!("Rejected non-finite frame {} for {:?}", sequence, self.id);
            return ApplyOutcome::Rejected;
        }

        self.last_sequence = Some(sequence);
        self.authoritative = base;
        if frame.extension.is_some() {
            self.extension = frame.extension;
        }

        let snapped = match self.reconciler.on_authoritative(self.displayed, base.position) {
            Correction::Snap(position) => {
                log::debug!("{:?} snapped {:.2} units", self.id, (position - self.displayed).length());
                self.displayed = position;
                true
            }
            Correction::Deferred(_) => false,
        };
        ApplyOutcome::Applied { snapped }
    }

    /// Advance the displayed position by one local frame and return it.
    pub fn tick(&mut self, dt: f32, geometry: Option<&dyn RayCaster>) -> Vec2 {
        if !(dt > 0.0 && dt.is_finite()) {
            return self.displayed;
        }

        if self.reconciler.config().extrapolate {
            let step = self.extrapolation(self.authoritative.velocity * dt, geometry);
            self.displayed += step;
            if let Some(facing) = Facing::from_motion(step.x) {
                self.facing = facing;
            }
        }
        self.displayed += self.reconciler.bleed(dt);
        self.displayed
    }

    fn extrapolation(&self, delta: Vec2, geometry: Option<&dyn RayCaster>) -> Vec2 {
        let Some(geometry) = geometry else {
            return delta;
        };
        let bounds = Aabb::from_center(self.displayed, self.half_extents);
        let horizontal = self.resolver.sweep_horizontal(bounds, delta.x, geometry);
        let shifted = bounds.translate(Vec2::new(horizontal.distance, 0.0));
        let vertical = self.resolver.sweep_vertical(shifted, delta.y, geometry);
        Vec2::new(horizontal.distance, vertical.distance)
    }
}

/// Sequence comparison that survives wraparound: `sequence` is older when
/// it sits less than half the number space behind `last`.
fn is_older(sequence: u32, last: u32) -> bool {
    (last.wrapping_sub(sequence) as i32) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::FrameHeader;
    use physics::SolidWorld;

    const DT: f32 = 1.0 / 60.0;

    fn replica(kind: CharacterKind, config: ReconcileConfig) -> Replica {
        Replica::new(CharacterId(1), kind, Vec2::ZERO, &MovementConfig::default(), config)
    }

    fn still() -> ReconcileConfig {
        ReconcileConfig {
            extrapolate: false,
            ..Default::default()
        }
    }

    fn frame(sequence: u32, position: Vec2, velocity: Vec2) -> SnapshotFrame {
        SnapshotFrame {
            header: FrameHeader {
                character: CharacterId(1),
                sequence,
            },
            base: NetworkSnapshot {
                velocity,
                state: MovementState::Falling,
                ..NetworkSnapshot::at_rest(position)
            },
            extension: None,
        }
    }

    #[test]
    fn large_divergence_snaps_on_apply() {
        let mut replica = replica(CharacterKind::Goblin, still());
        let target = Vec2::new(5.0, 0.0);
        assert_eq!(
            replica.apply_frame(frame(1, target, Vec2::ZERO)),
            ApplyOutcome::Applied { snapped: true }
        );
        assert_eq!(replica.displayed(), target);
        assert_eq!(replica.offset(), Vec2::ZERO);
        assert_eq!(replica.tick(DT, None), target);
    }

    #[test]
    fn small_divergence_converges_smoothly() {
        let mut replica = replica(CharacterKind::Goblin, still());
        let target = Vec2::new(0.0, 1.0);
        replica.apply_frame(frame(1, target, Vec2::ZERO));
        assert_eq!(replica.displayed(), Vec2::ZERO);

        let mut ticks = 0;
        while (replica.displayed() - target).length() >= 0.01 {
            let y = replica.tick(DT, None).y;
            assert!(y <= 1.0 + 1e-6);
            ticks += 1;
            assert!(ticks <= 17);
        }
    }

    #[test]
    fn stale_frames_are_dropped() {
        let mut replica = replica(CharacterKind::Specter, still());
        replica.apply_frame(frame(5, Vec2::new(1.0, 0.0), Vec2::ZERO));
        assert_eq!(
            replica.apply_frame(frame(4, Vec2::new(2.0, 0.0), Vec2::ZERO)),
            ApplyOutcome::Stale
        );
        assert_eq!(replica.authoritative().position, Vec2::new(1.0, 0.0));
        assert_eq!(replica.last_sequence(), Some(5));

        // Equal sequence is not older.
        assert!(matches!(
            replica.apply_frame(frame(5, Vec2::new(1.5, 0.0), Vec2::ZERO)),
            ApplyOutcome::Applied { .. }
        ));
    }

    #[test]
    fn sequence_wraps_around() {
        let mut replica = replica(CharacterKind::Specter, still());
        replica.apply_frame(frame(u32::MAX, Vec2::ZERO, Vec2::ZERO));
        assert!(matches!(
            replica.apply_frame(frame(0, Vec2::new(1.0, 0.0), Vec2::ZERO)),
            ApplyOutcome::Applied { .. }
        ));
        assert_eq!(replica.last_sequence(), Some(0));
        assert_eq!(
            replica.apply_frame(frame(u32::MAX - 1, Vec2::ZERO, Vec2::ZERO)),
            ApplyOutcome::Stale
        );
        assert_eq!(replica.authoritative().position, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn state_is_copied_verbatim() {
        let mut replica = replica(CharacterKind::Goblin, still());
        let mut next = frame(1, Vec2::ZERO, Vec2::ZERO);
        next.base.state = MovementState::Dying;
        replica.apply_frame(next);
        for _ in 0..600 {
            replica.tick(DT, None);
        }
        assert_eq!(replica.state(), MovementState::Dying);
    }

    #[test]
    fn non_finite_frames_are_rejected() {
        let mut replica = replica(CharacterKind::Goblin, still());
        let outcome = replica.apply_frame(frame(1, Vec2::new(f32::NAN, 0.0), Vec2::ZERO));
        assert_eq!(outcome, ApplyOutcome::Rejected);
        assert_eq!(replica.last_sequence(), None);
        assert_eq!(replica.displayed(), Vec2::ZERO);
    }

    #[test]
    fn extrapolation_follows_velocity_and_stops_at_walls() {
        let mut world = SolidWorld::new();
        world.add_solid_box(Vec2::new(2.0, 0.0), Vec2::new(0.5, 5.0));
        world.update_query_pipeline();

        let mut replica = replica(CharacterKind::Specter, ReconcileConfig::default());
        replica.apply_frame(frame(1, Vec2::ZERO, Vec2::new(6.0, 0.0)));
        for _ in 0..60 {
            replica.tick(DT, Some(&world));
        }
        // Right edge stays left of the wall face at 1.5.
        assert!(replica.displayed().x + 0.4 <= 1.5);
        assert!(replica.displayed().x > 1.0);
        assert_eq!(replica.facing(), Facing::Right);
    }

    #[test]
    fn extension_is_kept_until_replaced() {
        let mut replica = replica(CharacterKind::DoubleJumpExplorer, still());
        let mut first = frame(1, Vec2::ZERO, Vec2::ZERO);
        first.extension = Some(ExplorerExtension {
            health: 80,
            lives: 3,
            light_active: true,
        });
        replica.apply_frame(first);
        replica.apply_frame(frame(2, Vec2::ZERO, Vec2::ZERO));
        assert_eq!(replica.extension().map(|e| e.health), Some(80));
        assert_eq!(replica.layout(), SnapshotLayout::Explorer);
    }
}
