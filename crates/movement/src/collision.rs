//! Raycast collision resolver.
//!
//! Displacement is resolved one axis at a time: horizontal first, then
//! vertical, then a diagonal corner check when neither axis was blocked.
//! Rays start on a slightly shrunken copy of the character box and are
//! pushed outward by the skin, so a character resting flush against a
//! surface still detects it at distance zero.

use engine_core::Aabb;
use glam::Vec2;
use physics::RayCaster;

use crate::config::MovementConfig;
use crate::events::Axis;
use crate::state::MovementState;

/// Outcome of sweeping one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSweep {
    /// Signed displacement that is safe to apply.
    pub distance: f32,
    pub blocked: bool,
}

impl AxisSweep {
    fn free(distance: f32) -> Self {
        Self {
            distance,
            blocked: false,
        }
    }
}

/// Casts the movement rays for a character box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    num_rays: u32,
    skin: f32,
}

impl CollisionResolver {
    pub fn new(num_rays: u32, skin: f32) -> Self {
        Self {
            num_rays: num_rays.max(1),
            skin: skin.max(0.0),
        }
    }

    pub fn from_config(config: &MovementConfig) -> Self {
        Self::new(config.num_rays, config.ray_bound_shrinkage)
    }

    pub fn ray_count(&self) -> u32 {
        self.num_rays + 1
    }

    fn ray_box(&self, bounds: Aabb) -> Aabb {
        bounds.expand(-self.skin)
    }

    /// Evenly spaced points from `start` to `end`, inclusive.
    fn fan(&self, start: Vec2, end: Vec2) -> impl Iterator<Item = Vec2> {
        let steps = self.num_rays;
        (0..=steps).map(move |i| start.lerp(end, i as f32 / steps as f32))
    }

    /// Sweep `bounds` horizontally by `dx`.
    pub fn sweep_horizontal(&self, bounds: Aabb, dx: f32, caster: &dyn RayCaster) -> AxisSweep {
        if dx == 0.0 || !dx.is_finite() {
            return AxisSweep::free(0.0);
        }
        let shrunk = self.ray_box(bounds);
        let (start, end) = if dx > 0.0 {
            (shrunk.bottom_right(), shrunk.top_right())
        } else {
            (shrunk.bottom_left(), shrunk.top_left())
        };
        let direction = Vec2::new(dx.signum(), 0.0);
        self.sweep(self.fan(start, end), direction, dx.abs(), caster)
    }

    /// Sweep `bounds` vertically by `dy`.
    pub fn sweep_vertical(&self, bounds: Aabb, dy: f32, caster: &dyn RayCaster) -> AxisSweep {
        if dy == 0.0 || !dy.is_finite() {
            return AxisSweep::free(0.0);
        }
        let shrunk = self.ray_box(bounds);
        let (start, end) = if dy > 0.0 {
            (shrunk.top_left(), shrunk.top_right())
        } else {
            (shrunk.bottom_left(), shrunk.bottom_right())
        };
        let direction = Vec2::new(0.0, dy.signum());
        self.sweep(self.fan(start, end), direction, dy.abs(), caster)
    }

    /// Single diagonal ray from the leading corner. Returns the clipped
    /// displacement if something lies in the way.
    pub fn sweep_corner(&self, bounds: Aabb, delta: Vec2, caster: &dyn RayCaster) -> Option<Vec2> {
        if delta.x == 0.0 || delta.y == 0.0 || !delta.is_finite() {
            return None;
        }
        let shrunk = self.ray_box(bounds);
        let corner = Vec2::new(
            if delta.x > 0.0 { shrunk.max.x } else { shrunk.min.x },
            if delta.y > 0.0 { shrunk.max.y } else { shrunk.min.y },
        );
        let direction = delta.normalize();
        let origin = corner + delta.signum() * self.skin;
        let hit = caster.cast_ray(origin, direction, delta.length())?;
        Some(direction * (hit.point - origin).length())
    }

    fn sweep(
        &self,
        origins: impl Iterator<Item = Vec2>,
        direction: Vec2,
        length: f32,
        caster: &dyn RayCaster,
    ) -> AxisSweep {
        let mut remaining = length;
        let mut blocked = false;
        for origin in origins {
            let origin = origin + direction * self.skin;
            if let Some(hit) = caster.cast_ray(origin, direction, remaining) {
                remaining = (hit.point - origin).length().min(remaining);
                blocked = true;
                log::trace!("Ray from {:?} toward {:?} blocked at {:.4}", origin, direction, remaining);
                if remaining <= 0.0 {
                    break;
                }
            }
        }
        let signed = if direction.x + direction.y > 0.0 {
            remaining
        } else {
            -remaining
        };
        AxisSweep {
            distance: signed,
            blocked,
        }
    }
}

/// How a blocked axis gives up its velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactRules {
    /// Dashes bounce off walls instead of sliding along them.
    pub dash_reflects: bool,
    /// Multiplier in `[-1, 0]` applied to a reflected axis.
    pub reflection_factor: f32,
}

impl ImpactRules {
    pub fn new(config: &MovementConfig, wall_reflection_disabled: bool) -> Self {
        Self {
            dash_reflects: config.wall_reflection && !wall_reflection_disabled,
            reflection_factor: config.wall_speed_reflection_factor,
        }
    }
}

/// Velocity after one axis was blocked. `motion` is the displacement
/// attempted this tick; a sliding dash follows its other-axis direction.
pub fn impact_response(velocity: Vec2, axis: Axis, state: MovementState, rules: ImpactRules, motion: Vec2) -> Vec2 {
    let (blocked, other, other_motion) = match axis {
        Axis::Horizontal => (velocity.x, velocity.y, motion.y),
        Axis::Vertical => (velocity.y, velocity.x, motion.x),
    };

    let (blocked, other) = if state.is_hit() || (state == MovementState::Dashing && rules.dash_reflects) {
        (blocked * rules.reflection_factor, other)
    } else if state == MovementState::Dashing {
        // The whole speed turns along the surface; no motion slides negative.
        let speed = velocity.length();
        (0.0, if other_motion > 0.0 { speed } else { -speed })
    } else {
        (0.0, other)
    };

    match axis {
        Axis::Horizontal => Vec2::new(blocked, other),
        Axis::Vertical => Vec2::new(other, blocked),
    }
}
