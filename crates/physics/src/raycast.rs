//! Raycasting against static solid geometry.

use crate::collision::CollisionGroup;
use crate::SolidWorld;
use engine_core::Vec2;
use rapier2d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (normalized) ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec2,
    /// Surface normal at the hit point.
    pub normal: Vec2,
}

/// Anything movement rays can be cast against.
///
/// `direction` does not need to be normalized; `max_distance` is in world
/// units. A ray starting inside a solid reports a hit at distance zero.
pub trait RayCaster {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit>;
}

/// Empty geometry: nothing ever blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl RayCaster for NoGeometry {
    fn cast_ray(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

impl RayCaster for SolidWorld {
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let length = direction.length();
        if !(length > 1e-6) || !(max_distance >= 0.0) {
            return None;
        }
        if self.needs_update() {
            log::warn!("Raycast against a stale query pipeline; call update_query_pipeline after editing geometry");
        }
        let direction = direction / length;
        let ray = Ray::new(
            point![origin.x, origin.y],
            vector![direction.x, direction.y],
        );

        let filter = QueryFilter::default().groups(CollisionGroup::movement_query());

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RayHit {
                    distance: intersection.time_of_impact,
                    point: Vec2::new(point.x, point.y),
                    normal: Vec2::new(intersection.normal.x, intersection.normal.y),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_world() -> SolidWorld {
        let mut world = SolidWorld::new();
        // Wall occupying x in [2, 3], y in [-5, 5].
        world.add_solid_box(Vec2::new(2.5, 0.0), Vec2::new(0.5, 5.0));
        world.update_query_pipeline();
        world
    }

    #[test]
    fn ray_hits_wall_face() {
        let world = wall_world();
        let hit = world.cast_ray(Vec2::ZERO, Vec2::X, 10.0).expect("wall should block");
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.point.x - 2.0).abs() < 1e-4);
        assert!(hit.normal.x < 0.0);
    }

    #[test]
    fn ray_shorter_than_gap_misses() {
        let world = wall_world();
        assert!(world.cast_ray(Vec2::ZERO, Vec2::X, 1.5).is_none());
    }

    #[test]
    fn ray_from_inside_solid_hits_at_zero() {
        let world = wall_world();
        let hit = world.cast_ray(Vec2::new(2.5, 0.0), Vec2::X, 1.0).expect("inside hit");
        assert!(hit.distance.abs() < 1e-6);
    }

    #[test]
    fn unnormalized_direction_uses_world_units() {
        let world = wall_world();
        let hit = world.cast_ray(Vec2::ZERO, Vec2::new(4.0, 0.0), 10.0).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn zero_direction_never_hits() {
        let world = wall_world();
        assert!(world.cast_ray(Vec2::ZERO, Vec2::ZERO, 10.0).is_none());
        assert!(NoGeometry.cast_ray(Vec2::ZERO, Vec2::X, 10.0).is_none());
    }

    #[test]
    fn sensors_do_not_block() {
        let mut world = SolidWorld::new();
        world.add_sensor_circle(Vec2::new(2.0, 0.0), 1.0);
        world.update_query_pipeline();
        assert!(world.cast_ray(Vec2::ZERO, Vec2::X, 10.0).is_none());
    }
}
