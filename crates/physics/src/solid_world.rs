//! Static level geometry backed by Rapier2D colliders.
//!
//! Characters are not rigid bodies: they move kinematically and only query
//! this world with rays. Nothing here is ever stepped.

use crate::collision::{interaction_groups, CollisionGroup};
use engine_core::{Aabb, Vec2};
use rapier2d::prelude::*;

/// Static solid geometry plus the query pipeline used for movement rays.
pub struct SolidWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    /// Set whenever colliders change; cleared by `update_query_pipeline`.
    dirty: bool,
}

impl Default for SolidWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SolidWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            dirty: false,
        }
    }

    /// Rebuild the acceleration structure after geometry changes.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
        self.dirty = false;
    }

    /// True when colliders were added or removed since the last pipeline update.
    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    /// Add an axis-aligned solid box centered at `center`.
    pub fn add_solid_box(&mut self, center: Vec2, half_extents: Vec2) -> ColliderHandle {
        let half = half_extents.abs();
        let collider = ColliderBuilder::cuboid(half.x, half.y)
            .translation(vector![center.x, center.y])
            .collision_groups(interaction_groups(CollisionGroup::solid()))
            .build();
        self.dirty = true;
        self.collider_set.insert(collider)
    }

    /// Add a solid box spanning `bounds`.
    pub fn add_solid_aabb(&mut self, bounds: Aabb) -> ColliderHandle {
        self.add_solid_box(bounds.center(), Vec2::new(bounds.width(), bounds.height()) * 0.5)
    }

    /// Add a non-blocking circular sensor (hazard zones and the like).
    pub fn add_sensor_circle(&mut self, center: Vec2, radius: f32) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius.abs())
            .translation(vector![center.x, center.y])
            .sensor(true)
            .collision_groups(interaction_groups(CollisionGroup::sensor()))
            .build();
        self.dirty = true;
        self.collider_set.insert(collider)
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        if self
            .collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true)
            .is_some()
        {
            self.dirty = true;
        } else {
            log::warn!("Tried to remove unknown collider {:?}", handle);
        }
    }

    /// First sensor whose shape contains `point`. Solids are ignored.
    pub fn sensor_at(&self, point: Vec2) -> Option<ColliderHandle> {
        let mut found = None;
        let filter = QueryFilter::default().groups(CollisionGroup::sensor_query());
        self.query_pipeline.intersections_with_point(
            &self.rigid_body_set,
            &self.collider_set,
            &point![point.x, point.y],
            filter,
            |handle| {
                found = Some(handle);
                false
            },
        );
        found
    }

    /// Number of colliders currently in the world.
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}
