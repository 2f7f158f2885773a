//! Level geometry: solid blocks for movement rays, sensors for hazards.

use crate::config::{HazardZone, LevelConfig};
use engine_core::{Aabb, Vec2};
use physics::{ColliderHandle, RayCaster, SolidWorld};

/// One peer's copy of the level.
pub struct Level {
    world: SolidWorld,
    hazards: Vec<(ColliderHandle, HazardZone)>,
}

impl Level {
    pub fn build(config: &LevelConfig) -> Self {
        let mut world = SolidWorld::new();
        for block in &config.solids {
            let a = Vec2::from(block.min);
            let b = Vec2::from(block.max);
            world.add_solid_aabb(Aabb::new(a.min(b), a.max(b)));
        }
        let hazards = config
            .hazards
            .iter()
            .map(|zone| (world.add_sensor_circle(Vec2::from(zone.center), zone.radius), *zone))
            .collect();
        world.update_query_pipeline();

        log::debug!(
            "Built level: {} solids, {} hazards",
            config.solids.len(),
            config.hazards.len()
        );
        Self { world, hazards }
    }

    pub fn geometry(&self) -> &dyn RayCaster {
        &self.world
    }

    /// Hazard covering `point`, if any.
    pub fn hazard_at(&self, point: Vec2) -> Option<&HazardZone> {
        let handle = self.world.sensor_at(point)?;
        self.hazards
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, zone)| zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolidBlock;

    #[test]
    fn default_level_has_a_floor() {
        let level = Level::build(&LevelConfig::default());
        let hit = level
            .geometry()
            .cast_ray(Vec2::new(0.0, 2.0), Vec2::NEG_Y, 10.0)
            .expect("floor below the origin");
        assert!(hit.point.y.abs() < 1e-4);
    }

    #[test]
    fn reversed_corners_still_build_a_block() {
        let level = Level::build(&LevelConfig {
            solids: vec![SolidBlock {
                min: [2.0, 1.0],
                max: [1.0, -1.0],
            }],
            hazards: Vec::new(),
        });
        let hit = level.geometry().cast_ray(Vec2::ZERO, Vec2::X, 5.0).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-4);
    }

    #[test]
    fn hazards_are_found_but_do_not_block() {
        let config = LevelConfig::default();
        let zone = config.hazards[0];
        let level = Level::build(&config);
        let center = Vec2::from(zone.center);

        assert_eq!(level.hazard_at(center), Some(&zone));
        assert_eq!(level.hazard_at(center + Vec2::new(zone.radius + 0.5, 0.0)), None);
        assert!(level
            .geometry()
            .cast_ray(center - Vec2::new(2.0, 0.0), Vec2::X, 2.5)
            .is_none());
    }
}
