//! Collision groups and filtering.

use rapier2d::prelude::*;

/// Collision groups for different collider types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static level geometry (floors, walls, platforms)
    Solid = 1 << 0,
    /// Character collision volumes
    Character = 1 << 1,
    /// Non-blocking sensors (hazard zones)
    Sensor = 1 << 2,
}

impl CollisionGroup {
    /// Membership and filter for static solid geometry.
    pub fn solid() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Solid as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Membership and filter for sensors; they never block rays.
    pub fn sensor() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Sensor as u32);
        let filter = Group::from_bits_retain(Self::Character as u32);
        (membership, filter)
    }

    /// Groups used by character movement rays: only solids can block them.
    pub fn movement_query() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Character as u32),
            Group::from_bits_retain(Self::Solid as u32),
        )
    }

    /// Groups used by hazard lookups: only sensors answer.
    pub fn sensor_query() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Character as u32),
            Group::from_bits_retain(Self::Sensor as u32),
        )
    }
}

pub(crate) fn interaction_groups((membership, filter): (Group, Group)) -> InteractionGroups {
    InteractionGroups::new(membership, filter)
}
