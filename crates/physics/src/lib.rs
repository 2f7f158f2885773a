//! Static collision geometry and raycast queries, built on Rapier2D.

pub mod collision;
pub mod raycast;
pub mod solid_world;

pub use collision::*;
pub use raycast::*;
pub use solid_world::*;

// Re-export Rapier for downstream crates
pub use rapier2d;

// Re-export common Rapier types
pub use rapier2d::prelude::ColliderHandle;
