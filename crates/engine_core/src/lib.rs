//! Core engine types and utilities.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Axis-aligned bounds for collision volumes
//! - Frame time management
//! - Common character components (health, lives, facing)

pub mod aabb;
pub mod components;
pub mod time;

pub use aabb::*;
pub use components::*;
pub use time::*;

// Re-export commonly used types
pub use glam::Vec2;
pub use hecs::{Entity, World};
