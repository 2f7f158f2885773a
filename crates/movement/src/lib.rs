//! Character movement: modifiers, integration, collision and state.
//!
//! This crate provides:
//! - Talent-rank modifiers applied to the base tuning constants
//! - Gravity-bound and free-flying velocity integration
//! - Raycast collision resolution against static geometry
//! - The movement state machine and its transition table
//! - Per-kind action handlers and the owner-side `Character`

pub mod abilities;
pub mod character;
pub mod collision;
pub mod config;
pub mod events;
pub mod integrator;
pub mod modifiers;
pub mod state;

pub use abilities::*;
pub use character::*;
pub use collision::*;
pub use config::*;
pub use events::*;
pub use integrator::*;
pub use modifiers::*;
pub use state::*;
