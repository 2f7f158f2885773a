//! Movement tuning constants.
//!
//! All speeds are expressed as factors of `max_speed` (world units per
//! second), all durations in seconds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("wall_speed_reflection_factor must be in [-1, 0], got {0}")]
    ReflectionFactor(f32),
    #[error("num_rays must be at least 1")]
    NoRays,
}

/// Configuration for character movement physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ------------------------------------------------------------------
    // Recovery timers
    // ------------------------------------------------------------------
    pub wall_jump_recovery: f32,
    pub dash_duration: f32,
    pub damage_recovery: f32,
    pub death_animation_time: f32,
    pub dash_cooldown: f32,

    // ------------------------------------------------------------------
    // General movement
    // ------------------------------------------------------------------
    pub max_speed: f32,
    pub dash_factor: f32,
    /// Whether a dash bounces off walls (see `wall_speed_reflection_factor`).
    pub wall_reflection: bool,
    /// Multiplier applied to the blocked axis on a reflecting hit.
    pub wall_speed_reflection_factor: f32,

    // ------------------------------------------------------------------
    // Free-flying profile
    // ------------------------------------------------------------------
    pub acceleration_factor: f32,
    /// Fraction of max speed under which an axis snaps to its target.
    pub snap_to_max_threshold_factor: f32,
    /// Per-tick velocity scale while a flyer is hit or dying.
    pub flyer_hit_damping: f32,

    // ------------------------------------------------------------------
    // Gravity-bound profile
    // ------------------------------------------------------------------
    pub gravity_factor: f32,
    pub terminal_velocity_factor: f32,
    pub rising_gravity_backoff_factor: f32,
    pub jump_factor: f32,
    pub wall_jump_factor: f32,
    pub wall_slide_factor: f32,
    pub wall_jump_control_factor: f32,

    // ------------------------------------------------------------------
    // Raycasts
    // ------------------------------------------------------------------
    /// Inset of the ray box, and outward offset of every ray origin.
    pub ray_bound_shrinkage: f32,
    /// Number of intervals along a face; `num_rays + 1` rays are cast.
    pub num_rays: u32,
    /// Half size of the character's collision box.
    pub half_extents: [f32; 2],

    // ------------------------------------------------------------------
    // Abilities and vitals
    // ------------------------------------------------------------------
    pub jetpack_velocity_factor: f32,
    pub max_jetpack_time: f32,
    pub falling_jetpack_force_factor: f32,
    pub max_health: i32,
    pub max_lives: i32,
    /// Health a dashing nightmare takes from an explorer it runs into.
    pub dash_attack_damage: i32,
    /// Minimum time between two hits from the same attacker.
    pub attack_debounce: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            wall_jump_recovery: 0.2,
            dash_duration: 0.5,
            damage_recovery: 1.0,
            death_animation_time: 3.0,
            dash_cooldown: 0.65,

            max_speed: 7.0,
            dash_factor: 3.0,
            wall_reflection: true,
            wall_speed_reflection_factor: -0.75,

            acceleration_factor: 0.5,
            snap_to_max_threshold_factor: 0.1,
            flyer_hit_damping: 0.9,

            gravity_factor: 3.0,
            terminal_velocity_factor: 3.0,
            rising_gravity_backoff_factor: 0.9,
            jump_factor: 1.5,
            wall_jump_factor: 1.5,
            wall_slide_factor: 0.5,
            wall_jump_control_factor: 6.0,

            ray_bound_shrinkage: 0.001,
            num_rays: 4,
            half_extents: [0.4, 0.5],

            jetpack_velocity_factor: 2.0,
            max_jetpack_time: 1.0,
            falling_jetpack_force_factor: 2.0,
            max_health: 100,
            max_lives: 3,
            dash_attack_damage: 34,
            attack_debounce: 1.0,
        }
    }
}

impl MovementConfig {
    /// Check every value the integrator divides by or clamps against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_speed", self.max_speed)?;
        positive("half_extents.x", self.half_extents[0])?;
        positive("half_extents.y", self.half_extents[1])?;
        positive("terminal_velocity_factor", self.terminal_velocity_factor)?;
        positive("jump_factor", self.jump_factor)?;

        for (field, value) in [
            ("wall_jump_recovery", self.wall_jump_recovery),
            ("dash_duration", self.dash_duration),
            ("damage_recovery", self.damage_recovery),
            ("death_animation_time", self.death_animation_time),
            ("dash_cooldown", self.dash_cooldown),
            ("dash_factor", self.dash_factor),
            ("acceleration_factor", self.acceleration_factor),
            ("snap_to_max_threshold_factor", self.snap_to_max_threshold_factor),
            ("flyer_hit_damping", self.flyer_hit_damping),
            ("gravity_factor", self.gravity_factor),
            ("rising_gravity_backoff_factor", self.rising_gravity_backoff_factor),
            ("wall_jump_factor", self.wall_jump_factor),
            ("wall_slide_factor", self.wall_slide_factor),
            ("wall_jump_control_factor", self.wall_jump_control_factor),
            ("ray_bound_shrinkage", self.ray_bound_shrinkage),
            ("max_jetpack_time", self.max_jetpack_time),
            ("attack_debounce", self.attack_debounce),
        ] {
            non_negative(field, value)?;
        }

        if !(-1.0..=0.0).contains(&self.wall_speed_reflection_factor) {
            return Err(ConfigError::ReflectionFactor(self.wall_speed_reflection_factor));
        }
        if self.num_rays == 0 {
            return Err(ConfigError::NoRays);
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
