//! Character kinds and their action handlers.
//!
//! A kind picks a locomotion profile and an `ActionHandler`. Handlers
//! only ever act through `Motor`, so every velocity impulse and state
//! change they cause still goes through the transition table.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::character::Motor;
use crate::integrator::LocomotionProfile;
use crate::state::MovementState;

/// Playable character variants. Discriminants are part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CharacterKind {
    DoubleJumpExplorer = 0,
    JetpackExplorer = 1,
    Goblin = 2,
    Specter = 3,
}

impl CharacterKind {
    pub const ALL: [CharacterKind; 4] = [
        CharacterKind::DoubleJumpExplorer,
        CharacterKind::JetpackExplorer,
        CharacterKind::Goblin,
        CharacterKind::Specter,
    ];

    pub fn profile(self) -> LocomotionProfile {
        match self {
            CharacterKind::Specter => LocomotionProfile::Flying,
            _ => LocomotionProfile::GravityBound,
        }
    }

    /// Explorers carry health, lives and a light.
    pub fn has_vitals(self) -> bool {
        matches!(self, CharacterKind::DoubleJumpExplorer | CharacterKind::JetpackExplorer)
    }

    pub fn handler(self) -> Box<dyn ActionHandler> {
        match self {
            CharacterKind::DoubleJumpExplorer => Box::new(DoubleJump::default()),
            CharacterKind::JetpackExplorer => Box::new(Jetpack::default()),
            CharacterKind::Goblin => Box::new(Goblin::default()),
            CharacterKind::Specter => Box::new(Specter),
        }
    }
}

/// Per-kind reactions to the action buttons and to each tick.
pub trait ActionHandler: std::fmt::Debug + Send + Sync {
    fn primary_pressed(&mut self, motor: &mut Motor);

    fn primary_released(&mut self, _motor: &mut Motor) {}

    fn secondary_pressed(&mut self, _motor: &mut Motor, _aim: Vec2) {}

    fn secondary_released(&mut self, _motor: &mut Motor) {}

    /// Hook on the gravity-bound vertical speed, before the terminal clamp.
    fn adjust_vertical(&mut self, _motor: &Motor, vertical_speed: f32, _dt: f32) -> f32 {
        vertical_speed
    }

    /// Runs after collisions and timers have settled the tick's state.
    fn after_tick(&mut self, _motor: &mut Motor) {}
}

/// Jump, then one more in the air (two with the third-jump powerup).
#[derive(Debug, Default)]
pub struct DoubleJump {
    used_second: bool,
    used_third: bool,
}

impl ActionHandler for DoubleJump {
    fn primary_pressed(&mut self, motor: &mut Motor) {
        match motor.state() {
            MovementState::Grounded | MovementState::WallSlideLeft | MovementState::WallSlideRight => {
                motor.jump(false);
            }
            MovementState::Jumping | MovementState::Falling => {
                if !self.used_second {
                    self.used_second = motor.jump(true);
                } else if !self.used_third && motor.modifiers().powerups.third_jump {
                    self.used_third = motor.jump(true);
                }
            }
            _ => {}
        }
    }

    fn after_tick(&mut self, motor: &mut Motor) {
        match motor.state() {
            MovementState::Grounded => {
                self.used_second = false;
                self.used_third = false;
            }
            MovementState::WallSlideLeft | MovementState::WallSlideRight => {
                let rank = motor.modifiers().wall_reset_rank;
                if (rank >= 1 && motor.body().grab_held) || rank >= 2 {
                    self.used_second = false;
                }
                self.used_third = false;
            }
            _ => {}
        }
    }
}

/// Jump from ground or wall; otherwise thrust while the button is held.
#[derive(Debug, Default)]
pub struct Jetpack {
    active: bool,
    fuel: Option<f32>,
}

impl Jetpack {
    /// Remaining thrust time; full until first used.
    pub fn fuel(&self, max: f32) -> f32 {
        self.fuel.unwrap_or(max)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl ActionHandler for Jetpack {
    fn primary_pressed(&mut self, motor: &mut Motor) {
        match motor.state() {
            state if state.is_hit() => {}
            MovementState::Grounded | MovementState::WallSlideLeft | MovementState::WallSlideRight => {
                motor.jump(false);
            }
            _ => self.active = true,
        }
    }

    fn primary_released(&mut self, _motor: &mut Motor) {
        self.active = false;
    }

    fn adjust_vertical(&mut self, motor: &Motor, vertical_speed: f32, dt: f32) -> f32 {
        let config = motor.config();
        let max_fuel = config.max_jetpack_time;
        let mut fuel = self.fuel(max_fuel);

        let thrusting = self.active && !motor.state().is_hit() && motor.state() != MovementState::Dashing;
        if !thrusting {
            self.fuel = Some((fuel + dt).min(max_fuel));
            return vertical_speed;
        }

        let max_speed = motor.constants().max_speed;
        let mut thrust = max_speed * config.gravity_factor * config.jetpack_velocity_factor * dt;
        if vertical_speed <= 0.0 {
            thrust *= config.falling_jetpack_force_factor;
        }
        let vertical_speed = (vertical_speed + thrust).min(max_speed * config.terminal_velocity_factor);

        let burn = if motor.modifiers().powerups.third_jump { dt } else { dt * 2.0 };
        fuel -= burn;
        if fuel <= 0.0 {
            fuel = 0.0;
            self.active = false;
            log::debug!("Jetpack out of fuel");
        }
        self.fuel = Some(fuel);
        vertical_speed
    }
}

/// Gravity-bound nightmare: plain jump, one dash per airtime.
#[derive(Debug, Default)]
pub struct Goblin {
    used_dash: bool,
}

impl ActionHandler for Goblin {
    fn primary_pressed(&mut self, motor: &mut Motor) {
        if matches!(
            motor.state(),
            MovementState::Grounded | MovementState::WallSlideLeft | MovementState::WallSlideRight
        ) {
            motor.jump(false);
        }
    }

    fn secondary_pressed(&mut self, motor: &mut Motor, aim: Vec2) {
        if !self.used_dash && motor.dash(aim) {
            self.used_dash = true;
        }
    }

    fn after_tick(&mut self, motor: &mut Motor) {
        if matches!(
            motor.state(),
            MovementState::Grounded | MovementState::WallSlideLeft | MovementState::WallSlideRight
        ) {
            self.used_dash = false;
        }
    }
}

/// Free-flying nightmare; its only ability is the aimed dash.
#[derive(Debug, Default)]
pub struct Specter;

impl ActionHandler for Specter {
    fn primary_pressed(&mut self, _motor: &mut Motor) {}

    fn secondary_pressed(&mut self, motor: &mut Motor, aim: Vec2) {
        motor.dash(aim);
    }
}
