//! Physics integrator: next-tick velocity for both locomotion profiles.
//!
//! Everything here is a pure function of the current velocity, the
//! controller, the movement state and the modified constants. State
//! changes are reported back to the caller, never applied here.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;
use crate::modifiers::EffectiveConstants;
use crate::state::{MovementState, WallSide};

/// Physics mode chosen once per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocomotionProfile {
    GravityBound,
    Flying,
}

/// Controller state as seen by the integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    /// Analog stick, each axis in [-1, 1].
    pub axis: Vec2,
    pub grab_held: bool,
}

/// Controller deflection past which a direction counts as held.
const HELD_DEFLECTION: f32 = 0.5;

/// Horizontal speed pushed into a wall while sliding so the contact rays keep firing.
const WALL_HUG_SPEED: f32 = 0.01;

/// Shared inputs for one integration step.
#[derive(Debug, Clone, Copy)]
pub struct Integrator<'a> {
    pub config: &'a MovementConfig,
    pub constants: &'a EffectiveConstants,
    pub wall_climb: bool,
}

/// Horizontal result; `released_wall` asks the state machine to leave a wall slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalStep {
    pub velocity_x: f32,
    pub released_wall: bool,
}

impl<'a> Integrator<'a> {
    pub fn new(config: &'a MovementConfig, constants: &'a EffectiveConstants, wall_climb: bool) -> Self {
        Self {
            config,
            constants,
            wall_climb,
        }
    }

    /// Gravity-bound vertical speed before the terminal clamp.
    pub fn vertical(&self, vy: f32, state: MovementState, controls: Controls, dt: f32) -> f32 {
        let max_speed = self.constants.max_speed;
        let gravity = max_speed * self.config.gravity_factor;

        match state {
            MovementState::Dashing => vy,
            MovementState::Jumping | MovementState::WallJump => {
                vy - gravity * self.constants.rising_gravity_backoff * dt
            }
            MovementState::WallSlideLeft | MovementState::WallSlideRight => {
                if self.wall_climb {
                    controls.axis.y * max_speed
                } else if controls.grab_held && vy <= 0.0 {
                    0.0
                } else {
                    let fast_slide = if controls.axis.y < -HELD_DEFLECTION {
                        self.config.terminal_velocity_factor
                    } else {
                        1.0
                    };
                    let vy = vy - gravity * dt * fast_slide;
                    vy.max(-max_speed * self.config.wall_slide_factor * fast_slide)
                }
            }
            _ => {
                let mut down_factor = -1.0;
                if controls.axis.y < -HELD_DEFLECTION && !state.is_hit() {
                    down_factor += controls.axis.y;
                }
                vy + gravity * down_factor * dt
            }
        }
    }

    /// Clamp to `[-terminal × maxSpeed, jump × maxSpeed]`.
    pub fn clamp_vertical(&self, vy: f32) -> f32 {
        let floor = -self.constants.max_speed * self.config.terminal_velocity_factor;
        vy.clamp(floor, self.constants.max_rise_speed())
    }

    /// Gravity-bound horizontal speed.
    pub fn horizontal(&self, vx: f32, state: MovementState, controls: Controls, dt: f32) -> HorizontalStep {
        let max_speed = self.constants.max_speed;
        let tracked = HorizontalStep {
            velocity_x: controls.axis.x * max_speed,
            released_wall: false,
        };
        let held = |velocity_x| HorizontalStep {
            velocity_x,
            released_wall: false,
        };

        match state {
            MovementState::Dashing => held(vx),
            MovementState::Damaged | MovementState::Dying => held(vx - vx * dt.min(1.0)),
            MovementState::WallSlideLeft => {
                if controls.axis.x > HELD_DEFLECTION && !controls.grab_held {
                    HorizontalStep {
                        released_wall: true,
                        ..tracked
                    }
                } else {
                    held(-WALL_HUG_SPEED)
                }
            }
            MovementState::WallSlideRight => {
                if controls.axis.x < -HELD_DEFLECTION && !controls.grab_held {
                    HorizontalStep {
                        released_wall: true,
                        ..tracked
                    }
                } else {
                    held(WALL_HUG_SPEED)
                }
            }
            MovementState::WallJump => {
                let vx = vx + controls.axis.x * max_speed * dt * self.config.wall_jump_control_factor;
                held(vx.clamp(-max_speed, max_speed))
            }
            _ => tracked,
        }
    }

    /// Free-flying velocity: ease toward the stick target, snapping when close.
    pub fn flyer(&self, velocity: Vec2, state: MovementState, controls: Controls, dt: f32) -> Vec2 {
        match state {
            MovementState::Dashing => return velocity,
            MovementState::Damaged | MovementState::Dying => {
                return velocity * self.config.flyer_hit_damping;
            }
            _ => {}
        }

        let max_speed = self.constants.max_speed;
        // clamp_length_max leaves zero-length vectors untouched.
        let target = (controls.axis * max_speed).clamp_length_max(max_speed);
        let current = velocity.clamp_length_max(max_speed);

        let mut difference = target - current;
        let rate = (self.constants.acceleration * dt).clamp(0.0, 1.0);
        if difference.x.abs() > self.constants.snap_threshold {
            difference.x *= rate;
        }
        if difference.y.abs() > self.constants.snap_threshold {
            difference.y *= rate;
        }
        current + difference
    }

    /// Vertical speed set by a jump impulse.
    pub fn jump_speed(&self) -> f32 {
        self.constants.max_rise_speed()
    }

    /// Velocity set by a wall jump off the wall on `side`: 45° away from it.
    pub fn wall_jump_velocity(&self, side: WallSide) -> Vec2 {
        let magnitude = self.constants.max_speed * self.constants.wall_jump_factor;
        let angle = match side {
            WallSide::Left => PI / 4.0,
            WallSide::Right => PI * 3.0 / 4.0,
        };
        Vec2::new(angle.cos(), angle.sin()) * magnitude
    }

    /// Dash velocity: aim if given, else stick direction, else straight down.
    pub fn dash_velocity(&self, aim: Vec2, controls: Controls) -> Vec2 {
        let speed = self.constants.max_speed * self.constants.dash_factor;
        let direction = if aim.length_squared() > 0.0 {
            aim.normalize()
        } else if controls.axis.length_squared() > 0.0 {
            controls.axis.normalize()
        } else {
            Vec2::NEG_Y
        };
        direction * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::UpgradeModifiers;

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> (MovementConfig, EffectiveConstants) {
        let config = MovementConfig::default();
        let constants = EffectiveConstants::new(&config, &UpgradeModifiers::default());
        (config, constants)
    }

    fn stick(x: f32, y: f32) -> Controls {
        Controls {
            axis: Vec2::new(x, y),
            grab_held: false,
        }
    }

    #[test]
    fn falling_accumulates_gravity() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let vy = integ.vertical(0.0, MovementState::Falling, stick(0.0, 0.0), DT);
        assert!((vy + 7.0 * 3.0 * DT).abs() < 1e-5);
    }

    #[test]
    fn rising_uses_backoff() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let vy = integ.vertical(5.0, MovementState::Jumping, stick(0.0, 0.0), DT);
        assert!((vy - (5.0 - 7.0 * 3.0 * 0.9 * DT)).abs() < 1e-5);
    }

    #[test]
    fn dashing_keeps_vertical_speed() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        assert_eq!(integ.vertical(-4.0, MovementState::Dashing, stick(0.0, 1.0), DT), -4.0);
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let vy = integ.vertical(-20.0, MovementState::WallSlideLeft, stick(0.0, 0.0), DT);
        assert!((vy + 7.0 * 0.5).abs() < 1e-5);
    }

    #[test]
    fn wall_climb_tracks_stick() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, true);
        let vy = integ.vertical(-3.0, MovementState::WallSlideRight, stick(0.0, 0.5), DT);
        assert!((vy - 3.5).abs() < 1e-5);
    }

    #[test]
    fn grab_stops_wall_slide() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let controls = Controls {
            axis: Vec2::ZERO,
            grab_held: true,
        };
        assert_eq!(integ.vertical(-2.0, MovementState::WallSlideLeft, controls, DT), 0.0);
    }

    #[test]
    fn vertical_clamp_bounds() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        assert_eq!(integ.clamp_vertical(100.0), 7.0 * 1.5);
        assert_eq!(integ.clamp_vertical(-100.0), -7.0 * 3.0);
    }

    #[test]
    fn horizontal_tracks_stick_and_decays_when_hit() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let step = integ.horizontal(0.0, MovementState::Falling, stick(-0.5, 0.0), DT);
        assert_eq!(step.velocity_x, -3.5);

        let step = integ.horizontal(6.0, MovementState::Damaged, stick(1.0, 0.0), 0.5);
        assert_eq!(step.velocity_x, 3.0);
    }

    #[test]
    fn pushing_off_wall_releases() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let step = integ.horizontal(-0.01, MovementState::WallSlideLeft, stick(1.0, 0.0), DT);
        assert!(step.released_wall);
        assert_eq!(step.velocity_x, 7.0);

        let step = integ.horizontal(-0.01, MovementState::WallSlideLeft, stick(0.2, 0.0), DT);
        assert!(!step.released_wall);
        assert!(step.velocity_x < 0.0);
    }

    #[test]
    fn wall_jump_control_is_clamped() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let step = integ.horizontal(6.9, MovementState::WallJump, stick(1.0, 0.0), 0.1);
        assert_eq!(step.velocity_x, 7.0);
    }

    #[test]
    fn flyer_snaps_within_threshold() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        // Target x = 7.0; current 6.5 is within 0.7 of it.
        let v = integ.flyer(Vec2::new(6.5, 0.0), MovementState::Falling, stick(1.0, 0.0), DT);
        assert_eq!(v.x, 7.0);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn flyer_eases_when_far() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let v = integ.flyer(Vec2::ZERO, MovementState::Grounded, stick(1.0, 0.0), DT);
        assert!(v.x > 0.0 && v.x < 7.0);
    }

    #[test]
    fn flyer_zero_vectors_are_safe() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let v = integ.flyer(Vec2::ZERO, MovementState::Falling, stick(0.0, 0.0), DT);
        assert_eq!(v, Vec2::ZERO);
        assert!(v.is_finite());
    }

    #[test]
    fn flyer_target_is_length_limited() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let mut v = Vec2::ZERO;
        for _ in 0..600 {
            v = integ.flyer(v, MovementState::Falling, stick(1.0, 1.0), DT);
        }
        assert!(v.length() <= 7.0 + 1e-3);
    }

    #[test]
    fn wall_jump_decomposition() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let off_left = integ.wall_jump_velocity(WallSide::Left);
        let off_right = integ.wall_jump_velocity(WallSide::Right);
        let expected = (PI / 4.0).sin() * 7.0 * 1.5;
        assert!((off_left.x - expected).abs() < 1e-4);
        assert!((off_left.y - expected).abs() < 1e-4);
        assert!((off_right.x + expected).abs() < 1e-4);
        assert!((off_right.y - expected).abs() < 1e-4);
    }

    #[test]
    fn dash_direction_fallbacks() {
        let (config, constants) = setup();
        let integ = Integrator::new(&config, &constants, false);
        let speed = 7.0 * 3.0;
        let v = integ.dash_velocity(Vec2::new(0.0, 2.0), stick(1.0, 0.0));
        assert!((v - Vec2::new(0.0, speed)).length() < 1e-4);
        let v = integ.dash_velocity(Vec2::ZERO, stick(-1.0, 0.0));
        assert!((v - Vec2::new(-speed, 0.0)).length() < 1e-4);
        let v = integ.dash_velocity(Vec2::ZERO, stick(0.0, 0.0));
        assert!((v - Vec2::new(0.0, -speed)).length() < 1e-4);
    }
}
