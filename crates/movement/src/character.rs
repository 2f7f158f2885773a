//! Owner-side character simulation.
//!
//! `Character::tick` is the authoritative per-frame step: integrate
//! velocity, sweep the displacement through the collision resolver, let
//! the hits drive the state machine, then run the state timers. Replicas
//! never call it; they take state verbatim from snapshots.

use engine_core::{Aabb, Facing, Health, Lives};
use glam::Vec2;
use physics::RayCaster;
use serde::{Deserialize, Serialize};

use crate::abilities::{ActionHandler, CharacterKind};
use crate::collision::{impact_response, CollisionResolver, ImpactRules};
use crate::config::MovementConfig;
use crate::events::{Axis, Direction, MovementEvent};
use crate::integrator::{Controls, Integrator, LocomotionProfile};
use crate::modifiers::{EffectiveConstants, Powerups, TalentSource, UpgradeModifiers};
use crate::state::{MovementState, StateMachine, Trigger, WallSide};

/// Kinematic state written only by the owning peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterPhysicsState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Analog input, each axis in [-1, 1].
    pub controller: Vec2,
    pub primary_held: bool,
    pub secondary_held: bool,
    pub grab_held: bool,
    /// Only meaningful for flyers.
    pub facing: Facing,
}

/// Explorer health, lives and light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: Health,
    pub lives: Lives,
    pub light_active: bool,
}

impl Vitals {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            health: Health::new(config.max_health),
            lives: Lives::new(config.max_lives),
            light_active: true,
        }
    }
}

/// What one tick changed.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDelta {
    pub previous: MovementState,
    pub current: MovementState,
    pub displacement: Vec2,
    /// Everything emitted since the previous tick, including events from
    /// action presses in between.
    pub events: Vec<MovementEvent>,
}

impl StateDelta {
    pub fn state_changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Everything about a character except its action handler.
///
/// Handlers receive `&mut Motor` and can only move the character through
/// `jump` and `dash`, which consult the transition table first.
#[derive(Debug)]
pub struct Motor {
    kind: CharacterKind,
    profile: LocomotionProfile,
    config: MovementConfig,
    modifiers: UpgradeModifiers,
    constants: EffectiveConstants,
    resolver: CollisionResolver,
    impact: ImpactRules,
    machine: StateMachine,
    body: CharacterPhysicsState,
    vitals: Option<Vitals>,
    clock: f32,
    last_dash_at: Option<f32>,
    last_jump_at: Option<f32>,
    last_attack_at: Option<f32>,
    hit_recovery: f32,
    /// Axes blocked last tick, indexed horizontal then vertical.
    contacts: [bool; 2],
    pending: Vec<MovementEvent>,
}

impl Motor {
    pub fn kind(&self) -> CharacterKind {
        self.kind
    }

    pub fn state(&self) -> MovementState {
        self.machine.current()
    }

    pub fn body(&self) -> &CharacterPhysicsState {
        &self.body
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn constants(&self) -> &EffectiveConstants {
        &self.constants
    }

    pub fn modifiers(&self) -> &UpgradeModifiers {
        &self.modifiers
    }

    /// Seconds of simulation since the character was created.
    pub fn now(&self) -> f32 {
        self.clock
    }

    pub fn last_jump_at(&self) -> Option<f32> {
        self.last_jump_at
    }

    pub fn integrator(&self) -> Integrator<'_> {
        Integrator::new(&self.config, &self.constants, self.modifiers.wall_climb)
    }

    fn controls(&self) -> Controls {
        Controls {
            axis: self.body.controller,
            grab_held: self.body.grab_held,
        }
    }

    pub fn bounds(&self) -> Aabb {
        let [hx, hy] = self.config.half_extents;
        Aabb::from_center(self.body.position, Vec2::new(hx, hy))
    }

    fn fire(&mut self, trigger: Trigger) -> bool {
        match self.machine.fire(trigger, self.clock) {
            Some(transition) => {
                if transition.changed() {
                    self.pending.push(MovementEvent::StateChanged(transition.to));
                }
                true
            }
            None => false,
        }
    }

    /// Jump impulse; a wall jump when sliding on a wall. Returns whether
    /// the current state allowed it.
    pub fn jump(&mut self, is_double: bool) -> bool {
        let (trigger, velocity) = match self.state().wall_side() {
            Some(side) => (Trigger::WallJump, self.integrator().wall_jump_velocity(side)),
            None => (
                Trigger::Jump,
                Vec2::new(self.body.velocity.x, self.integrator().jump_speed()),
            ),
        };
        if !self.fire(trigger) {
            return false;
        }
        self.body.velocity = velocity;
        self.last_jump_at = Some(self.clock);
        self.pending.push(MovementEvent::JumpTriggered { is_double });
        true
    }

    /// Dash toward `aim`, subject to the hit-state lock and the cooldown.
    pub fn dash(&mut self, aim: Vec2) -> bool {
        if self.state().is_hit() {
            return false;
        }
        if let Some(last) = self.last_dash_at {
            if self.clock - last < self.constants.dash_cooldown {
                log::trace!("Dash on cooldown ({:.3}s since last)", self.clock - last);
                return false;
            }
        }
        let velocity = self.integrator().dash_velocity(aim, self.controls());
        if !self.fire(Trigger::Dash) {
            return false;
        }
        self.body.velocity = velocity;
        self.last_dash_at = Some(self.clock);
        self.pending.push(MovementEvent::DashTriggered);
        true
    }

    fn block(&mut self, axis: Axis, motion: Vec2, touched: &mut [bool; 2]) {
        let (index, along) = match axis {
            Axis::Horizontal => (0, motion.x),
            Axis::Vertical => (1, motion.y),
        };
        if !self.contacts[index] {
            self.pending.push(MovementEvent::Collision {
                axis,
                direction: Direction::of(along),
            });
        }
        touched[index] = true;
        self.body.velocity = impact_response(self.body.velocity, axis, self.state(), self.impact, motion);
    }

    /// Sweep this tick's displacement and feed the hits to the state machine.
    fn move_and_collide(&mut self, dt: f32, geometry: &dyn RayCaster) -> Vec2 {
        let gravity_bound = self.profile == LocomotionProfile::GravityBound;
        let bounds = self.bounds();
        let mut delta = self.body.velocity * dt;
        let mut touched = [false; 2];

        let horizontal = self.resolver.sweep_horizontal(bounds, delta.x, geometry);
        if horizontal.blocked {
            self.block(Axis::Horizontal, delta, &mut touched);
            if gravity_bound {
                self.fire(Trigger::WallContact(WallSide::from_motion(delta.x)));
            }
        } else if self.state().is_wall_slide() {
            self.fire(Trigger::WallDetached);
        }

        if gravity_bound
            && self.state().is_wall_slide()
            && self.body.grab_held
            && !self.modifiers.wall_climb
            && self.body.velocity.y < 0.0
        {
            self.body.velocity.y = 0.0;
            delta.y = 0.0;
        }

        let shifted = bounds.translate(Vec2::new(horizontal.distance, 0.0));
        let vertical = self.resolver.sweep_vertical(shifted, delta.y, geometry);
        if vertical.blocked {
            self.block(Axis::Vertical, delta, &mut touched);
            if gravity_bound && delta.y < 0.0 {
                self.fire(Trigger::Landed);
            }
        } else if gravity_bound && self.state() == MovementState::Grounded {
            self.fire(Trigger::GroundLost);
        }

        let mut displacement = Vec2::new(horizontal.distance, vertical.distance);
        if !horizontal.blocked && !vertical.blocked {
            if let Some(clipped) = self.resolver.sweep_corner(bounds, delta, geometry) {
                log::trace!("Corner hit clipped {:?} to {:?}", delta, clipped);
                displacement = clipped;
                self.block(Axis::Horizontal, delta, &mut touched);
                self.body.velocity.x = 0.0;
                if gravity_bound {
                    self.fire(Trigger::WallContact(WallSide::from_motion(delta.x)));
                }
            }
        }

        self.contacts = touched;
        self.body.position += displacement;
        displacement
    }

    fn run_timers(&mut self) {
        let elapsed = self.machine.time_in_state(self.clock);
        let expired = match self.state() {
            MovementState::Damaged => elapsed > self.hit_recovery,
            MovementState::Dying => elapsed > self.config.death_animation_time,
            MovementState::WallJump => elapsed > self.config.wall_jump_recovery,
            MovementState::Dashing => elapsed > self.config.dash_duration,
            _ => false,
        };
        if expired {
            self.fire(Trigger::RecoveryElapsed);
        }
        if self.state() == MovementState::Jumping
            && (self.body.velocity.y <= 0.0 || !self.body.primary_held)
        {
            self.fire(Trigger::JumpEnded);
        }
    }
}

/// A simulated character on its owning peer.
#[derive(Debug)]
pub struct Character {
    motor: Motor,
    handler: Box<dyn ActionHandler>,
}

impl Character {
    pub fn new(
        kind: CharacterKind,
        position: Vec2,
        config: MovementConfig,
        talents: &dyn TalentSource,
        powerups: Powerups,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("Invalid movement config ({}), using defaults", err);
                MovementConfig::default()
            }
        };
        let modifiers = UpgradeModifiers::from_talents(talents, powerups);
        let constants = EffectiveConstants::new(&config, &modifiers);
        let profile = kind.profile();

        let motor = Motor {
            kind,
            profile,
            resolver: CollisionResolver::from_config(&config),
            impact: ImpactRules::new(&config, modifiers.wall_reflection_disabled),
            vitals: kind.has_vitals().then(|| Vitals::new(&config)),
            hit_recovery: config.damage_recovery,
            machine: StateMachine::new(),
            body: CharacterPhysicsState {
                position,
                ..Default::default()
            },
            config,
            modifiers,
            constants,
            clock: 0.0,
            last_dash_at: None,
            last_jump_at: None,
            last_attack_at: None,
            contacts: [false; 2],
            pending: Vec::new(),
        };

        log::debug!("Spawned {:?} at {:?}", kind, position);
        Self {
            motor,
            handler: kind.handler(),
        }
    }

    pub fn kind(&self) -> CharacterKind {
        self.motor.kind
    }

    pub fn profile(&self) -> LocomotionProfile {
        self.motor.profile
    }

    pub fn state(&self) -> MovementState {
        self.motor.state()
    }

    pub fn body(&self) -> &CharacterPhysicsState {
        &self.motor.body
    }

    pub fn position(&self) -> Vec2 {
        self.motor.body.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.motor.body.velocity
    }

    pub fn facing(&self) -> Facing {
        self.motor.body.facing
    }

    pub fn vitals(&self) -> Option<&Vitals> {
        self.motor.vitals.as_ref()
    }

    pub fn config(&self) -> &MovementConfig {
        &self.motor.config
    }

    pub fn constants(&self) -> &EffectiveConstants {
        &self.motor.constants
    }

    pub fn bounds(&self) -> Aabb {
        self.motor.bounds()
    }

    pub fn now(&self) -> f32 {
        self.motor.clock
    }

    pub fn state_entered_at(&self) -> f32 {
        self.motor.machine.entered_at()
    }

    pub fn last_dash_at(&self) -> Option<f32> {
        self.motor.last_dash_at
    }

    /// Store the stick vector, clamped per axis; non-finite axes read as zero.
    pub fn set_controller_input(&mut self, input: Vec2, grab_held: bool) {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        self.motor.body.controller = Vec2::new(axis(input.x), axis(input.y));
        self.motor.body.grab_held = grab_held;
    }

    pub fn trigger_primary_action(&mut self) {
        self.motor.body.primary_held = true;
        self.handler.primary_pressed(&mut self.motor);
    }

    pub fn release_primary_action(&mut self) {
        self.motor.body.primary_held = false;
        self.handler.primary_released(&mut self.motor);
    }

    pub fn trigger_secondary_action(&mut self, direction: Vec2) {
        let aim = if direction.is_finite() { direction } else { Vec2::ZERO };
        self.motor.body.secondary_held = true;
        self.handler.secondary_pressed(&mut self.motor, aim);
    }

    pub fn release_secondary_action(&mut self) {
        self.motor.body.secondary_held = false;
        self.handler.secondary_released(&mut self.motor);
    }

    /// Flip the light. Returns whether it is now on; out-of-health and
    /// light-less characters stay dark.
    pub fn toggle_light(&mut self) -> bool {
        match self.motor.vitals.as_mut() {
            Some(vitals) if !vitals.health.is_exhausted() => {
                vitals.light_active = !vitals.light_active;
                vitals.light_active
            }
            _ => false,
        }
    }

    /// Take a hit carrying `source_velocity`. Returns false when ignored.
    pub fn apply_damage(&mut self, source_velocity: Vec2, amount: i32, freeze_time: f32, stun_time: f32) -> bool {
        let motor = &mut self.motor;
        if motor.state().is_hit() {
            log::debug!("{:?} ignored damage while {:?}", motor.kind, motor.state());
            return false;
        }
        if motor.vitals.as_ref().is_some_and(|v| v.health.is_exhausted()) {
            return false;
        }

        let stun = freeze_time.max(0.0) + stun_time.max(0.0);
        motor.hit_recovery = if stun.is_finite() && stun > 0.0 {
            stun
        } else {
            motor.config.damage_recovery
        };
        motor.body.velocity = if source_velocity.is_finite() {
            source_velocity
        } else {
            Vec2::ZERO
        };
        motor.pending.push(MovementEvent::DamageTaken { amount });

        let killed = match motor.vitals.as_mut() {
            Some(vitals) => {
                vitals.health.take_damage(amount);
                vitals.health.is_exhausted()
            }
            None => false,
        };

        if let (true, Some(vitals)) = (killed, motor.vitals.as_mut()) {
            vitals.lives.lose_one();
            vitals.light_active = false;
            let lives_remaining = vitals.lives.remaining;
            log::info!("{:?} out of health, {} lives left", motor.kind, lives_remaining);
            motor.pending.push(MovementEvent::DeathThresholdReached { lives_remaining });
            motor.fire(Trigger::Killed);
        } else {
            motor.fire(Trigger::Hit);
        }
        true
    }

    /// Restore health after a rescue. Lives are not refunded.
    /// Land a dash attack on whoever this character ran into. Only a
    /// dashing nightmare strikes, at most once per `attack_debounce`, and it
    /// rebounds back the way it came. Returns the velocity it hit with.
    pub fn strike(&mut self) -> Option<Vec2> {
        let motor = &mut self.motor;
        if motor.kind.has_vitals() || motor.state() != MovementState::Dashing {
            return None;
        }
        let debounce = motor.config.attack_debounce;
        if motor.last_attack_at.is_some_and(|last| motor.clock - last <= debounce) {
            return None;
        }
        let impact = motor.body.velocity;
        motor.body.velocity = -impact;
        motor.last_attack_at = Some(motor.clock);
        log::debug!("{:?} struck at {:?}", motor.kind, impact);
        Some(impact)
    }

    pub fn revive(&mut self) {
        if let Some(vitals) = self.motor.vitals.as_mut() {
            vitals.health.restore();
            vitals.light_active = true;
            log::info!("{:?} revived with {} lives", self.motor.kind, vitals.lives.remaining);
        }
    }

    /// Advance the owner simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32, geometry: &dyn RayCaster) -> StateDelta {
        let previous = self.state();
        if !(dt > 0.0 && dt.is_finite()) {
            log::trace!("Skipping tick with dt {}", dt);
            return StateDelta {
                previous,
                current: previous,
                displacement: Vec2::ZERO,
                events: std::mem::take(&mut self.motor.pending),
            };
        }

        self.motor.clock += dt;
        self.integrate(dt);
        let displacement = self.motor.move_and_collide(dt, geometry);
        match self.motor.profile {
            LocomotionProfile::GravityBound => {
                // Reflections can overshoot the bounds.
                let vy = self.motor.integrator().clamp_vertical(self.motor.body.velocity.y);
                self.motor.body.velocity.y = vy;
            }
            LocomotionProfile::Flying => {
                if let Some(facing) = Facing::from_motion(displacement.x) {
                    self.motor.body.facing = facing;
                }
            }
        }
        self.motor.run_timers();
        self.handler.after_tick(&mut self.motor);

        StateDelta {
            previous,
            current: self.state(),
            displacement,
            events: std::mem::take(&mut self.motor.pending),
        }
    }

    fn integrate(&mut self, dt: f32) {
        let motor = &mut self.motor;
        let state = motor.state();
        let controls = motor.controls();
        match motor.profile {
            LocomotionProfile::GravityBound => {
                let vy = motor.integrator().vertical(motor.body.velocity.y, state, controls, dt);
                let vy = self.handler.adjust_vertical(motor, vy, dt);
                let vy = motor.integrator().clamp_vertical(vy);
                let step = motor.integrator().horizontal(motor.body.velocity.x, state, controls, dt);
                motor.body.velocity = Vec2::new(step.velocity_x, vy);
                if step.released_wall {
                    motor.fire(Trigger::WallDetached);
                }
            }
            LocomotionProfile::Flying => {
                motor.body.velocity = motor.integrator().flyer(motor.body.velocity, state, controls, dt);
            }
        }
    }
}
