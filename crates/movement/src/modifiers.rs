//! Upgrade modifier layer: talent ranks to physics constant adjustments.
//!
//! Every formula is a pure, monotonic function of a clamped rank. Ranks
//! outside `0..=max_rank` are clamped silently.

use crate::config::MovementConfig;
use serde::{Deserialize, Serialize};

/// Talent stats that feed the movement physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TalentStat {
    MovementSpeed,
    JumpHeight,
    ReducedGravity,
    Acceleration,
    CooldownReduction,
    WallClimb,
    WallReflectionDisable,
    WallResetMovement,
}

impl TalentStat {
    pub const ALL: [TalentStat; 8] = [
        TalentStat::MovementSpeed,
        TalentStat::JumpHeight,
        TalentStat::ReducedGravity,
        TalentStat::Acceleration,
        TalentStat::CooldownReduction,
        TalentStat::WallClimb,
        TalentStat::WallReflectionDisable,
        TalentStat::WallResetMovement,
    ];

    /// Highest rank the stat can be trained to.
    pub fn max_rank(self) -> i32 {
        match self {
            TalentStat::MovementSpeed
            | TalentStat::JumpHeight
            | TalentStat::ReducedGravity
            | TalentStat::Acceleration
            | TalentStat::CooldownReduction => 5,
            TalentStat::WallClimb | TalentStat::WallReflectionDisable => 1,
            TalentStat::WallResetMovement => 2,
        }
    }

    pub fn clamp_rank(self, rank: i32) -> i32 {
        rank.clamp(0, self.max_rank())
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Supplies talent ranks (account progression lives outside the core).
pub trait TalentSource {
    fn talent_rank(&self, stat: TalentStat) -> i32;
}

/// Plain rank table, the usual context object handed to a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalentRanks {
    ranks: [i32; TalentStat::ALL.len()],
}

impl TalentRanks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: TalentStat, rank: i32) -> Self {
        self.set(stat, rank);
        self
    }

    /// Store a raw rank; clamping happens when modifiers are derived.
    pub fn set(&mut self, stat: TalentStat, rank: i32) {
        self.ranks[stat.index()] = rank;
    }
}

impl TalentSource for TalentRanks {
    fn talent_rank(&self, stat: TalentStat) -> i32 {
        self.ranks[stat.index()]
    }
}

/// Temporary in-match powerups that change movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Powerups {
    /// Flyers reach their target velocity at max-speed acceleration.
    pub perfect_acceleration: bool,
    /// Double jumpers get one more air jump; jetpacks burn fuel at half rate.
    pub third_jump: bool,
}

pub fn speed_multiplier(rank: i32) -> f32 {
    1.0 + TalentStat::MovementSpeed.clamp_rank(rank) as f32 * 0.03
}

pub fn jump_multiplier(rank: i32) -> f32 {
    1.0 + TalentStat::JumpHeight.clamp_rank(rank) as f32 * 0.05
}

/// Scale on rising gravity; never negative.
pub fn gravity_backoff_multiplier(rank: i32) -> f32 {
    (1.0 - TalentStat::ReducedGravity.clamp_rank(rank) as f32 * 0.1).max(0.0)
}

pub fn acceleration_multiplier(rank: i32) -> f32 {
    1.0 + TalentStat::Acceleration.clamp_rank(rank) as f32 * 0.05
}

/// Scale on cooldowns; never negative.
pub fn cooldown_multiplier(rank: i32) -> f32 {
    (1.0 - TalentStat::CooldownReduction.clamp_rank(rank) as f32 * 0.05).max(0.0)
}

/// Rank-derived adjustments, computed once when a character is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeModifiers {
    pub speed: f32,
    pub jump: f32,
    pub gravity_backoff: f32,
    pub acceleration: f32,
    pub cooldown: f32,
    pub wall_climb: bool,
    pub wall_reflection_disabled: bool,
    pub wall_reset_rank: i32,
    pub powerups: Powerups,
}

impl Default for UpgradeModifiers {
    fn default() -> Self {
        Self::from_talents(&TalentRanks::default(), Powerups::default())
    }
}

impl UpgradeModifiers {
    pub fn from_talents(talents: &dyn TalentSource, powerups: Powerups) -> Self {
        let rank = |stat: TalentStat| stat.clamp_rank(talents.talent_rank(stat));
        Self {
            speed: speed_multiplier(rank(TalentStat::MovementSpeed)),
            jump: jump_multiplier(rank(TalentStat::JumpHeight)),
            gravity_backoff: gravity_backoff_multiplier(rank(TalentStat::ReducedGravity)),
            acceleration: acceleration_multiplier(rank(TalentStat::Acceleration)),
            cooldown: cooldown_multiplier(rank(TalentStat::CooldownReduction)),
            wall_climb: rank(TalentStat::WallClimb) > 0,
            wall_reflection_disabled: rank(TalentStat::WallReflectionDisable) > 0,
            wall_reset_rank: rank(TalentStat::WallResetMovement),
            powerups,
        }
    }

    /// `modify(base, rank)` for a single stat, without building the full set.
    pub fn modify(stat: TalentStat, base: f32, rank: i32) -> f32 {
        match stat {
            TalentStat::MovementSpeed => base * speed_multiplier(rank),
            TalentStat::JumpHeight => base * jump_multiplier(rank),
            TalentStat::ReducedGravity => base * gravity_backoff_multiplier(rank),
            TalentStat::Acceleration => base * acceleration_multiplier(rank),
            TalentStat::CooldownReduction => base * cooldown_multiplier(rank),
            TalentStat::WallClimb
            | TalentStat::WallReflectionDisable
            | TalentStat::WallResetMovement => base,
        }
    }
}

/// Base constants with modifiers applied; what the integrator consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveConstants {
    pub max_speed: f32,
    pub jump_factor: f32,
    pub wall_jump_factor: f32,
    pub dash_factor: f32,
    pub acceleration: f32,
    pub snap_threshold: f32,
    pub dash_cooldown: f32,
    pub rising_gravity_backoff: f32,
}

impl EffectiveConstants {
    pub fn new(config: &MovementConfig, modifiers: &UpgradeModifiers) -> Self {
        let max_speed = config.max_speed * modifiers.speed;
        let acceleration = if modifiers.powerups.perfect_acceleration {
            max_speed
        } else {
            config.acceleration_factor * config.max_speed * modifiers.acceleration
        };
        Self {
            max_speed,
            jump_factor: config.jump_factor * modifiers.jump,
            wall_jump_factor: config.wall_jump_factor * modifiers.jump,
            dash_factor: config.dash_factor,
            acceleration,
            snap_threshold: config.max_speed * config.snap_to_max_threshold_factor,
            dash_cooldown: config.dash_cooldown * modifiers.cooldown,
            rising_gravity_backoff: config.rising_gravity_backoff_factor * modifiers.gravity_backoff,
        }
    }

    /// Highest upward speed a gravity-bound character may have.
    pub fn max_rise_speed(&self) -> f32 {
        self.max_speed * self.jump_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_zero_is_identity() {
        let mods = UpgradeModifiers::default();
        assert_eq!(mods.speed, 1.0);
        assert_eq!(mods.jump, 1.0);
        assert_eq!(mods.gravity_backoff, 1.0);
        assert_eq!(mods.acceleration, 1.0);
        assert_eq!(mods.cooldown, 1.0);
        assert!(!mods.wall_climb);
        assert!(!mods.wall_reflection_disabled);
    }

    #[test]
    fn linear_formulas() {
        assert!((UpgradeModifiers::modify(TalentStat::MovementSpeed, 7.0, 2) - 7.42).abs() < 1e-5);
        assert!((UpgradeModifiers::modify(TalentStat::CooldownReduction, 0.65, 3) - 0.5525).abs() < 1e-5);
        assert!((UpgradeModifiers::modify(TalentStat::JumpHeight, 1.5, 4) - 1.8).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_ranks_clamp() {
        assert_eq!(speed_multiplier(-3), 1.0);
        assert_eq!(speed_multiplier(99), speed_multiplier(5));
        assert_eq!(cooldown_multiplier(1000), cooldown_multiplier(5));
        assert!(cooldown_multiplier(1000) >= 0.0);
        assert!(gravity_backoff_multiplier(50) >= 0.0);
    }

    #[test]
    fn monotonic_per_stat() {
        for rank in 0..5 {
            assert!(speed_multiplier(rank + 1) > speed_multiplier(rank));
            assert!(cooldown_multiplier(rank + 1) < cooldown_multiplier(rank));
            assert!(gravity_backoff_multiplier(rank + 1) < gravity_backoff_multiplier(rank));
        }
    }

    #[test]
    fn boolean_like_ranks() {
        let talents = TalentRanks::new()
            .with(TalentStat::WallClimb, 3)
            .with(TalentStat::WallReflectionDisable, 1)
            .with(TalentStat::WallResetMovement, 7);
        let mods = UpgradeModifiers::from_talents(&talents, Powerups::default());
        assert!(mods.wall_climb);
        assert!(mods.wall_reflection_disabled);
        assert_eq!(mods.wall_reset_rank, 2);
    }

    #[test]
    fn perfect_acceleration_uses_max_speed() {
        let config = MovementConfig::default();
        let mods = UpgradeModifiers::from_talents(
            &TalentRanks::new(),
            Powerups {
                perfect_acceleration: true,
                ..Default::default()
            },
        );
        let constants = EffectiveConstants::new(&config, &mods);
        assert_eq!(constants.acceleration, constants.max_speed);
    }
}
