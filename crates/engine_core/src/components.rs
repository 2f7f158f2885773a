//! Common components shared by characters across the engine.

use serde::{Deserialize, Serialize};

/// Integer health pool for characters that can be knocked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    /// Subtract `amount`, never dropping below zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount.max(0)).max(0);
    }

    pub fn restore(&mut self) {
        self.current = self.max;
    }

    pub fn is_exhausted(&self) -> bool {
        self.current <= 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Remaining lives before a character is exiled from the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lives {
    pub remaining: i32,
}

impl Lives {
    pub fn new(count: i32) -> Self {
        Self {
            remaining: count.max(0),
        }
    }

    /// Spend one life. Returns true when none remain afterwards.
    pub fn lose_one(&mut self) -> bool {
        self.remaining = (self.remaining - 1).max(0);
        self.remaining == 0
    }

    pub fn is_out(&self) -> bool {
        self.remaining <= 0
    }
}

/// Horizontal facing of a sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    /// Facing implied by a horizontal motion, or `None` when not moving.
    pub fn from_motion(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Facing::Right)
        } else if dx < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_clamps_at_zero() {
        let mut h = Health::new(100);
        h.take_damage(130);
        assert_eq!(h.current, 0);
        assert!(h.is_exhausted());
        h.restore();
        assert_eq!(h.current, 100);
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut h = Health::new(10);
        h.take_damage(-5);
        assert_eq!(h.current, 10);
    }

    #[test]
    fn lives_count_down() {
        let mut l = Lives::new(2);
        assert!(!l.lose_one());
        assert!(l.lose_one());
        assert!(l.is_out());
        assert!(l.lose_one());
        assert_eq!(l.remaining, 0);
    }

    #[test]
    fn facing_from_motion() {
        assert_eq!(Facing::from_motion(0.2), Some(Facing::Right));
        assert_eq!(Facing::from_motion(-0.2), Some(Facing::Left));
        assert_eq!(Facing::from_motion(0.0), None);
    }
}
