//! Experience orbs and the leveling curve

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, Rect};
use crate::consts::*;

/// Last level whose threshold follows the linear regime
pub const LINEAR_REGIME_MAX_LEVEL: u32 = 19;
pub const LINEAR_STEP: u32 = 3;
pub const GEOMETRIC_FACTOR: f64 = 1.3;

/// Pickup dropped by kills and destroyed hostile bullets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceOrb {
    pub id: u32,
    /// Center point
    pub pos: Vec2,
    pub value: u32,
}

impl ExperienceOrb {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            value: ORB_VALUE,
        }
    }

    /// Drift toward `anchor` when it lies strictly inside `radius`
    pub fn attract(&mut self, anchor: Vec2, radius: f32) {
        if self.pos.distance(anchor) < radius {
            self.pos += crate::homing_step(self.pos, anchor, ORB_ATTRACTION_SPEED);
        }
    }
}

impl Hitbox for ExperienceOrb {
    /// Pickup trigger area, larger than the drawn dot
    fn hitbox(&self) -> Rect {
        Rect::centered(self.pos, ORB_TRIGGER_RADIUS * 2.0)
    }
}

/// Threshold to reach the next level once `level` has been reached
///
/// `previous` is the threshold that was just met.
pub fn next_threshold(level: u32, previous: u32) -> u32 {
    if level <= LINEAR_REGIME_MAX_LEVEL {
        level * LINEAR_STEP
    } else {
        (previous as f64 * GEOMETRIC_FACTOR).ceil() as u32
    }
}

/// Player level and experience bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub exp: u32,
    pub threshold: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            level: 1,
            exp: 0,
            threshold: LINEAR_STEP,
        }
    }
}

impl Progress {
    pub fn gain(&mut self, value: u32) {
        self.exp += value;
    }

    /// Consume a full bar if present. Returns the new level.
    pub fn try_level_up(&mut self) -> Option<u32> {
        if self.exp < self.threshold {
            return None;
        }
        self.level += 1;
        self.exp = 0;
        self.threshold = next_threshold(self.level, self.threshold);
        Some(self.level)
    }
}
