//! Hostile spawning and difficulty progression

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::hostile::HostileKind;
use crate::consts::*;

pub const SPAWN_INTERVAL_TICKS: u32 = 30;
/// Campaign volume grows by this factor once per period, from the first minute on
pub const ESCALATION_FACTOR: f64 = 1.5;
pub const ESCALATION_PERIOD_TICKS: u64 = TICKS_PER_MINUTE;
pub const PULSE_UNLOCK_TICKS: u64 = 30 * TICK_RATE as u64;
pub const SHIELDED_UNLOCK_TICKS: u64 = 60 * TICK_RATE as u64;
/// Volume pinned by the overdrive bundle (two endless minutes)
pub const OVERDRIVE_VOLUME: f64 = 4.0;

const EARLY_KINDS: [HostileKind; 1] = [HostileKind::Basic];
const MID_KINDS: [HostileKind; 2] = [HostileKind::Basic, HostileKind::PulseShooter];
const LATE_KINDS: [HostileKind; 3] = [
    HostileKind::Basic,
    HostileKind::PulseShooter,
    HostileKind::Shielded,
];

/// Which difficulty policy applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    /// Finite run; `elapsed` is campaign ticks played so far
    Campaign { elapsed: u64 },
    /// Post-clear run; `minutes` of endless play so far
    Endless { minutes: u64 },
}

/// Kinds eligible to spawn under `mode`
pub fn unlocked_kinds(mode: SpawnMode) -> &'static [HostileKind] {
    match mode {
        SpawnMode::Campaign { elapsed } if elapsed < PULSE_UNLOCK_TICKS => &EARLY_KINDS,
        SpawnMode::Campaign { elapsed } if elapsed < SHIELDED_UNLOCK_TICKS => &MID_KINDS,
        SpawnMode::Campaign { .. } => &LATE_KINDS,
        SpawnMode::Endless { .. } => &HostileKind::ALL,
    }
}

/// Spawn clock and volume multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub timer: u32,
    /// Hostiles per spawn event, floored when drawn
    pub volume: f64,
    /// Campaign tick of the next ×1.5 escalation
    pub next_escalation: u64,
    /// Set by overdrive; endless volume is then no longer recomputed
    pub pinned: bool,
    /// Cap on the endless `2^minutes` exponent
    pub max_exponent: u32,
}

impl Spawner {
    pub fn new(max_exponent: u32) -> Self {
        Self {
            timer: 0,
            volume: 1.0,
            next_escalation: ESCALATION_PERIOD_TICKS,
            pinned: false,
            max_exponent,
        }
    }

    pub fn pin(&mut self, volume: f64) {
        self.volume = volume;
        self.pinned = true;
    }

    /// Endless volume for a given number of minutes
    pub fn endless_volume(&self, minutes: u64) -> f64 {
        let exponent = minutes.min(self.max_exponent as u64) as i32;
        2f64.powi(exponent).max(1.0)
    }

    /// Advance the spawn clock; returns the kinds to spawn this tick
    pub fn tick<R: Rng + ?Sized>(&mut self, mode: SpawnMode, rng: &mut R) -> Vec<HostileKind> {
        self.timer += 1;
        if self.timer < SPAWN_INTERVAL_TICKS {
            return Vec::new();
        }
        self.timer = 0;

        match mode {
            SpawnMode::Campaign { elapsed } => {
                if elapsed >= self.next_escalation && elapsed >= ESCALATION_PERIOD_TICKS {
                    self.volume *= ESCALATION_FACTOR;
                    self.next_escalation += ESCALATION_PERIOD_TICKS;
                    log::debug!("spawn volume escalated to {:.2}", self.volume);
                }
            }
            SpawnMode::Endless { minutes } => {
                if !self.pinned {
                    self.volume = self.endless_volume(minutes);
                }
            }
        }

        let kinds = unlocked_kinds(mode);
        let count = self.volume.floor() as usize;
        (0..count).filter_map(|_| kinds.choose(rng).copied()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

const EDGES: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

/// Random top-left position in the off-screen band on one of the four edges
pub fn edge_position<R: Rng + ?Sized>(kind: HostileKind, rng: &mut R) -> Vec2 {
    let size = kind.profile().size.x as i32;
    let buffer = kind.spawn_buffer() as i32;
    let w = SCREEN_WIDTH as i32;
    let h = SCREEN_HEIGHT as i32;

    let edge = EDGES.choose(rng).copied().unwrap_or(Edge::Top);
    let (x, y) = match edge {
        Edge::Top => (rng.random_range(-size..=w), rng.random_range(-buffer..=-size)),
        Edge::Bottom => (
            rng.random_range(-size..=w),
            rng.random_range(h + size..=h + buffer),
        ),
        Edge::Left => (rng.random_range(-buffer..=-size), rng.random_range(-size..=h)),
        Edge::Right => (
            rng.random_range(w + size..=w + buffer),
            rng.random_range(-size..=h),
        ),
    };
    Vec2::new(x as f32, y as f32)
}
