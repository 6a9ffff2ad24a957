//! Ghost Survivor - tick simulation core for a top-down survival arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, AI, hazards, collisions, leveling, phases)
//! - `snapshot`: Read-only view of a tick for an external renderer
//! - `audio`: Sound-cue sink interface for an external audio backend
//! - `settings`: Data-driven run configuration

pub mod audio;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use settings::{Settings, SettingsError};
pub use snapshot::RenderSnapshot;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 30;
    /// Ticks in one minute of simulated time
    pub const TICKS_PER_MINUTE: u64 = 60 * TICK_RATE as u64;

    /// Logical playfield size
    pub const SCREEN_WIDTH: f32 = 128.0;
    pub const SCREEN_HEIGHT: f32 = 64.0;

    /// Centered sub-rectangle the player is confined to
    pub const PLAY_AREA_WIDTH: f32 = 60.0;
    pub const PLAY_AREA_HEIGHT: f32 = 62.0;
    pub const PLAY_AREA_X: f32 = 34.0; // (128 - 60) / 2
    pub const PLAY_AREA_Y: f32 = 1.0; // centered on a 60px band, nudged up a pixel

    /// Player sprite and damage hitbox
    pub const PLAYER_SIZE: f32 = 8.0;
    pub const PLAYER_HITBOX: f32 = 4.0;
    pub const PLAYER_START_HP: i32 = 20;
    pub const PLAYER_BASE_SPEED: f32 = 1.0;
    pub const PLAYER_INVINCIBLE_TICKS: u32 = 60;
    pub const PLAYER_BLINK_INTERVAL: u32 = 5;
    pub const PLAYER_ATTRACTION_RADIUS: f32 = 5.0;
    pub const STEP_CUE_INTERVAL: u32 = 4;

    /// Campaign length when no settings override it
    pub const DEFAULT_CAMPAIGN_SECONDS: u32 = 5 * 60;

    /// Hostiles standing this far past their spawn band are culled
    pub const HOSTILE_CULL_MARGIN: f32 = 20.0;

    /// Experience orb
    pub const ORB_VALUE: u32 = 1;
    pub const ORB_VISUAL_RADIUS: f32 = 1.0;
    pub const ORB_TRIGGER_RADIUS: f32 = 4.0;
    pub const ORB_ATTRACTION_SPEED: f32 = 0.5;

    /// Number of upgrade choices offered per level-up
    pub const UPGRADE_CHOICES: usize = 3;
}

/// Axis-aligned center of a `size` box anchored at `pos`
#[inline]
pub fn center_of(pos: Vec2, size: Vec2) -> Vec2 {
    pos + size * 0.5
}

/// Unit vector for an angle given in degrees
#[inline]
pub fn unit_from_degrees(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// One step of length `speed` from `from` toward `to`
///
/// Returns zero when the two points coincide.
#[inline]
pub fn homing_step(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist == 0.0 {
        return Vec2::ZERO;
    }
    delta / dist * speed
}

/// Format a tick count as `MM:SS`
pub fn format_clock(ticks: u64) -> String {
    let seconds = ticks / consts::TICK_RATE as u64;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
