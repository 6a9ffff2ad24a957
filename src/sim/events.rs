//! Discrete outputs produced by a tick
//!
//! The simulation pushes events into `GameState::events`; the host drains them
//! with `GameState::take_events` once per tick and forwards sound cues to an
//! audio backend.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// Named sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player footstep while moving
    Step,
    /// Player took damage
    Hit,
    /// Hostile defeated
    Kill,
    /// Armored hostile defeated
    HeavyKill,
    /// Experience orb collected
    Pickup,
    MeteorImpact,
    ShieldBreak,
    /// Hostile fired a bullet
    EnemyShot,
    /// Player bullet volley launched
    Volley,
    BarrierUp,
    BarrierDown,
    /// Hostile bullet destroyed by a player hazard
    BulletCleared,
}

impl SoundCue {
    /// Stable cue name used by audio backends
    pub fn as_str(self) -> &'static str {
        match self {
            SoundCue::Step => "step",
            SoundCue::Hit => "hit",
            SoundCue::Kill => "kill",
            SoundCue::HeavyKill => "heavy-kill",
            SoundCue::Pickup => "pickup",
            SoundCue::MeteorImpact => "meteor-impact",
            SoundCue::ShieldBreak => "shield-break",
            SoundCue::EnemyShot => "enemy-shot",
            SoundCue::Volley => "volley",
            SoundCue::BarrierUp => "barrier-up",
            SoundCue::BarrierDown => "barrier-down",
            SoundCue::BulletCleared => "bullet-cleared",
        }
    }
}

/// Events emitted during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    PhaseChanged { from: GamePhase, to: GamePhase },
    /// Player reached `level`; the upgrade menu is now open
    LevelUp { level: u32 },
    /// Whole seconds left in the campaign
    TimeAlert { seconds_left: u32 },
    /// Short-campaign bonus bundle applied on entering endless mode
    OverdriveGranted,
    /// State re-initialized by a reset intent
    Reset,
}
