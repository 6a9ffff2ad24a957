//! Game state and core simulation types
//!
//! `GameState` is the simulation context: every subsystem reads and writes
//! only what is reachable from it, and only from inside `tick`.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, Rect};
use super::events::{GameEvent, SoundCue};
use super::experience::{ExperienceOrb, Progress};
use super::hazard::{Bullet, Cutter, Meteor, Satellite, Swing};
use super::hostile::Hostile;
use super::spawner::{SpawnMode, Spawner};
use super::upgrade::{LevelUpMenu, Loadout};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Finite campaign
    Playing,
    /// Upgrade choice; simulation time is frozen
    LevelUpMenu,
    /// Campaign survived, waiting for confirm
    GameClear,
    /// Unbounded post-clear run
    Endless,
    /// Run ended; only reset is honored
    GameOver,
}

impl GamePhase {
    /// Phases in which the world advances
    pub fn is_active(self) -> bool {
        matches!(self, GamePhase::Playing | GamePhase::Endless)
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner of the 8×8 sprite
    pub pos: Vec2,
    pub facing_right: bool,
    pub speed: f32,
    /// Kill credit per defeated hostile
    pub attack_power: u32,
    pub hp: i32,
    pub max_hp: i32,
    /// Ticks of damage immunity left
    pub invincible: u32,
    pub blink: u32,
    pub attraction_radius: f32,
    pub step_timer: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(
                PLAY_AREA_X + (PLAY_AREA_WIDTH / 2.0).floor() - PLAYER_SIZE / 2.0,
                PLAY_AREA_Y + (PLAY_AREA_HEIGHT / 2.0).floor() - PLAYER_SIZE / 2.0,
            ),
            facing_right: true,
            speed: PLAYER_BASE_SPEED,
            attack_power: 1,
            hp: PLAYER_START_HP,
            max_hp: PLAYER_START_HP,
            invincible: 0,
            blink: 0,
            attraction_radius: PLAYER_ATTRACTION_RADIUS,
            step_timer: 0,
        }
    }
}

impl Player {
    pub fn center(&self) -> Vec2 {
        crate::center_of(self.pos, Vec2::splat(PLAYER_SIZE))
    }

    /// Keep the sprite inside the play area
    pub fn clamp_to_play_area(&mut self) {
        self.pos.x = self
            .pos
            .x
            .clamp(PLAY_AREA_X, PLAY_AREA_X + PLAY_AREA_WIDTH - PLAYER_SIZE);
        self.pos.y = self
            .pos
            .y
            .clamp(PLAY_AREA_Y, PLAY_AREA_Y + PLAY_AREA_HEIGHT - PLAYER_SIZE);
    }

    pub fn tick_invincibility(&mut self) {
        if self.invincible > 0 {
            self.invincible -= 1;
            self.blink = (self.blink + 1) % (PLAYER_BLINK_INTERVAL * 2);
        } else {
            self.blink = 0;
        }
    }

    /// Take `damage` and start the immunity window. Returns true on death.
    pub fn hurt(&mut self, damage: i32) -> bool {
        self.hp -= damage;
        self.invincible = PLAYER_INVINCIBLE_TICKS;
        if self.hp <= 0 {
            self.hp = 0;
            return true;
        }
        false
    }

    pub fn visible(&self) -> bool {
        !(self.invincible > 0 && self.blink % (PLAYER_BLINK_INTERVAL * 2) < PLAYER_BLINK_INTERVAL)
    }
}

impl Hitbox for Player {
    /// 4×4 damage box centered in the sprite
    fn hitbox(&self) -> Rect {
        let inset = (PLAYER_SIZE - PLAYER_HITBOX) / 2.0;
        Rect {
            pos: self.pos + Vec2::splat(inset),
            size: Vec2::splat(PLAYER_HITBOX),
        }
    }
}

/// Run parameters fixed at construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunConfig {
    pub campaign_seconds: u32,
    pub overdrive_max_campaign_seconds: u32,
    pub max_endless_exponent: u32,
}

impl From<&Settings> for RunConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            campaign_seconds: settings.campaign_seconds,
            overdrive_max_campaign_seconds: settings.overdrive_max_campaign_seconds,
            max_endless_exponent: settings.max_endless_exponent,
        }
    }
}

impl RunConfig {
    pub fn campaign_ticks(&self) -> u64 {
        self.campaign_seconds as u64 * TICK_RATE as u64
    }

    /// Short campaigns get the overdrive bundle on entering endless mode
    pub fn overdrive_eligible(&self) -> bool {
        self.campaign_seconds <= self.overdrive_max_campaign_seconds
    }
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: RunConfig,
    pub phase: GamePhase,
    /// Global tick counter, advanced in every phase
    pub time_ticks: u64,
    /// Ticks of active play (campaign clock)
    pub elapsed_ticks: u64,
    /// Global tick the endless clock counts from; shifted by menu pauses
    pub endless_anchor: u64,
    pub overdrive: bool,
    /// Remaining-seconds marks already announced
    pub alerts_fired: BTreeSet<u32>,

    pub player: Player,
    pub loadout: Loadout,
    pub progress: Progress,
    pub kill_count: u64,

    pub hostiles: Vec<Hostile>,
    pub swings: Vec<Swing>,
    pub player_bullets: Vec<Bullet>,
    pub hostile_bullets: Vec<Bullet>,
    pub satellites: Vec<Satellite>,
    pub meteors: Vec<Meteor>,
    pub cutters: Vec<Cutter>,
    pub orbs: Vec<ExperienceOrb>,

    pub spawner: Spawner,
    pub menu: Option<LevelUpMenu>,

    /// Events produced since the last `take_events`
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self::with_config(seed, RunConfig::from(settings))
    }

    pub fn with_config(seed: u64, config: RunConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            phase: GamePhase::Playing,
            time_ticks: 0,
            elapsed_ticks: 0,
            endless_anchor: 0,
            overdrive: false,
            alerts_fired: BTreeSet::new(),
            player: Player::default(),
            loadout: Loadout::default(),
            progress: Progress::default(),
            kill_count: 0,
            hostiles: Vec::new(),
            swings: Vec::new(),
            player_bullets: Vec::new(),
            hostile_bullets: Vec::new(),
            satellites: Vec::new(),
            meteors: Vec::new(),
            cutters: Vec::new(),
            orbs: Vec::new(),
            spawner: Spawner::new(config.max_endless_exponent),
            menu: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Drain events accumulated since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from != to {
            log::info!("phase {:?} -> {:?} at tick {}", from, to, self.time_ticks);
            self.phase = to;
            self.push_event(GameEvent::PhaseChanged { from, to });
        }
    }

    pub fn spawn_orb(&mut self, pos: Vec2) {
        let id = self.next_entity_id();
        self.orbs.push(ExperienceOrb::new(id, pos));
    }

    /// Whole minutes of endless play, excluding menu pauses
    pub fn endless_minutes(&self) -> u64 {
        self.time_ticks.saturating_sub(self.endless_anchor) / TICKS_PER_MINUTE
    }

    /// Whole campaign seconds still to play
    pub fn seconds_left(&self) -> u32 {
        let left = self.config.campaign_ticks().saturating_sub(self.elapsed_ticks);
        (left / TICK_RATE as u64) as u32
    }

    pub fn spawn_mode(&self) -> SpawnMode {
        match self.phase {
            GamePhase::Endless => SpawnMode::Endless {
                minutes: self.endless_minutes(),
            },
            _ => SpawnMode::Campaign {
                elapsed: self.elapsed_ticks,
            },
        }
    }

    /// Drop every hostile and hazard (campaign clear)
    pub fn clear_field(&mut self) {
        self.hostiles.clear();
        self.swings.clear();
        self.player_bullets.clear();
        self.hostile_bullets.clear();
        self.satellites.clear();
        self.meteors.clear();
        self.cutters.clear();
    }

    pub fn barrier_active(&self) -> bool {
        self.loadout.barrier.active
    }

    /// Ensure entity lists are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.hostiles.sort_by_key(|h| h.id);
        self.orbs.sort_by_key(|o| o.id);
    }
}
