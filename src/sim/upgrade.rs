//! Upgrade catalog, ability loadout and the level-up menu

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundCue};
use super::hazard::{SATELLITE_MAX_SPEED, SATELLITE_MIN_SPEED, Satellite};
use super::spawner::OVERDRIVE_VOLUME;
use super::state::{GamePhase, GameState};
use crate::consts::*;

pub const DASH_FACTOR: f32 = 1.4;
pub const RAPID_DIVISOR: f32 = 1.05;
pub const RAPID_METEOR_DIVISOR: f32 = 2.0;
pub const MAGNET_FACTOR: f32 = 2.0;
pub const HEAL_AMOUNT: i32 = 5;
pub const OVERDRIVE_ROUNDS: u32 = 5;
pub const OVERDRIVE_ATTACK_DIVISOR: f32 = 1.3;

pub const BARRIER_COOLDOWN_TICKS: u32 = 300;
pub const BARRIER_BASE_DURATION_TICKS: u32 = 90;
pub const BARRIER_DURATION_PER_LEVEL: u32 = 30;

/// The ten upgrades offered on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    Dash,
    RapidAttack,
    Magnet,
    Heal,
    MultiSword,
    Bullet,
    Satellite,
    Meteor,
    Cutter,
    Barrier,
}

impl Upgrade {
    pub const ALL: [Upgrade; 10] = [
        Upgrade::Dash,
        Upgrade::RapidAttack,
        Upgrade::Magnet,
        Upgrade::Heal,
        Upgrade::MultiSword,
        Upgrade::Bullet,
        Upgrade::Satellite,
        Upgrade::Meteor,
        Upgrade::Cutter,
        Upgrade::Barrier,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Upgrade::Dash => "Dash",
            Upgrade::RapidAttack => "Rapid Attack",
            Upgrade::Magnet => "Magnet",
            Upgrade::Heal => "Heal",
            Upgrade::MultiSword => "Multi-Sword",
            Upgrade::Bullet => "Bullet",
            Upgrade::Satellite => "Satellite",
            Upgrade::Meteor => "Meteor",
            Upgrade::Cutter => "Cutter",
            Upgrade::Barrier => "Barrier",
        }
    }
}

/// Timer-driven hazard producer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub unlocked: bool,
    /// Ticks between activations (fractional after upgrades)
    pub interval: f32,
    pub min_interval: f32,
    pub timer: u32,
    /// Hazards produced per activation
    pub count: u32,
}

impl Ability {
    fn new(unlocked: bool, interval: f32, min_interval: f32, count: u32) -> Self {
        Self {
            unlocked,
            interval,
            min_interval,
            timer: 0,
            count,
        }
    }

    /// Advance the timer; true when the ability fires this tick
    pub fn ready(&mut self) -> bool {
        if !self.unlocked {
            return false;
        }
        self.timer += 1;
        if self.timer as f32 >= self.interval {
            self.timer = 0;
            return true;
        }
        false
    }

    pub fn quicken(&mut self, divisor: f32) {
        self.interval = (self.interval / divisor).max(self.min_interval);
    }

    pub fn grant(&mut self) {
        self.unlocked = true;
        self.count += 1;
    }
}

/// Cooldown / active cycle of the barrier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Barrier {
    pub unlocked: bool,
    pub level: u32,
    pub active: bool,
    pub timer: u32,
    pub duration: u32,
}

impl Barrier {
    /// Advance one tick; returns a cue on activation or expiry
    pub fn tick(&mut self) -> Option<SoundCue> {
        if !self.unlocked {
            return None;
        }
        self.timer += 1;
        if !self.active {
            if self.timer >= BARRIER_COOLDOWN_TICKS {
                self.active = true;
                self.timer = 0;
                self.duration =
                    BARRIER_BASE_DURATION_TICKS + self.level * BARRIER_DURATION_PER_LEVEL;
                return Some(SoundCue::BarrierUp);
            }
        } else if self.timer >= self.duration {
            self.active = false;
            self.timer = 0;
            return Some(SoundCue::BarrierDown);
        }
        None
    }

    pub fn grant(&mut self) {
        self.unlocked = true;
        self.level += 1;
    }
}

/// Every hazard-producing ability the player owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loadout {
    pub sword: Ability,
    pub bullets: Ability,
    pub meteors: Ability,
    pub cutters: Ability,
    pub barrier: Barrier,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            sword: Ability::new(true, 30.0, 5.0, 1),
            bullets: Ability::new(false, 90.0, 30.0, 0),
            meteors: Ability::new(false, 300.0, 30.0, 0),
            cutters: Ability::new(false, 180.0, 30.0, 0),
            barrier: Barrier::default(),
        }
    }
}

/// Upgrade choice interrupt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelUpMenu {
    pub options: Vec<Upgrade>,
    pub selected: usize,
    /// Tick the menu opened on
    pub pause_tick: u64,
    /// Phase to return to on confirm
    pub resume_phase: GamePhase,
}

impl LevelUpMenu {
    pub fn open<R: Rng + ?Sized>(rng: &mut R, pause_tick: u64, resume_phase: GamePhase) -> Self {
        let options = Upgrade::ALL
            .choose_multiple(rng, UPGRADE_CHOICES)
            .copied()
            .collect();
        Self {
            options,
            selected: 0,
            pause_tick,
            resume_phase,
        }
    }

    pub fn move_up(&mut self) {
        let n = self.options.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn move_down(&mut self) {
        let n = self.options.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn current(&self) -> Option<Upgrade> {
        self.options.get(self.selected).copied()
    }
}

fn random_orbit_speed(state: &mut GameState) -> f32 {
    state
        .rng
        .random_range(SATELLITE_MIN_SPEED..=SATELLITE_MAX_SPEED)
}

/// Add one satellite and re-roll every satellite's angular speed
fn add_satellite(state: &mut GameState) {
    let id = state.next_entity_id();
    let angle = state.rng.random_range(0.0..360.0);
    let speed = random_orbit_speed(state);
    let sat = Satellite::new(id, angle, speed, state.player.pos);
    state.satellites.push(sat);
    for i in 0..state.satellites.len() {
        let speed = random_orbit_speed(state);
        state.satellites[i].speed = speed;
    }
}

/// Apply one upgrade's effect
pub fn apply_upgrade(state: &mut GameState, upgrade: Upgrade) {
    log::info!("upgrade chosen: {}", upgrade.name());
    match upgrade {
        Upgrade::Dash => state.player.speed *= DASH_FACTOR,
        Upgrade::RapidAttack => {
            let loadout = &mut state.loadout;
            loadout.sword.quicken(RAPID_DIVISOR);
            loadout.bullets.quicken(RAPID_DIVISOR);
            loadout.meteors.quicken(RAPID_METEOR_DIVISOR);
            loadout.cutters.quicken(RAPID_DIVISOR);
        }
        Upgrade::Magnet => state.player.attraction_radius *= MAGNET_FACTOR,
        Upgrade::Heal => state.player.hp += HEAL_AMOUNT,
        Upgrade::MultiSword => state.loadout.sword.count += 1,
        Upgrade::Bullet => state.loadout.bullets.grant(),
        Upgrade::Satellite => add_satellite(state),
        Upgrade::Meteor => state.loadout.meteors.grant(),
        Upgrade::Cutter => state.loadout.cutters.grant(),
        Upgrade::Barrier => state.loadout.barrier.grant(),
    }
}

/// One-time bundle for very short campaigns entering endless mode
pub fn grant_overdrive(state: &mut GameState) {
    for _ in 0..OVERDRIVE_ROUNDS {
        state.player.speed *= DASH_FACTOR;
        state.loadout.sword.quicken(OVERDRIVE_ATTACK_DIVISOR);
        state.player.attraction_radius *= MAGNET_FACTOR;
        state.player.hp += HEAL_AMOUNT;
        state.loadout.sword.count += 1;
        add_satellite(state);
        state.loadout.cutters.grant();
        state.loadout.barrier.grant();
    }
    state.spawner.pin(OVERDRIVE_VOLUME);
    state.overdrive = true;
    state.push_event(GameEvent::OverdriveGranted);
    log::debug!("overdrive granted");
}
