//! Renderer-facing view of one tick
//!
//! Everything here is derived from `GameState` after a tick; nothing flows back.
//! Positions are top-left corners in playfield pixels.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::format_clock;
use crate::sim::collision::Hitbox;
use crate::sim::hazard::{METEOR_SIZE, MeteorPhase};
use crate::sim::hostile::HostileKind;
use crate::sim::state::{GamePhase, GameState};
use crate::sim::upgrade::Upgrade;

/// What a drawn entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Hostile(HostileKind),
    Swing,
    PlayerBullet,
    HostileBullet,
    Satellite,
    Meteor,
    Cutter,
    Orb,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// False while blinking off or waiting out a spawn delay
    pub visible: bool,
    pub facing_right: Option<bool>,
    pub state: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub facing_right: bool,
    pub visible: bool,
    pub barrier: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub hp: i32,
    pub kills: u64,
    pub exp: u32,
    pub threshold: u32,
    pub level: u32,
    pub clock: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuView {
    pub options: Vec<&'static str>,
    pub selected: usize,
}

/// Complete drawable state for one tick
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub hud: Hud,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
    pub menu: Option<MenuView>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let tick = state.time_ticks;
        let mut entities = Vec::new();

        for orb in &state.orbs {
            entities.push(from_hitbox(orb.id, EntityKind::Orb, orb, true, None, "idle"));
        }
        for h in &state.hostiles {
            entities.push(EntityView {
                id: h.id,
                kind: EntityKind::Hostile(h.kind),
                pos: h.pos,
                size: h.size(),
                visible: h.visible(),
                facing_right: Some(h.center().x < state.player.center().x),
                state: h.visual_state(),
            });
        }
        for s in &state.swings {
            let active = s.is_active(tick);
            entities.push(from_hitbox(s.id, EntityKind::Swing, s, active, Some(s.facing_right), "slash"));
        }
        for b in &state.player_bullets {
            let active = b.is_active(tick);
            entities.push(from_hitbox(b.id, EntityKind::PlayerBullet, b, active, None, "flying"));
        }
        for b in &state.hostile_bullets {
            let active = b.is_active(tick);
            entities.push(from_hitbox(b.id, EntityKind::HostileBullet, b, active, None, "flying"));
        }
        for sat in &state.satellites {
            entities.push(from_hitbox(sat.id, EntityKind::Satellite, sat, true, None, "orbiting"));
        }
        for m in &state.meteors {
            let (size, label) = match m.phase {
                MeteorPhase::Flying => (m.size, "flying"),
                MeteorPhase::Exploding => (METEOR_SIZE, "exploding"),
                MeteorPhase::Done => (0.0, "done"),
            };
            entities.push(EntityView {
                id: m.id,
                kind: EntityKind::Meteor,
                pos: m.pos - Vec2::splat(size / 2.0),
                size: Vec2::splat(size),
                visible: !m.delay.pending(tick) && m.phase != MeteorPhase::Done,
                facing_right: None,
                state: label,
            });
        }
        for c in &state.cutters {
            let active = c.is_active(tick);
            entities.push(from_hitbox(c.id, EntityKind::Cutter, c, active, None, "spinning"));
        }

        let menu = state.menu.as_ref().map(|menu| MenuView {
            options: menu.options.iter().map(|u: &Upgrade| u.name()).collect(),
            selected: menu.selected,
        });

        Self {
            tick,
            phase: state.phase,
            hud: Hud {
                hp: state.player.hp,
                kills: state.kill_count,
                exp: state.progress.exp,
                threshold: state.progress.threshold,
                level: state.progress.level,
                clock: clock_text(state),
            },
            player: PlayerView {
                pos: state.player.pos,
                facing_right: state.player.facing_right,
                visible: state.player.visible(),
                barrier: state.barrier_active(),
            },
            entities,
            menu,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn from_hitbox<H: Hitbox>(
    id: u32,
    kind: EntityKind,
    entity: &H,
    visible: bool,
    facing_right: Option<bool>,
    state: &'static str,
) -> EntityView {
    let rect = entity.hitbox();
    EntityView {
        id,
        kind,
        pos: rect.pos,
        size: rect.size,
        visible,
        facing_right,
        state,
    }
}

/// Campaign countdown, endless stopwatch, or a zero clock elsewhere
fn clock_text(state: &GameState) -> String {
    match state.phase {
        GamePhase::Playing => format_clock(
            state
                .config
                .campaign_ticks()
                .saturating_sub(state.elapsed_ticks),
        ),
        GamePhase::Endless => format!(
            "ENDLESS: {}",
            format_clock(state.time_ticks.saturating_sub(state.endless_anchor))
        ),
        _ => format_clock(0),
    }
}
