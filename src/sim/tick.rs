//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;
use rand::Rng;

use super::combat;
use super::events::{GameEvent, SoundCue};
use super::hostile::Hostile;
use super::spawner::edge_position;
use super::state::{GamePhase, GameState};
use super::upgrade::{LevelUpMenu, apply_upgrade, grant_overdrive};
use crate::consts::*;

/// Remaining campaign seconds that trigger a time announcement
pub const TIME_ALERTS: [u32; 10] = [240, 180, 120, 60, 30, 15, 5, 3, 2, 1];

/// Distance at which autopilot starts fleeing a hostile
const AUTOPILOT_FLEE_RADIUS: f32 = 24.0;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axes (held)
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Confirm (newly pressed)
    pub confirm: bool,
    /// Reset the run from any phase (newly pressed)
    pub reset: bool,
    /// Menu navigation (newly pressed)
    pub menu_up: bool,
    pub menu_down: bool,
    /// Let the core play: flee hostiles, take the first upgrade, enter endless mode
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    if input.reset {
        reset(state);
        return;
    }

    match state.phase {
        GamePhase::GameOver => {}
        GamePhase::Playing if state.elapsed_ticks >= state.config.campaign_ticks() => {
            clear_campaign(state);
        }
        GamePhase::GameClear => {
            if input.confirm {
                enter_endless(state);
            }
        }
        GamePhase::LevelUpMenu => handle_menu(state, &input),
        GamePhase::Playing | GamePhase::Endless => active_tick(state, &input),
    }
}

/// Re-initialize everything, reseeding from the current run
fn reset(state: &mut GameState) {
    let seed: u64 = state.rng.random();
    log::info!("reset (new seed {seed})");
    *state = GameState::with_config(seed, state.config);
    state.push_event(GameEvent::Reset);
}

fn clear_campaign(state: &mut GameState) {
    log::info!(
        "campaign cleared at {} with {} kills",
        crate::format_clock(state.elapsed_ticks),
        state.kill_count
    );
    state.clear_field();
    state.endless_anchor = state.time_ticks;
    state.set_phase(GamePhase::GameClear);
}

fn enter_endless(state: &mut GameState) {
    if state.config.overdrive_eligible() {
        grant_overdrive(state);
    }
    state.spawner.timer = 0;
    state.alerts_fired.clear();
    state.set_phase(GamePhase::Endless);
}

fn handle_menu(state: &mut GameState, input: &TickInput) {
    let Some(menu) = state.menu.as_mut() else {
        // Menu phase without a menu: fall back to play
        state.set_phase(GamePhase::Playing);
        return;
    };

    if input.menu_up {
        menu.move_up();
    } else if input.menu_down {
        menu.move_down();
    } else if input.confirm {
        let choice = menu.current();
        let resume = menu.resume_phase;
        let paused_for = state.time_ticks.saturating_sub(menu.pause_tick);
        state.menu = None;
        if let Some(upgrade) = choice {
            apply_upgrade(state, upgrade);
        }
        state.endless_anchor += paused_for;
        state.set_phase(resume);
    }
}

fn active_tick(state: &mut GameState, input: &TickInput) {
    state.elapsed_ticks += 1;

    if state.phase == GamePhase::Playing {
        announce_time(state);
    }

    move_player(state, input);
    state.player.tick_invincibility();
    if let Some(cue) = state.loadout.barrier.tick() {
        state.sound(cue);
    }

    spawn_hostiles(state);
    state
        .hostiles
        .retain(|h| !h.is_outside(SCREEN_WIDTH, SCREEN_HEIGHT, HOSTILE_CULL_MARGIN));

    combat::hostile_pass(state);
    combat::melee_pass(state);
    combat::orb_pass(state);
    combat::bullet_pass(state);
    combat::hostile_bullet_pass(state);
    combat::satellite_pass(state);
    combat::meteor_pass(state);
    combat::cutter_pass(state);

    state.normalize_order();
    check_level_up(state);
}

fn announce_time(state: &mut GameState) {
    let left = state.seconds_left();
    if TIME_ALERTS.contains(&left) && state.alerts_fired.insert(left) {
        log::debug!("{left} seconds left");
        state.push_event(GameEvent::TimeAlert { seconds_left: left });
    }
}

fn move_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;
    let mut moving = false;

    if input.left {
        player.pos.x -= player.speed;
        player.facing_right = false;
        moving = true;
    } else if input.right {
        player.pos.x += player.speed;
        player.facing_right = true;
        moving = true;
    }
    if input.up {
        player.pos.y -= player.speed;
        moving = true;
    } else if input.down {
        player.pos.y += player.speed;
        moving = true;
    }

    let mut step = false;
    if moving {
        player.step_timer = player.step_timer.saturating_sub(1);
        if player.step_timer == 0 {
            player.step_timer = STEP_CUE_INTERVAL;
            step = true;
        }
    } else {
        player.step_timer = 0;
    }
    player.clamp_to_play_area();

    if step {
        state.sound(SoundCue::Step);
    }
}

fn spawn_hostiles(state: &mut GameState) {
    let mode = state.spawn_mode();
    let kinds = state.spawner.tick(mode, &mut state.rng);
    if !kinds.is_empty() {
        log::debug!("spawning {} hostiles at tick {}", kinds.len(), state.time_ticks);
    }
    for kind in kinds {
        let pos = edge_position(kind, &mut state.rng);
        let id = state.next_entity_id();
        state.hostiles.push(Hostile::new(id, kind, pos));
    }
}

fn check_level_up(state: &mut GameState) {
    if !state.phase.is_active() {
        return;
    }
    let Some(level) = state.progress.try_level_up() else {
        return;
    };
    log::info!("level {} reached at tick {}", level, state.time_ticks);
    let menu = LevelUpMenu::open(&mut state.rng, state.time_ticks, state.phase);
    state.menu = Some(menu);
    state.push_event(GameEvent::LevelUp { level });
    state.set_phase(GamePhase::LevelUpMenu);
}

/// Fill in intents for unattended play
fn autopilot(state: &GameState, input: &mut TickInput) {
    match state.phase {
        GamePhase::LevelUpMenu | GamePhase::GameClear => input.confirm = true,
        GamePhase::Playing | GamePhase::Endless => {
            let me = state.player.center();
            let threat = state
                .hostiles
                .iter()
                .map(|h| h.center())
                .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));

            let heading = match threat {
                Some(t) if t.distance(me) < AUTOPILOT_FLEE_RADIUS => me - t,
                _ => {
                    let home = Vec2::new(
                        PLAY_AREA_X + PLAY_AREA_WIDTH / 2.0,
                        PLAY_AREA_Y + PLAY_AREA_HEIGHT / 2.0,
                    );
                    home - me
                }
            };
            input.left = heading.x < -1.0;
            input.right = heading.x > 1.0;
            input.up = heading.y < -1.0;
            input.down = heading.y > 1.0;
        }
        GamePhase::GameOver => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::hostile::HostileKind;

    fn settings(campaign_seconds: u32) -> Settings {
        Settings {
            campaign_seconds,
            ..Settings::default()
        }
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_movement_priority_and_facing() {
        let mut state = GameState::new(1, &Settings::default());
        let start = state.player.pos;
        let input = TickInput {
            left: true,
            right: true,
            up: true,
            down: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.player.pos, start - Vec2::new(1.0, 1.0));
        assert!(!state.player.facing_right);

        tick(&mut state, &TickInput { down: true, ..Default::default() });
        assert!(!state.player.facing_right);
    }

    #[test]
    fn test_step_cue_every_four_ticks() {
        let mut state = GameState::new(1, &Settings::default());
        state.take_events();
        let walk = TickInput { right: true, ..Default::default() };
        let mut steps = 0;
        for _ in 0..8 {
            tick(&mut state, &walk);
            steps += state
                .take_events()
                .iter()
                .filter(|e| **e == GameEvent::Sound(SoundCue::Step))
                .count();
        }
        assert_eq!(steps, 2);
    }

    #[test]
    fn test_contact_death_scenario() {
        let mut state = GameState::new(3, &Settings::default());
        state.player.hp = 1;
        let id = state.next_entity_id();
        state
            .hostiles
            .push(Hostile::new(id, HostileKind::Basic, state.player.pos));

        let mut death_tick = None;
        for _ in 0..5 {
            tick(&mut state, &idle());
            if death_tick.is_none() && state.phase == GamePhase::GameOver {
                death_tick = Some(state.time_ticks);
            }
            assert_eq!(state.player.hp, 0);
        }
        assert_eq!(death_tick, Some(1));
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_ignores_everything_but_reset() {
        let mut state = GameState::new(3, &Settings::default());
        state.set_phase(GamePhase::GameOver);
        let before = state.elapsed_ticks;
        tick(&mut state, &TickInput { confirm: true, right: true, ..Default::default() });
        assert_eq!(state.elapsed_ticks, before);

        tick(&mut state, &TickInput { reset: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.hp, PLAYER_START_HP);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.take_events(), vec![GameEvent::Reset]);
    }

    #[test]
    fn test_level_up_menu_freezes_time() {
        let mut state = GameState::new(5, &Settings::default());
        state.progress.exp = state.progress.threshold;
        tick(&mut state, &idle());
        assert_eq!(state.phase, GamePhase::LevelUpMenu);
        assert_eq!(state.progress.level, 2);
        let menu = state.menu.clone().unwrap();
        assert_eq!(menu.options.len(), UPGRADE_CHOICES);

        let elapsed = state.elapsed_ticks;
        for _ in 0..100 {
            tick(&mut state, &idle());
        }
        assert_eq!(state.elapsed_ticks, elapsed);

        tick(&mut state, &TickInput { menu_down: true, ..Default::default() });
        assert_eq!(state.menu.as_ref().unwrap().selected, 1);
        tick(&mut state, &TickInput { confirm: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.menu.is_none());
        assert_eq!(state.endless_anchor, 102);
    }

    #[test]
    fn test_endless_clock_discounts_menu() {
        let mut state = GameState::new(5, &Settings::default());
        state.phase = GamePhase::Endless;
        state.endless_anchor = 0;
        state.time_ticks = TICKS_PER_MINUTE - 10;
        state.progress.exp = state.progress.threshold;
        tick(&mut state, &idle());
        assert_eq!(state.phase, GamePhase::LevelUpMenu);
        for _ in 0..50 {
            tick(&mut state, &idle());
        }
        tick(&mut state, &TickInput { confirm: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Endless);
        // 51 ticks of menu are not counted toward the first endless minute
        assert_eq!(state.endless_minutes(), 0);
        assert_eq!(state.endless_anchor, 51);
    }

    #[test]
    fn test_campaign_clear_and_endless() {
        let mut state = GameState::new(9, &settings(2));
        let mut ticks = 0;
        while state.phase != GamePhase::GameClear {
            tick(&mut state, &idle());
            if state.phase == GamePhase::LevelUpMenu {
                tick(&mut state, &TickInput { confirm: true, ..Default::default() });
            }
            ticks += 1;
            assert!(ticks < 200);
        }
        assert!(state.hostiles.is_empty());
        assert!(state.satellites.is_empty());
        assert_eq!(state.endless_anchor, state.time_ticks);

        tick(&mut state, &idle());
        assert_eq!(state.phase, GamePhase::GameClear);

        tick(&mut state, &TickInput { confirm: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Endless);
        assert!(state.overdrive);
        assert_eq!(state.satellites.len(), 5);
    }

    #[test]
    fn test_long_campaign_gets_no_overdrive() {
        let mut state = GameState::new(9, &settings(120));
        state.phase = GamePhase::GameClear;
        tick(&mut state, &TickInput { confirm: true, ..Default::default() });
        assert_eq!(state.phase, GamePhase::Endless);
        assert!(!state.overdrive);
    }

    #[test]
    fn test_time_alert_fires_once() {
        let mut state = GameState::new(1, &Settings::default());
        state.elapsed_ticks = state.config.campaign_ticks() - 240 * TICK_RATE as u64 - 1;
        tick(&mut state, &idle());
        tick(&mut state, &idle());
        let alerts: Vec<_> = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::TimeAlert { .. }))
            .collect();
        assert_eq!(alerts, vec![GameEvent::TimeAlert { seconds_left: 240 }]);
    }

    #[test]
    fn test_spawns_every_second() {
        let mut state = GameState::new(2, &Settings::default());
        for _ in 0..30 {
            tick(&mut state, &idle());
        }
        assert_eq!(state.hostiles.len(), 1);
        assert_eq!(state.hostiles[0].kind, HostileKind::Basic);
    }

    #[test]
    fn test_autopilot_is_deterministic() {
        let run = |seed| {
            let mut state = GameState::new(seed, &Settings::default());
            let input = TickInput { autopilot: true, ..Default::default() };
            for _ in 0..3000 {
                tick(&mut state, &input);
            }
            (state.kill_count, state.player.hp, state.player.pos, state.hostiles.len())
        };
        assert_eq!(run(42), run(42));
    }
}
