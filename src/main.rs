//! Ghost Survivor headless runner
//!
//! Runs the simulation at full speed with the autopilot, forwarding sound cues
//! to a logging sink. Settings come from the JSON file named by
//! `GHOST_SURVIVOR_SETTINGS`.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ghost_survivor::audio::{LogSink, dispatch};
use ghost_survivor::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use ghost_survivor::{RenderSnapshot, Settings, format_clock};

const SETTINGS_ENV: &str = "GHOST_SURVIVOR_SETTINGS";

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ghost Survivor (headless) starting...");

    let path = std::env::var_os(SETTINGS_ENV).map(PathBuf::from);
    let settings = Settings::load_or_default(path.as_deref());
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!(
        "seed {seed}, campaign {}s, up to {} ticks",
        settings.campaign_seconds,
        settings.max_ticks
    );

    let mut state = GameState::new(seed, &settings);
    let mut sink = LogSink::new();
    let input = TickInput {
        autopilot: settings.autopilot,
        ..Default::default()
    };

    while state.time_ticks < settings.max_ticks {
        tick(&mut state, &input);
        let events = state.take_events();
        dispatch(&events, &mut sink);
        for event in &events {
            match event {
                GameEvent::LevelUp { level } => log::debug!("level up -> {level}"),
                GameEvent::TimeAlert { seconds_left } => log::info!("{seconds_left}s remaining"),
                _ => {}
            }
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let snapshot = RenderSnapshot::capture(&state);
    log::info!(
        "finished in {:?} after {} ticks ({} played): level {}, {} kills, hp {}, {} live entities",
        snapshot.phase,
        state.time_ticks,
        format_clock(state.elapsed_ticks),
        snapshot.hud.level,
        snapshot.hud.kills,
        snapshot.hud.hp,
        snapshot.entities.len()
    );
    for (cue, count) in sink.counts() {
        log::info!("  {cue}: {count}");
    }
    match snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("failed to serialize final snapshot: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by an embedding host on the web; nothing to run here
}

/// Seed from wall-clock time when none is configured
#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
