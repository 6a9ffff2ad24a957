//! Collision resolution passes
//!
//! Each pass moves one entity class, then resolves its overlaps against
//! hostiles. Defeated hostiles stay in place until the pass ends so indices
//! remain stable; the pass ledger keeps a second hazard from crediting the
//! same kill.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;

use super::collision::{Hitbox, Rect};
use super::events::SoundCue;
use super::hazard::*;
use super::hostile::DamageOutcome;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// Hostiles defeated during the current pass
#[derive(Debug, Default)]
pub struct PassLedger {
    defeated: BTreeSet<u32>,
}

impl PassLedger {
    pub fn contains(&self, id: u32) -> bool {
        self.defeated.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.defeated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defeated.is_empty()
    }
}

/// Damage the hostile at `index` once, crediting the kill if it dies
pub fn strike(state: &mut GameState, ledger: &mut PassLedger, index: usize) -> DamageOutcome {
    let tick = state.time_ticks;
    let hostile = &mut state.hostiles[index];
    if ledger.contains(hostile.id) {
        return DamageOutcome::Ignored;
    }
    let outcome = hostile.take_damage(tick);
    match outcome {
        DamageOutcome::ShieldCracked => state.sound(SoundCue::ShieldBreak),
        DamageOutcome::Defeated => {
            let (id, center, cue) = (hostile.id, hostile.center(), hostile.kill_cue());
            ledger.defeated.insert(id);
            state.kill_count += state.player.attack_power as u64;
            state.spawn_orb(center);
            state.sound(cue);
        }
        DamageOutcome::Wounded | DamageOutcome::Ignored => {}
    }
    outcome
}

/// Strike every hostile overlapping `area`
fn strike_area(state: &mut GameState, ledger: &mut PassLedger, area: Rect) {
    for i in 0..state.hostiles.len() {
        if state.hostiles[i].hitbox().overlaps(&area) {
            strike(state, ledger, i);
        }
    }
}

/// Remove hostiles defeated during the pass
fn sweep(state: &mut GameState, ledger: PassLedger) {
    if !ledger.is_empty() {
        state.hostiles.retain(|h| !ledger.contains(h.id));
    }
}

/// Hurt the player unless immune. Returns true if damage landed.
fn hurt_player(state: &mut GameState, damage: i32) -> bool {
    if state.player.invincible > 0 || state.barrier_active() {
        return false;
    }
    state.sound(SoundCue::Hit);
    if state.player.hurt(damage) {
        log::info!("player defeated at tick {}", state.time_ticks);
        state.set_phase(GamePhase::GameOver);
    }
    true
}

/// Hostile AI, firing and player contact
pub fn hostile_pass(state: &mut GameState) {
    let target = state.player.pos;
    let aim = state.player.center();
    let mut ledger = PassLedger::default();

    for i in 0..state.hostiles.len() {
        if let Some(shot) = state.hostiles[i].update(target, aim) {
            let id = state.next_entity_id();
            let spec = BulletSpec {
                owner: BulletOwner::Hostile,
                origin: shot.origin,
                target: shot.target,
                speed: shot.speed,
                size: HOSTILE_BULLET_SIZE,
                damage: shot.damage,
                drops_exp: shot.drops_exp,
            };
            state
                .hostile_bullets
                .push(Bullet::new(id, spec, Delay::new(state.time_ticks, 0)));
            state.sound(SoundCue::EnemyShot);
        }

        let hostile = &state.hostiles[i];
        if !hostile.can_touch_player() || !state.player.overlaps(hostile) {
            continue;
        }
        let damage = hostile.contact_damage();
        if !hurt_player(state, damage) && state.barrier_active() {
            strike(state, &mut ledger, i);
        }
    }
    sweep(state, ledger);
}

/// Melee swings: spawn, follow the player, hit
pub fn melee_pass(state: &mut GameState) {
    let tick = state.time_ticks;
    if state.loadout.sword.ready() {
        let facing = state.player.facing_right;
        for i in 0..state.loadout.sword.count {
            let id = state.next_entity_id();
            let facing_right = if i % 2 == 1 { !facing } else { facing };
            let delay = Delay::new(tick, i * SWING_STAGGER_TICKS);
            let offset_y = -(i as f32) * SWING_STAGGER_Y;
            state
                .swings
                .push(Swing::new(id, state.player.pos, offset_y, facing_right, delay));
        }
    }

    let anchor = state.player.pos;
    for swing in &mut state.swings {
        swing.update(anchor, tick);
    }
    state.swings.retain(|s| s.is_alive(tick));

    let mut ledger = PassLedger::default();
    for s in 0..state.swings.len() {
        if !state.swings[s].is_active(tick) {
            continue;
        }
        let area = state.swings[s].hitbox();
        strike_area(state, &mut ledger, area);
    }
    sweep(state, ledger);
}

/// Orb attraction, pickup and Large-hostile orb clearing
pub fn orb_pass(state: &mut GameState) {
    let anchor = state.player.pos;
    let radius = state.player.attraction_radius;
    let player_box = state.player.hitbox();

    let mut collected = 0u32;
    let mut picked = 0usize;
    state.orbs.retain_mut(|orb| {
        orb.attract(anchor, radius);
        if orb.hitbox().overlaps(&player_box) {
            collected += orb.value;
            picked += 1;
            false
        } else {
            true
        }
    });
    state.progress.gain(collected);
    for _ in 0..picked {
        state.sound(SoundCue::Pickup);
    }

    let zones: Vec<Rect> = state
        .hostiles
        .iter()
        .filter_map(|h| h.orb_clear_zone())
        .collect();
    if !zones.is_empty() {
        state
            .orbs
            .retain(|orb| !zones.iter().any(|z| z.contains_point(orb.pos)));
    }
}

/// Auto-aimed bullet volleys
pub fn bullet_pass(state: &mut GameState) {
    let tick = state.time_ticks;
    if state.loadout.bullets.ready() && !state.hostiles.is_empty() {
        let origin = state.player.center();
        let mut targets: Vec<(f32, Vec2)> = state
            .hostiles
            .iter()
            .map(|h| (h.pos.distance(origin), h.center()))
            .collect();
        targets.sort_by(|a, b| a.0.total_cmp(&b.0));

        let count = (state.loadout.bullets.count as usize).min(targets.len());
        for (i, &(_, target)) in targets.iter().take(count).enumerate() {
            let id = state.next_entity_id();
            let spec = BulletSpec {
                owner: BulletOwner::Player,
                origin,
                target,
                speed: PLAYER_BULLET_SPEED,
                size: PLAYER_BULLET_SIZE,
                damage: state.player.attack_power as i32,
                drops_exp: true,
            };
            let delay = Delay::new(tick, i as u32 * PLAYER_BULLET_STAGGER_TICKS);
            state.player_bullets.push(Bullet::new(id, spec, delay));
        }
        state.sound(SoundCue::Volley);
    }

    for bullet in &mut state.player_bullets {
        bullet.update(tick);
    }
    state.player_bullets.retain(|b| b.is_alive());

    let mut ledger = PassLedger::default();
    let mut spent = BTreeSet::new();
    for b in 0..state.player_bullets.len() {
        if !state.player_bullets[b].is_active(tick) {
            continue;
        }
        let area = state.player_bullets[b].hitbox();
        let hit = (0..state.hostiles.len()).find(|&i| {
            !ledger.contains(state.hostiles[i].id) && state.hostiles[i].hitbox().overlaps(&area)
        });
        if let Some(i) = hit {
            if strike(state, &mut ledger, i) == DamageOutcome::Defeated {
                spent.insert(state.player_bullets[b].id);
            }
        }
    }
    state.player_bullets.retain(|b| !spent.contains(&b.id));
    sweep(state, ledger);
}

/// Hostile bullets: flight, player hits, destruction by player hazards
pub fn hostile_bullet_pass(state: &mut GameState) {
    let tick = state.time_ticks;
    for bullet in &mut state.hostile_bullets {
        bullet.update(tick);
    }
    state.hostile_bullets.retain(|b| b.is_alive());

    let mut removed = BTreeSet::new();
    let mut spent_player_bullets = BTreeSet::new();
    for b in 0..state.hostile_bullets.len() {
        let bullet = &state.hostile_bullets[b];
        let (id, area, damage, drops_exp) = (bullet.id, bullet.hitbox(), bullet.damage, bullet.drops_exp);

        if area.overlaps(&state.player.hitbox()) && hurt_player(state, damage) {
            removed.insert(id);
            continue;
        }

        let by_swing = state
            .swings
            .iter()
            .any(|s| s.is_active(tick) && s.hitbox().overlaps(&area));
        let by_player_bullet = if by_swing {
            None
        } else {
            state.player_bullets.iter().find(|p| {
                p.is_active(tick)
                    && !spent_player_bullets.contains(&p.id)
                    && p.hitbox().overlaps(&area)
            })
        };
        if let Some(p) = by_player_bullet {
            spent_player_bullets.insert(p.id);
        }
        let cleared = by_swing
            || by_player_bullet.is_some()
            || state.satellites.iter().any(|s| s.hitbox().overlaps(&area))
            || state
                .meteors
                .iter()
                .filter_map(|m| m.explosion())
                .any(|r| r.overlaps(&area))
            || state
                .cutters
                .iter()
                .any(|c| c.is_active(tick) && c.hitbox().overlaps(&area));

        if cleared {
            removed.insert(id);
            if drops_exp {
                state.spawn_orb(area.center());
            }
            state.sound(SoundCue::BulletCleared);
        }
    }
    state.hostile_bullets.retain(|b| !removed.contains(&b.id));
    state
        .player_bullets
        .retain(|b| !spent_player_bullets.contains(&b.id));
}

/// Orbiting satellites
pub fn satellite_pass(state: &mut GameState) {
    let anchor = state.player.pos;
    for sat in &mut state.satellites {
        sat.update(anchor);
    }
    let mut ledger = PassLedger::default();
    for s in 0..state.satellites.len() {
        let area = state.satellites[s].hitbox();
        strike_area(state, &mut ledger, area);
    }
    sweep(state, ledger);
}

/// Meteor strikes
pub fn meteor_pass(state: &mut GameState) {
    let tick = state.time_ticks;
    if state.loadout.meteors.ready() {
        for i in 0..state.loadout.meteors.count {
            let start = Vec2::new(
                state.rng.random_range(SCREEN_WIDTH..SCREEN_WIDTH + 30.0),
                state.rng.random_range(-30.0..0.0),
            );
            let target = Vec2::new(
                state
                    .rng
                    .random_range(PLAY_AREA_X..PLAY_AREA_X + PLAY_AREA_WIDTH - METEOR_SIZE),
                state
                    .rng
                    .random_range(PLAY_AREA_Y..PLAY_AREA_Y + PLAY_AREA_HEIGHT - METEOR_SIZE),
            );
            let id = state.next_entity_id();
            let delay = Delay::new(tick, i * METEOR_STAGGER_TICKS);
            state.meteors.push(Meteor::new(id, start, target, delay));
        }
    }

    let mut impacts = 0;
    for meteor in &mut state.meteors {
        if meteor.update(tick) {
            impacts += 1;
        }
    }
    for _ in 0..impacts {
        state.sound(SoundCue::MeteorImpact);
    }
    state.meteors.retain(|m| m.is_alive(tick));

    let mut ledger = PassLedger::default();
    for m in 0..state.meteors.len() {
        if let Some(area) = state.meteors[m].explosion() {
            strike_area(state, &mut ledger, area);
        }
    }
    sweep(state, ledger);
}

/// Ricochet cutters
pub fn cutter_pass(state: &mut GameState) {
    let tick = state.time_ticks;
    if state.loadout.cutters.ready() {
        let origin = state.player.center();
        for i in 0..state.loadout.cutters.count {
            let angle = state.rng.random_range(0.0..360.0);
            let reflections = state
                .rng
                .random_range(CUTTER_MIN_REFLECTIONS..=CUTTER_MAX_REFLECTIONS);
            let id = state.next_entity_id();
            let delay = Delay::new(tick, i * CUTTER_STAGGER_TICKS);
            state
                .cutters
                .push(Cutter::new(id, origin, angle, reflections, delay));
        }
    }

    for cutter in &mut state.cutters {
        cutter.update(tick);
    }
    state.cutters.retain(|c| c.is_alive());

    let mut ledger = PassLedger::default();
    for c in 0..state.cutters.len() {
        if !state.cutters[c].is_active(tick) {
            continue;
        }
        let area = state.cutters[c].hitbox();
        strike_area(state, &mut ledger, area);
    }
    sweep(state, ledger);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::events::GameEvent;
    use crate::sim::hostile::{Hostile, HostileKind};

    fn fresh_state() -> GameState {
        let mut state = GameState::new(11, &Settings::default());
        state.time_ticks = 1;
        state
    }

    fn add_hostile(state: &mut GameState, kind: HostileKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.hostiles.push(Hostile::new(id, kind, pos));
        id
    }

    fn sounds(state: &mut GameState) -> Vec<SoundCue> {
        state
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Sound(cue) => Some(cue),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_kill_credit() {
        let mut state = fresh_state();
        state.player.attack_power = 2;
        add_hostile(&mut state, HostileKind::Basic, Vec2::new(10.0, 10.0));
        let mut ledger = PassLedger::default();

        assert_eq!(strike(&mut state, &mut ledger, 0), DamageOutcome::Defeated);
        // A second hazard in the same pass cannot re-credit
        assert_eq!(strike(&mut state, &mut ledger, 0), DamageOutcome::Ignored);
        sweep(&mut state, ledger);

        assert!(state.hostiles.is_empty());
        assert_eq!(state.kill_count, 2);
        assert_eq!(state.orbs.len(), 1);
        assert_eq!(state.orbs[0].pos, Vec2::new(14.0, 14.0));
        assert_eq!(sounds(&mut state), vec![SoundCue::Kill]);
    }

    #[test]
    fn test_contact_respects_invincibility() {
        let mut state = fresh_state();
        let pos = state.player.pos;
        add_hostile(&mut state, HostileKind::Basic, pos);
        add_hostile(&mut state, HostileKind::Basic, pos);
        hostile_pass(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP - 1);
        assert_eq!(state.player.invincible, PLAYER_INVINCIBLE_TICKS);
        assert_eq!(state.hostiles.len(), 2);
    }

    #[test]
    fn test_large_contact_damage() {
        let mut state = fresh_state();
        let pos = state.player.pos - Vec2::splat(4.0);
        add_hostile(&mut state, HostileKind::Large, pos);
        hostile_pass(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP - 3);
    }

    #[test]
    fn test_barrier_turns_contact_into_damage() {
        let mut state = fresh_state();
        state.loadout.barrier.unlocked = true;
        state.loadout.barrier.active = true;
        let pos = state.player.pos;
        add_hostile(&mut state, HostileKind::Basic, pos);
        hostile_pass(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.kill_count, 1);
    }

    #[test]
    fn test_blinking_shielded_has_no_contact() {
        let mut state = fresh_state();
        let pos = state.player.pos;
        add_hostile(&mut state, HostileKind::Shielded, pos);
        state.hostiles[0].take_damage(0);
        hostile_pass(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP);
    }

    #[test]
    fn test_swing_kills_in_front() {
        let mut state = fresh_state();
        state.loadout.sword.timer = 29;
        let pos = state.player.pos + Vec2::new(9.0, 0.0);
        add_hostile(&mut state, HostileKind::Basic, pos);
        melee_pass(&mut state);
        assert_eq!(state.swings.len(), 1);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.kill_count, 1);
    }

    #[test]
    fn test_multi_sword_alternates_and_delays() {
        let mut state = fresh_state();
        state.loadout.sword.timer = 29;
        state.loadout.sword.count = 3;
        melee_pass(&mut state);
        let swings = &state.swings;
        assert_eq!(swings.len(), 3);
        assert!(swings[0].facing_right);
        assert!(!swings[1].facing_right);
        assert!(swings[2].facing_right);
        assert!(swings[0].is_active(1));
        assert!(!swings[1].is_active(1));
        assert_eq!(swings[2].offset_y, -4.0);
    }

    #[test]
    fn test_orb_pickup_and_large_clearing() {
        let mut state = fresh_state();
        let near = state.player.center();
        state.spawn_orb(near);
        state.spawn_orb(Vec2::new(10.0, 10.0));
        add_hostile(&mut state, HostileKind::Large, Vec2::new(2.0, 2.0));
        orb_pass(&mut state);
        assert_eq!(state.progress.exp, ORB_VALUE);
        assert!(state.orbs.is_empty());
        assert_eq!(sounds(&mut state), vec![SoundCue::Pickup]);
    }

    #[test]
    fn test_volley_targets_nearest() {
        let mut state = fresh_state();
        state.loadout.bullets.grant();
        state.loadout.bullets.timer = 89;
        let center = state.player.center();
        add_hostile(&mut state, HostileKind::Basic, Vec2::new(0.0, 0.0));
        add_hostile(&mut state, HostileKind::Basic, center + Vec2::new(20.0, -4.0));
        bullet_pass(&mut state);
        assert_eq!(state.player_bullets.len(), 1);
        assert!(state.player_bullets[0].vel.x > 0.0);
        assert!(sounds(&mut state).contains(&SoundCue::Volley));
    }

    #[test]
    fn test_player_bullet_consumed_on_kill() {
        let mut state = fresh_state();
        let spec = BulletSpec {
            owner: BulletOwner::Player,
            origin: Vec2::new(20.0, 20.0),
            target: Vec2::new(30.0, 20.0),
            speed: PLAYER_BULLET_SPEED,
            size: PLAYER_BULLET_SIZE,
            damage: 1,
            drops_exp: true,
        };
        state.player_bullets.push(Bullet::new(99, spec, Delay::new(0, 0)));
        add_hostile(&mut state, HostileKind::Basic, Vec2::new(22.0, 16.0));
        bullet_pass(&mut state);
        assert!(state.player_bullets.is_empty());
        assert!(state.hostiles.is_empty());
    }

    #[test]
    fn test_hostile_bullet_hits_player_once() {
        let mut state = fresh_state();
        let spec = BulletSpec {
            owner: BulletOwner::Hostile,
            origin: state.player.center(),
            target: state.player.center() + Vec2::X,
            speed: 0.1,
            size: HOSTILE_BULLET_SIZE,
            damage: 3,
            drops_exp: false,
        };
        state.hostile_bullets.push(Bullet::new(1, spec, Delay::new(0, 0)));
        state.hostile_bullets.push(Bullet::new(2, spec, Delay::new(0, 0)));
        hostile_bullet_pass(&mut state);
        assert_eq!(state.player.hp, PLAYER_START_HP - 3);
        assert_eq!(state.hostile_bullets.len(), 1);
    }

    #[test]
    fn test_swing_clears_hostile_bullet_with_orb() {
        let mut state = fresh_state();
        state.player.invincible = 10;
        let swing = Swing::new(50, state.player.pos, 0.0, true, Delay::new(0, 0));
        let spot = swing.hitbox().center();
        state.swings.push(swing);
        let spec = BulletSpec {
            owner: BulletOwner::Hostile,
            origin: spot,
            target: spot + Vec2::Y,
            speed: 0.0,
            size: HOSTILE_BULLET_SIZE,
            damage: 1,
            drops_exp: true,
        };
        state.hostile_bullets.push(Bullet::new(1, spec, Delay::new(0, 0)));
        hostile_bullet_pass(&mut state);
        assert!(state.hostile_bullets.is_empty());
        assert_eq!(state.orbs.len(), 1);
        assert_eq!(sounds(&mut state), vec![SoundCue::BulletCleared]);
    }

    #[test]
    fn test_player_bullet_trades_with_hostile_bullet() {
        let mut state = fresh_state();
        state.player.invincible = 10;
        let spot = Vec2::new(100.0, 10.0);
        let mine = BulletSpec {
            owner: BulletOwner::Player,
            origin: spot,
            target: spot + Vec2::X,
            speed: 0.0,
            size: PLAYER_BULLET_SIZE,
            damage: 1,
            drops_exp: true,
        };
        let theirs = BulletSpec {
            owner: BulletOwner::Hostile,
            size: HOSTILE_BULLET_SIZE,
            drops_exp: false,
            ..mine
        };
        state.player_bullets.push(Bullet::new(1, mine, Delay::new(0, 0)));
        state.hostile_bullets.push(Bullet::new(2, theirs, Delay::new(0, 0)));
        hostile_bullet_pass(&mut state);
        assert!(state.hostile_bullets.is_empty());
        assert!(state.player_bullets.is_empty());
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_meteor_explosion_kills() {
        let mut state = fresh_state();
        let mut meteor = Meteor::new(5, Vec2::ZERO, Vec2::new(60.0, 30.0), Delay::new(0, 0));
        meteor.phase = MeteorPhase::Exploding;
        meteor.pos = meteor.target;
        state.meteors.push(meteor);
        add_hostile(&mut state, HostileKind::Basic, Vec2::new(56.0, 26.0));
        meteor_pass(&mut state);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.kill_count, 1);
    }

    #[test]
    fn test_cutter_volley_spawns_from_center() {
        let mut state = fresh_state();
        state.loadout.cutters.grant();
        state.loadout.cutters.grant();
        state.loadout.cutters.timer = 179;
        cutter_pass(&mut state);
        assert_eq!(state.cutters.len(), 2);
        // The second cutter is still waiting at the launch point
        assert_eq!(state.cutters[1].pos, state.player.center());
        for c in &state.cutters {
            assert!((CUTTER_MIN_REFLECTIONS..=CUTTER_MAX_REFLECTIONS).contains(&c.reflections_left));
        }
    }
}
