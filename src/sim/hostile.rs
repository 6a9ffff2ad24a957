//! Hostile catalog and per-kind behavior
//!
//! A single `Hostile` record carries a kind tag plus kind-specific state. The
//! static numbers for each kind live in one profile table; movement, firing and
//! damage response dispatch on `HostileState`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, Rect};
use super::events::SoundCue;
use crate::homing_step;

/// Ticks spent in each accelerate / decelerate / idle phase
pub const CYCLE_PHASE_TICKS: u32 = 30;
/// Stationary blink window after a Shielded hostile loses its shield
pub const SHIELD_BLINK_TICKS: u32 = 30;
pub const SHIELD_BLINK_INTERVAL: u32 = 5;
/// Damage immunity after each hit on a TieredShielded hostile
pub const TIER_INVULNERABLE_TICKS: u32 = 10;
pub const TIER_BLINK_INTERVAL: u32 = 2;
pub const SHIELDED_RUSH_SPEED: f32 = 0.8;
/// Side of the square around a Large hostile's center that eats orbs
pub const ORB_CLEAR_SIZE: f32 = 20.0;

pub const PULSE_BULLET_SPEED: f32 = 0.5;
pub const BURST_BULLET_SPEED: f32 = 1.0;
pub const BURST_BULLET_DAMAGE: i32 = 3;
pub const BURST_SHOTS: u32 = 5;
pub const BURST_SHOT_INTERVAL: u32 = 10;

/// Hostile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostileKind {
    Basic,
    PulseShooter,
    Shielded,
    TieredShielded,
    BurstShooter,
    Large,
}

/// Static numbers shared by every hostile of one kind
#[derive(Debug, Clone, Copy)]
pub struct KindProfile {
    pub size: Vec2,
    pub hp: i32,
    pub speed: f32,
    pub contact_damage: i32,
    /// Outward spawn band depth, in multiples of the hitbox width
    pub spawn_buffer_factor: f32,
}

const BASIC: KindProfile = KindProfile {
    size: Vec2::new(8.0, 8.0),
    hp: 1,
    speed: 0.5,
    contact_damage: 1,
    spawn_buffer_factor: 2.0,
};
const PULSE_SHOOTER: KindProfile = KindProfile {
    size: Vec2::new(16.0, 8.0),
    hp: 1,
    speed: 0.3,
    contact_damage: 1,
    spawn_buffer_factor: 2.0,
};
const SHIELDED: KindProfile = KindProfile {
    size: Vec2::new(8.0, 8.0),
    hp: 2,
    speed: 0.4,
    contact_damage: 1,
    spawn_buffer_factor: 2.0,
};
const TIERED_SHIELDED: KindProfile = KindProfile {
    size: Vec2::new(8.0, 8.0),
    hp: 4,
    speed: 0.4,
    contact_damage: 1,
    spawn_buffer_factor: 2.0,
};
const BURST_SHOOTER: KindProfile = KindProfile {
    size: Vec2::new(16.0, 8.0),
    hp: 1,
    speed: 0.5,
    contact_damage: 1,
    spawn_buffer_factor: 4.0,
};
const LARGE: KindProfile = KindProfile {
    size: Vec2::new(16.0, 16.0),
    hp: 1,
    speed: 0.5,
    contact_damage: 3,
    spawn_buffer_factor: 2.0,
};

impl HostileKind {
    pub const ALL: [HostileKind; 6] = [
        HostileKind::Basic,
        HostileKind::PulseShooter,
        HostileKind::Shielded,
        HostileKind::TieredShielded,
        HostileKind::BurstShooter,
        HostileKind::Large,
    ];

    pub fn profile(self) -> &'static KindProfile {
        match self {
            HostileKind::Basic => &BASIC,
            HostileKind::PulseShooter => &PULSE_SHOOTER,
            HostileKind::Shielded => &SHIELDED,
            HostileKind::TieredShielded => &TIERED_SHIELDED,
            HostileKind::BurstShooter => &BURST_SHOOTER,
            HostileKind::Large => &LARGE,
        }
    }

    /// Depth of the off-screen band this kind spawns in
    pub fn spawn_buffer(self) -> f32 {
        let p = self.profile();
        p.size.x * p.spawn_buffer_factor
    }

    pub fn name(self) -> &'static str {
        match self {
            HostileKind::Basic => "basic",
            HostileKind::PulseShooter => "pulse-shooter",
            HostileKind::Shielded => "shielded",
            HostileKind::TieredShielded => "tiered-shielded",
            HostileKind::BurstShooter => "burst-shooter",
            HostileKind::Large => "large",
        }
    }
}

/// Phase of the accelerate / decelerate / idle movement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePhase {
    Accelerating,
    Decelerating,
    Idle,
    /// Stationary burst (BurstShooter only)
    Firing,
}

/// Speed ramp shared by the two shooter kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub phase: CyclePhase,
    pub timer: u32,
    pub speed: f32,
}

impl Cycle {
    fn new() -> Self {
        Self {
            phase: CyclePhase::Accelerating,
            timer: 0,
            speed: 0.0,
        }
    }

    /// Advance one ramp tick. Returns the phase entered on transition.
    fn ramp(&mut self, base: f32) -> Option<CyclePhase> {
        let t = (self.timer as f32 / CYCLE_PHASE_TICKS as f32).min(1.0);
        match self.phase {
            CyclePhase::Accelerating => {
                self.speed = base * t;
                if self.timer >= CYCLE_PHASE_TICKS {
                    return Some(self.enter(CyclePhase::Decelerating));
                }
            }
            CyclePhase::Decelerating => {
                self.speed = base * (1.0 - t);
                if self.timer >= CYCLE_PHASE_TICKS {
                    return Some(self.enter(CyclePhase::Idle));
                }
            }
            CyclePhase::Idle | CyclePhase::Firing => self.speed = 0.0,
        }
        None
    }

    fn enter(&mut self, phase: CyclePhase) -> CyclePhase {
        self.phase = phase;
        self.timer = 0;
        phase
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldStage {
    Shielded,
    /// Stationary and untouchable after the shield breaks
    Blinking,
    Rush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShieldTier {
    Green,
    Blue,
    Red,
    Broken,
}

impl ShieldTier {
    fn for_hp(hp: i32) -> Self {
        match hp {
            4.. => ShieldTier::Green,
            3 => ShieldTier::Blue,
            2 => ShieldTier::Red,
            _ => ShieldTier::Broken,
        }
    }
}

/// Kind-specific state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HostileState {
    /// Constant-speed homing (Basic, Large)
    Homing,
    Pulse {
        cycle: Cycle,
        fired: bool,
    },
    Shield {
        stage: ShieldStage,
        timer: u32,
        blink: u32,
    },
    Tiered {
        tier: ShieldTier,
        invulnerable: u32,
        blink: u32,
    },
    Burst {
        cycle: Cycle,
        fire_timer: u32,
        fired: u32,
    },
}

/// Result of a damage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already hit this tick, or currently immune
    Ignored,
    Wounded,
    /// A shield tier was knocked off
    ShieldCracked,
    Defeated,
}

/// Bullet request produced by a shooter's update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileShot {
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub drops_exp: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub kind: HostileKind,
    /// Top-left corner
    pub pos: Vec2,
    pub hp: i32,
    /// Tick of the last accepted damage call
    pub last_hit_tick: Option<u64>,
    pub state: HostileState,
}

impl Hostile {
    pub fn new(id: u32, kind: HostileKind, pos: Vec2) -> Self {
        let state = match kind {
            HostileKind::Basic | HostileKind::Large => HostileState::Homing,
            HostileKind::PulseShooter => HostileState::Pulse {
                cycle: Cycle::new(),
                fired: false,
            },
            HostileKind::Shielded => HostileState::Shield {
                stage: ShieldStage::Shielded,
                timer: 0,
                blink: 0,
            },
            HostileKind::TieredShielded => HostileState::Tiered {
                tier: ShieldTier::Green,
                invulnerable: 0,
                blink: 0,
            },
            HostileKind::BurstShooter => HostileState::Burst {
                cycle: Cycle::new(),
                fire_timer: 0,
                fired: 0,
            },
        };
        Self {
            id,
            kind,
            pos,
            hp: kind.profile().hp,
            last_hit_tick: None,
            state,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.kind.profile().size
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() * 0.5
    }

    pub fn contact_damage(&self) -> i32 {
        self.kind.profile().contact_damage
    }

    /// Current movement speed after state-machine gating
    pub fn current_speed(&self) -> f32 {
        let base = self.kind.profile().speed;
        match self.state {
            HostileState::Homing | HostileState::Tiered { .. } => base,
            HostileState::Pulse { cycle, .. } | HostileState::Burst { cycle, .. } => cycle.speed,
            HostileState::Shield { stage, .. } => match stage {
                ShieldStage::Shielded => base,
                ShieldStage::Blinking => 0.0,
                ShieldStage::Rush => SHIELDED_RUSH_SPEED,
            },
        }
    }

    /// Run one tick of the state machine and move toward `target`
    ///
    /// `player_center` is the aim point for any bullet fired this tick.
    pub fn update(&mut self, target: Vec2, player_center: Vec2) -> Option<HostileShot> {
        let base = self.kind.profile().speed;
        let muzzle = self.center();
        let mut shot = None;

        match &mut self.state {
            HostileState::Homing => {}
            HostileState::Pulse { cycle, fired } => {
                cycle.timer += 1;
                if cycle.phase != CyclePhase::Idle {
                    if cycle.ramp(base) == Some(CyclePhase::Decelerating) {
                        *fired = false;
                    }
                } else {
                    cycle.speed = 0.0;
                    if !*fired {
                        *fired = true;
                        shot = Some(HostileShot {
                            origin: muzzle,
                            target: player_center,
                            speed: PULSE_BULLET_SPEED,
                            damage: 1,
                            drops_exp: true,
                        });
                    }
                    if cycle.timer >= CYCLE_PHASE_TICKS {
                        cycle.enter(CyclePhase::Accelerating);
                    }
                }
            }
            HostileState::Shield {
                stage,
                timer,
                blink,
            } => {
                if *stage == ShieldStage::Blinking {
                    *timer += 1;
                    *blink = (*blink + 1) % (SHIELD_BLINK_INTERVAL * 2);
                    if *timer >= SHIELD_BLINK_TICKS {
                        *stage = ShieldStage::Rush;
                        *timer = 0;
                        *blink = 0;
                    }
                }
            }
            HostileState::Tiered {
                invulnerable,
                blink,
                ..
            } => {
                if *invulnerable > 0 {
                    *invulnerable -= 1;
                    *blink = (*blink + 1) % (TIER_BLINK_INTERVAL * 2);
                } else {
                    *blink = 0;
                }
            }
            HostileState::Burst {
                cycle,
                fire_timer,
                fired,
            } => match cycle.phase {
                CyclePhase::Accelerating | CyclePhase::Decelerating => {
                    cycle.timer += 1;
                    if cycle.ramp(base) == Some(CyclePhase::Idle) {
                        *fired = 0;
                    }
                }
                CyclePhase::Idle => {
                    cycle.speed = 0.0;
                    cycle.timer += 1;
                    if cycle.timer >= CYCLE_PHASE_TICKS {
                        cycle.enter(CyclePhase::Firing);
                        *fire_timer = 0;
                    }
                }
                CyclePhase::Firing => {
                    cycle.speed = 0.0;
                    *fire_timer += 1;
                    if *fire_timer >= BURST_SHOT_INTERVAL && *fired < BURST_SHOTS {
                        shot = Some(HostileShot {
                            origin: muzzle,
                            target: player_center,
                            speed: BURST_BULLET_SPEED,
                            damage: BURST_BULLET_DAMAGE,
                            drops_exp: false,
                        });
                        *fired += 1;
                        *fire_timer = 0;
                    }
                    if *fired >= BURST_SHOTS && *fire_timer >= BURST_SHOT_INTERVAL {
                        cycle.enter(CyclePhase::Accelerating);
                    }
                }
            },
        }

        let speed = self.current_speed();
        if speed > 0.0 {
            self.pos += homing_step(self.pos, target, speed);
        }
        shot
    }

    /// Apply one point of damage, at most once per tick
    pub fn take_damage(&mut self, tick: u64) -> DamageOutcome {
        if self.is_immune() || self.last_hit_tick == Some(tick) {
            return DamageOutcome::Ignored;
        }
        self.last_hit_tick = Some(tick);
        self.hp -= 1;
        if self.hp <= 0 {
            return DamageOutcome::Defeated;
        }

        match &mut self.state {
            HostileState::Shield {
                stage,
                timer,
                blink,
            } if *stage == ShieldStage::Shielded => {
                *stage = ShieldStage::Blinking;
                *timer = 0;
                *blink = 0;
                DamageOutcome::Wounded
            }
            HostileState::Tiered {
                tier,
                invulnerable,
                blink,
            } => {
                *tier = ShieldTier::for_hp(self.hp);
                *invulnerable = TIER_INVULNERABLE_TICKS;
                *blink = 0;
                DamageOutcome::ShieldCracked
            }
            _ => DamageOutcome::Wounded,
        }
    }

    /// Immune windows swallow damage without stamping the hit tick
    pub fn is_immune(&self) -> bool {
        match self.state {
            HostileState::Shield { stage, .. } => stage == ShieldStage::Blinking,
            HostileState::Tiered { invulnerable, .. } => invulnerable > 0,
            _ => false,
        }
    }

    /// Whether overlapping the player counts as contact this tick
    pub fn can_touch_player(&self) -> bool {
        !matches!(
            self.state,
            HostileState::Shield {
                stage: ShieldStage::Blinking,
                ..
            }
        )
    }

    pub fn kill_cue(&self) -> SoundCue {
        match self.kind {
            HostileKind::TieredShielded => SoundCue::HeavyKill,
            _ => SoundCue::Kill,
        }
    }

    /// Blink-aware visibility for the renderer
    pub fn visible(&self) -> bool {
        match self.state {
            HostileState::Shield {
                stage: ShieldStage::Blinking,
                blink,
                ..
            } => blink % (SHIELD_BLINK_INTERVAL * 2) >= SHIELD_BLINK_INTERVAL,
            HostileState::Tiered {
                invulnerable, blink, ..
            } if invulnerable > 0 => blink % (TIER_BLINK_INTERVAL * 2) >= TIER_BLINK_INTERVAL,
            _ => true,
        }
    }

    pub fn visual_state(&self) -> &'static str {
        match self.state {
            HostileState::Homing => "homing",
            HostileState::Pulse { cycle, .. } | HostileState::Burst { cycle, .. } => {
                match cycle.phase {
                    CyclePhase::Accelerating => "accelerating",
                    CyclePhase::Decelerating => "decelerating",
                    CyclePhase::Idle => "idle",
                    CyclePhase::Firing => "firing",
                }
            }
            HostileState::Shield { stage, .. } => match stage {
                ShieldStage::Shielded => "shielded",
                ShieldStage::Blinking => "blinking",
                ShieldStage::Rush => "rush",
            },
            HostileState::Tiered { tier, .. } => match tier {
                ShieldTier::Green => "green",
                ShieldTier::Blue => "blue",
                ShieldTier::Red => "red",
                ShieldTier::Broken => "broken",
            },
        }
    }

    /// Orb-eating zone (Large only)
    pub fn orb_clear_zone(&self) -> Option<Rect> {
        (self.kind == HostileKind::Large).then(|| Rect::centered(self.center(), ORB_CLEAR_SIZE))
    }

    /// True once the hostile has wandered past its spawn band plus `margin`
    pub fn is_outside(&self, width: f32, height: f32, margin: f32) -> bool {
        let m = margin + self.kind.spawn_buffer();
        self.pos.x < -m || self.pos.x > width + m || self.pos.y < -m || self.pos.y > height + m
    }
}

impl Hitbox for Hostile {
    fn hitbox(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_target() -> Vec2 {
        Vec2::new(1000.0, 0.0)
    }

    #[test]
    fn test_basic_homes_at_constant_speed() {
        let mut h = Hostile::new(1, HostileKind::Basic, Vec2::ZERO);
        let shot = h.update(Vec2::new(10.0, 0.0), Vec2::ZERO);
        assert!(shot.is_none());
        assert!((h.pos.x - 0.5).abs() < 1e-6);
        assert_eq!(h.pos.y, 0.0);
    }

    #[test]
    fn test_no_movement_on_target() {
        let mut h = Hostile::new(1, HostileKind::Large, Vec2::new(5.0, 5.0));
        h.update(Vec2::new(5.0, 5.0), Vec2::ZERO);
        assert_eq!(h.pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_damage_is_idempotent_within_tick() {
        let mut h = Hostile::new(1, HostileKind::TieredShielded, Vec2::ZERO);
        h.state = HostileState::Homing;
        assert_eq!(h.take_damage(7), DamageOutcome::Wounded);
        assert_eq!(h.take_damage(7), DamageOutcome::Ignored);
        assert_eq!(h.hp, 3);
        assert_eq!(h.take_damage(8), DamageOutcome::Wounded);
        assert_eq!(h.hp, 2);
    }

    #[test]
    fn test_pulse_shooter_fires_once_per_cycle() {
        let mut h = Hostile::new(1, HostileKind::PulseShooter, Vec2::ZERO);
        let mut shots = Vec::new();
        for tick in 0..(CYCLE_PHASE_TICKS * 3 * 2) {
            if let Some(s) = h.update(far_target(), far_target()) {
                shots.push(tick);
                assert_eq!(s.damage, 1);
                assert!(s.drops_exp);
            }
        }
        assert_eq!(shots.len(), 2);
        // Fired on the first idle tick of each cycle
        assert_eq!(shots[1] - shots[0], CYCLE_PHASE_TICKS * 3);
    }

    #[test]
    fn test_pulse_shooter_idles_in_place() {
        let mut h = Hostile::new(1, HostileKind::PulseShooter, Vec2::ZERO);
        for _ in 0..(CYCLE_PHASE_TICKS * 2) {
            h.update(far_target(), far_target());
        }
        if let HostileState::Pulse { cycle, .. } = h.state {
            assert_eq!(cycle.phase, CyclePhase::Idle);
        } else {
            panic!("wrong state");
        }
        let before = h.pos;
        h.update(far_target(), far_target());
        assert_eq!(h.pos, before);
        assert!(h.pos.x > 0.0);
    }

    #[test]
    fn test_burst_shooter_fires_five() {
        let mut h = Hostile::new(1, HostileKind::BurstShooter, Vec2::ZERO);
        let mut shots = Vec::new();
        // accel + decel + idle + burst
        let ticks = CYCLE_PHASE_TICKS * 3 + (BURST_SHOTS + 1) * BURST_SHOT_INTERVAL;
        for tick in 0..ticks {
            if let Some(s) = h.update(far_target(), far_target()) {
                assert_eq!(s.damage, BURST_BULLET_DAMAGE);
                assert!(!s.drops_exp);
                shots.push(tick);
            }
        }
        assert_eq!(shots.len(), BURST_SHOTS as usize);
        assert!(shots.windows(2).all(|w| w[1] - w[0] == BURST_SHOT_INTERVAL));
        if let HostileState::Burst { cycle, .. } = h.state {
            assert_eq!(cycle.phase, CyclePhase::Accelerating);
        }
    }

    #[test]
    fn test_shielded_blinks_then_rushes() {
        let mut h = Hostile::new(1, HostileKind::Shielded, Vec2::ZERO);
        assert_eq!(h.take_damage(1), DamageOutcome::Wounded);
        assert!(h.is_immune());
        assert!(!h.can_touch_player());
        assert_eq!(h.current_speed(), 0.0);

        // Damage during the blink is swallowed without stamping
        assert_eq!(h.take_damage(2), DamageOutcome::Ignored);
        assert_eq!(h.last_hit_tick, Some(1));

        for _ in 0..SHIELD_BLINK_TICKS {
            h.update(far_target(), far_target());
        }
        assert_eq!(h.current_speed(), SHIELDED_RUSH_SPEED);
        assert_eq!(h.take_damage(40), DamageOutcome::Defeated);
    }

    #[test]
    fn test_tiered_shield_needs_four_hits() {
        let mut h = Hostile::new(1, HostileKind::TieredShielded, Vec2::ZERO);
        let mut tiers = vec![h.visual_state()];
        let mut tick = 0;
        let mut outcome = DamageOutcome::Ignored;
        let mut accepted = 0;
        while outcome != DamageOutcome::Defeated {
            tick += 1;
            outcome = h.take_damage(tick);
            if outcome != DamageOutcome::Ignored {
                accepted += 1;
                tiers.push(h.visual_state());
                // Further calls inside the window are no-ops
                let hp = h.hp;
                if outcome != DamageOutcome::Defeated {
                    assert_eq!(h.take_damage(tick + 1), DamageOutcome::Ignored);
                    assert_eq!(h.hp, hp);
                }
            }
            h.update(Vec2::ZERO, Vec2::ZERO);
            assert!(tick < 200);
        }
        assert_eq!(accepted, 4);
        assert_eq!(&tiers[..4], &["green", "blue", "red", "broken"]);
        assert_eq!(h.kill_cue(), SoundCue::HeavyKill);
    }

    #[test]
    fn test_large_clear_zone() {
        let h = Hostile::new(1, HostileKind::Large, Vec2::new(0.0, 0.0));
        let zone = h.orb_clear_zone().unwrap();
        assert!(zone.contains_point(Vec2::new(8.0, 8.0)));
        assert!(zone.contains_point(Vec2::new(-1.0, 17.0)));
        assert!(!zone.contains_point(Vec2::new(-2.0, 8.0)));
        assert!(Hostile::new(2, HostileKind::Basic, Vec2::ZERO).orb_clear_zone().is_none());
    }

    #[test]
    fn test_cull_margin_covers_spawn_band() {
        let h = Hostile::new(1, HostileKind::BurstShooter, Vec2::new(-60.0, 10.0));
        assert!(!h.is_outside(128.0, 64.0, 20.0));
        let h = Hostile::new(2, HostileKind::Basic, Vec2::new(-60.0, 10.0));
        assert!(h.is_outside(128.0, 64.0, 20.0));
    }
}
