//! Hazard and projectile kinematics
//!
//! Swings, bullets, satellites, meteors and cutters. Anything spawned with a
//! delay exists from its spawn tick but neither decays nor collides until the
//! delay has elapsed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Hitbox, Rect};
use crate::consts::*;
use crate::unit_from_degrees;

pub const SWING_SIZE: f32 = 8.0;
pub const SWING_LIFETIME: u32 = 10;
/// Extra swings shift up this far and wait this long, per index
pub const SWING_STAGGER_Y: f32 = 2.0;
pub const SWING_STAGGER_TICKS: u32 = 2;

pub const BULLET_LIFETIME: u32 = 120;
pub const PLAYER_BULLET_SIZE: f32 = 8.0;
pub const PLAYER_BULLET_SPEED: f32 = 2.0;
pub const PLAYER_BULLET_STAGGER_TICKS: u32 = 3;
pub const HOSTILE_BULLET_SIZE: f32 = 4.0;

pub const SATELLITE_SIZE: f32 = 8.0;
pub const SATELLITE_ORBIT_RADIUS: f32 = 15.0;
/// Angular speed range, degrees per tick
pub const SATELLITE_MIN_SPEED: f32 = 3.0;
pub const SATELLITE_MAX_SPEED: f32 = 7.0;

pub const METEOR_SIZE: f32 = 16.0;
pub const METEOR_FLIGHT_TICKS: u32 = 60;
pub const METEOR_EXPLOSION_TICKS: u32 = 120;
pub const METEOR_STAGGER_TICKS: u32 = 10;

pub const CUTTER_SIZE: f32 = 8.0;
pub const CUTTER_SPEED: f32 = 2.0;
pub const CUTTER_LIFETIME: u32 = 150;
pub const CUTTER_STAGGER_TICKS: u32 = 5;
pub const CUTTER_MIN_REFLECTIONS: u32 = 3;
pub const CUTTER_MAX_REFLECTIONS: u32 = 5;

/// Spawn tick plus optional start delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    pub spawn_tick: u64,
    pub ticks: u32,
}

impl Delay {
    pub fn new(spawn_tick: u64, ticks: u32) -> Self {
        Self { spawn_tick, ticks }
    }

    /// Still waiting to become active
    #[inline]
    pub fn pending(&self, tick: u64) -> bool {
        tick < self.spawn_tick + self.ticks as u64
    }
}

/// Melee swing tethered to the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swing {
    pub id: u32,
    pub facing_right: bool,
    pub offset_y: f32,
    pub life: u32,
    pub delay: Delay,
    /// Top-left corner
    pub pos: Vec2,
}

impl Swing {
    pub fn new(id: u32, player_pos: Vec2, offset_y: f32, facing_right: bool, delay: Delay) -> Self {
        let mut swing = Self {
            id,
            facing_right,
            offset_y,
            life: SWING_LIFETIME,
            delay,
            pos: Vec2::ZERO,
        };
        swing.follow(player_pos);
        swing
    }

    fn follow(&mut self, player_pos: Vec2) {
        let dx = if self.facing_right {
            PLAYER_SIZE
        } else {
            -SWING_SIZE
        };
        self.pos = player_pos + Vec2::new(dx, self.offset_y);
    }

    pub fn update(&mut self, player_pos: Vec2, tick: u64) {
        self.follow(player_pos);
        if !self.delay.pending(tick) {
            self.life = self.life.saturating_sub(1);
        }
    }

    pub fn is_alive(&self, tick: u64) -> bool {
        self.life > 0 || self.delay.pending(tick)
    }

    pub fn is_active(&self, tick: u64) -> bool {
        !self.delay.pending(tick)
    }
}

impl Hitbox for Swing {
    fn hitbox(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(SWING_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Hostile,
}

/// Straight-line projectile aimed once at spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub owner: BulletOwner,
    /// Center point
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub life: u32,
    pub damage: i32,
    /// Leaves an orb when destroyed by a player hazard
    pub drops_exp: bool,
    pub delay: Delay,
}

/// Parameters for a new bullet
#[derive(Debug, Clone, Copy)]
pub struct BulletSpec {
    pub owner: BulletOwner,
    pub origin: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub size: f32,
    pub damage: i32,
    pub drops_exp: bool,
}

impl Bullet {
    pub fn new(id: u32, spec: BulletSpec, delay: Delay) -> Self {
        Self {
            id,
            owner: spec.owner,
            pos: spec.origin,
            vel: crate::homing_step(spec.origin, spec.target, spec.speed),
            size: spec.size,
            life: BULLET_LIFETIME,
            damage: spec.damage,
            drops_exp: spec.drops_exp,
            delay,
        }
    }

    pub fn update(&mut self, tick: u64) {
        if self.delay.pending(tick) {
            return;
        }
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);
    }

    fn off_screen(&self) -> bool {
        self.pos.x < -self.size
            || self.pos.x > SCREEN_WIDTH + self.size
            || self.pos.y < -self.size
            || self.pos.y > SCREEN_HEIGHT + self.size
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0 && !self.off_screen()
    }

    pub fn is_active(&self, tick: u64) -> bool {
        !self.delay.pending(tick)
    }
}

impl Hitbox for Bullet {
    fn hitbox(&self) -> Rect {
        Rect::centered(self.pos, self.size)
    }
}

/// Orbiting guard around the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Satellite {
    pub id: u32,
    /// Degrees
    pub angle: f32,
    /// Degrees per tick
    pub speed: f32,
    pub center: Vec2,
}

impl Satellite {
    pub fn new(id: u32, angle: f32, speed: f32, player_pos: Vec2) -> Self {
        let mut sat = Self {
            id,
            angle,
            speed,
            center: Vec2::ZERO,
        };
        sat.place(player_pos);
        sat
    }

    fn place(&mut self, player_pos: Vec2) {
        self.center = player_pos
            + unit_from_degrees(self.angle) * SATELLITE_ORBIT_RADIUS
            + Vec2::splat(PLAYER_SIZE / 2.0);
    }

    pub fn update(&mut self, player_pos: Vec2) {
        self.angle = (self.angle + self.speed) % 360.0;
        self.place(player_pos);
    }
}

impl Hitbox for Satellite {
    fn hitbox(&self) -> Rect {
        Rect::centered(self.center, SATELLITE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeteorPhase {
    Flying,
    Exploding,
    Done,
}

/// Two-phase strike: linear flight, then a fixed explosion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub id: u32,
    pub start: Vec2,
    pub target: Vec2,
    pub phase: MeteorPhase,
    pub timer: u32,
    /// Center while flying; impact point once exploding
    pub pos: Vec2,
    /// Visual size while flying
    pub size: f32,
    pub delay: Delay,
}

impl Meteor {
    pub fn new(id: u32, start: Vec2, target: Vec2, delay: Delay) -> Self {
        Self {
            id,
            start,
            target,
            phase: MeteorPhase::Flying,
            timer: 0,
            pos: start,
            size: 0.0,
            delay,
        }
    }

    /// Advance one tick. Returns true on the impact tick.
    pub fn update(&mut self, tick: u64) -> bool {
        if self.delay.pending(tick) {
            return false;
        }
        self.timer += 1;
        match self.phase {
            MeteorPhase::Flying => {
                let t = self.timer as f32 / METEOR_FLIGHT_TICKS as f32;
                if t >= 1.0 {
                    self.phase = MeteorPhase::Exploding;
                    self.timer = 0;
                    self.pos = self.target;
                    return true;
                }
                self.pos = self.start.lerp(self.target, t);
                self.size = (METEOR_SIZE * t).floor().max(1.0);
            }
            MeteorPhase::Exploding => {
                if self.timer >= METEOR_EXPLOSION_TICKS {
                    self.phase = MeteorPhase::Done;
                }
            }
            MeteorPhase::Done => {}
        }
        false
    }

    pub fn is_alive(&self, tick: u64) -> bool {
        self.phase != MeteorPhase::Done || self.delay.pending(tick)
    }

    /// Damage area, only while exploding
    pub fn explosion(&self) -> Option<Rect> {
        (self.phase == MeteorPhase::Exploding).then(|| Rect::centered(self.target, METEOR_SIZE))
    }
}

/// Ricochet blade bouncing inside the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cutter {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// Bounce counter; reaching zero does not end the cutter
    pub reflections_left: u32,
    pub life: u32,
    pub delay: Delay,
}

impl Cutter {
    pub fn new(id: u32, pos: Vec2, angle: f32, reflections: u32, delay: Delay) -> Self {
        Self {
            id,
            pos,
            vel: unit_from_degrees(angle) * CUTTER_SPEED,
            reflections_left: reflections,
            life: CUTTER_LIFETIME,
            delay,
        }
    }

    /// Advance one tick. Returns true if it bounced.
    pub fn update(&mut self, tick: u64) -> bool {
        if self.delay.pending(tick) {
            return false;
        }
        self.pos += self.vel;
        self.life = self.life.saturating_sub(1);

        let mut reflected = false;
        if self.pos.x < 0.0 || self.pos.x + CUTTER_SIZE > SCREEN_WIDTH {
            self.vel.x = -self.vel.x;
            self.pos.x = self.pos.x.clamp(0.0, SCREEN_WIDTH - CUTTER_SIZE);
            reflected = true;
        }
        if self.pos.y < 0.0 || self.pos.y + CUTTER_SIZE > SCREEN_HEIGHT {
            self.vel.y = -self.vel.y;
            self.pos.y = self.pos.y.clamp(0.0, SCREEN_HEIGHT - CUTTER_SIZE);
            reflected = true;
        }
        if reflected && self.reflections_left > 0 {
            self.reflections_left -= 1;
        }
        reflected
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    pub fn is_active(&self, tick: u64) -> bool {
        !self.delay.pending(tick)
    }
}

impl Hitbox for Cutter {
    fn hitbox(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(CUTTER_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_swing_tracks_player_during_delay() {
        let mut s = Swing::new(1, Vec2::new(50.0, 20.0), -2.0, true, Delay::new(0, 2));
        s.update(Vec2::new(52.0, 20.0), 0);
        assert_eq!(s.life, SWING_LIFETIME);
        assert!(!s.is_active(0));
        assert_eq!(s.pos, Vec2::new(60.0, 18.0));
        s.update(Vec2::new(52.0, 20.0), 2);
        assert_eq!(s.life, SWING_LIFETIME - 1);
        assert!(s.is_active(2));
    }

    #[test]
    fn test_swing_backward_offset() {
        let s = Swing::new(1, Vec2::new(50.0, 20.0), 0.0, false, Delay::new(0, 0));
        assert_eq!(s.pos, Vec2::new(42.0, 20.0));
    }

    #[test]
    fn test_bullet_keeps_initial_heading() {
        let spec = BulletSpec {
            owner: BulletOwner::Player,
            origin: Vec2::new(10.0, 10.0),
            target: Vec2::new(20.0, 10.0),
            speed: PLAYER_BULLET_SPEED,
            size: PLAYER_BULLET_SIZE,
            damage: 1,
            drops_exp: true,
        };
        let mut b = Bullet::new(1, spec, Delay::new(5, 3));
        b.update(6);
        assert_eq!(b.pos, Vec2::new(10.0, 10.0));
        b.update(8);
        b.update(9);
        assert_eq!(b.pos, Vec2::new(14.0, 10.0));
        assert_eq!(b.life, BULLET_LIFETIME - 2);
    }

    #[test]
    fn test_bullet_expires_off_screen() {
        let spec = BulletSpec {
            owner: BulletOwner::Hostile,
            origin: Vec2::new(-3.5, 10.0),
            target: Vec2::new(-100.0, 10.0),
            speed: 1.0,
            size: HOSTILE_BULLET_SIZE,
            damage: 1,
            drops_exp: false,
        };
        let mut b = Bullet::new(1, spec, Delay::new(0, 0));
        assert!(b.is_alive());
        b.update(0);
        assert!(!b.is_alive());
    }

    #[test]
    fn test_satellite_orbit() {
        let mut sat = Satellite::new(1, 0.0, 90.0, Vec2::new(50.0, 20.0));
        assert!((sat.center - Vec2::new(69.0, 24.0)).length() < 1e-4);
        sat.update(Vec2::new(50.0, 20.0));
        assert!((sat.center - Vec2::new(54.0, 39.0)).length() < 1e-4);
        sat.angle = 350.0;
        sat.update(Vec2::ZERO);
        assert!((sat.angle - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_meteor_lifecycle() {
        let mut m = Meteor::new(1, Vec2::new(140.0, -10.0), Vec2::new(60.0, 30.0), Delay::new(0, 0));
        let mut impact_tick = None;
        for tick in 0..200u64 {
            if m.update(tick) {
                impact_tick = Some(tick);
            }
            if m.phase == MeteorPhase::Flying {
                assert!(m.explosion().is_none());
                assert!(m.size >= 1.0 && m.size <= METEOR_SIZE);
            }
        }
        assert_eq!(impact_tick, Some(METEOR_FLIGHT_TICKS as u64 - 1));
        assert_eq!(m.phase, MeteorPhase::Done);
        assert!(!m.is_alive(200));
    }

    #[test]
    fn test_meteor_explosion_rect() {
        let mut m = Meteor::new(1, Vec2::ZERO, Vec2::new(60.0, 30.0), Delay::new(0, 0));
        for tick in 0..METEOR_FLIGHT_TICKS as u64 {
            m.update(tick);
        }
        let rect = m.explosion().unwrap();
        assert_eq!(rect, Rect::new(52.0, 22.0, 16.0, 16.0));
    }

    #[test]
    fn test_cutter_budget_is_cosmetic() {
        let mut c = Cutter::new(1, Vec2::new(1.0, 30.0), 180.0, 1, Delay::new(0, 0));
        assert!(c.update(0));
        assert!(c.vel.x > 0.0);
        assert_eq!(c.pos.x, 0.0);
        assert_eq!(c.reflections_left, 0);
        assert!(c.is_alive());

        let mut tick = 1;
        while c.is_alive() {
            c.update(tick);
            tick += 1;
        }
        assert_eq!(tick, CUTTER_LIFETIME as u64);
        assert_eq!(c.reflections_left, 0);
    }

    proptest! {
        #[test]
        fn cutter_reflection_preserves_speed(
            x in 0.0f32..(SCREEN_WIDTH - CUTTER_SIZE),
            y in 0.0f32..(SCREEN_HEIGHT - CUTTER_SIZE),
            angle in 0.0f32..360.0,
            ticks in 1u64..150,
        ) {
            let mut c = Cutter::new(1, Vec2::new(x, y), angle, 4, Delay::new(0, 0));
            let speed = c.vel.length();
            for tick in 0..ticks {
                let vel = c.vel;
                if c.update(tick) {
                    prop_assert!(c.vel.x == vel.x || c.vel.x == -vel.x);
                    prop_assert!(c.vel.y == vel.y || c.vel.y == -vel.y);
                }
                prop_assert!((c.vel.length() - speed).abs() < 1e-4);
                prop_assert!(c.pos.x >= 0.0 && c.pos.x <= SCREEN_WIDTH - CUTTER_SIZE);
                prop_assert!(c.pos.y >= 0.0 && c.pos.y <= SCREEN_HEIGHT - CUTTER_SIZE);
            }
        }
    }
}
