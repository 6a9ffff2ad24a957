//! Collision primitives for axis-aligned boxes
//!
//! Every collidable entity exposes one `Rect` through the `Hitbox` trait; the
//! resolver in `combat` only ever talks to that capability.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self {
            pos: center - Vec2::splat(size / 2.0),
            size: Vec2::splat(size),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap test: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }

    /// Strict point containment (boundary excluded)
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.pos.x && p.x < self.right() && p.y > self.pos.y && p.y < self.bottom()
    }
}

/// Anything that takes part in collision resolution
pub trait Hitbox {
    fn hitbox(&self) -> Rect;

    fn overlaps<H: Hitbox + ?Sized>(&self, other: &H) -> bool {
        self.hitbox().overlaps(&other.hitbox())
    }
}

impl Hitbox for Rect {
    fn hitbox(&self) -> Rect {
        *self
    }
}
