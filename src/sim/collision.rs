//! Overlap tests for the flat playfield
//!
//! Actors are axis-aligned rectangles (top-left + size). Projectiles carry
//! either a rectangular hitbox (AABB test) or a circular one (center distance
//! against the target's half short side).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Hitbox, Projectile};
use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

/// Axis-aligned rectangle in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}

/// Whether `shot` touches the actor occupying `target`
pub fn projectile_hits(shot: &Projectile, target: &Rect) -> bool {
    match shot.hitbox {
        Hitbox::Rect { w, h } => Rect::from_center(shot.pos, Vec2::new(w, h)).overlaps(target),
        Hitbox::Circle { r } => circle_hits_rect(shot.pos, r, target),
    }
}

/// Center distance against radius plus half the rectangle's short side
pub fn circle_hits_rect(center: Vec2, radius: f32, target: &Rect) -> bool {
    let reach = radius + target.size.min_element() / 2.0;
    center.distance(target.center()) < reach
}

/// Point strictly inside a circle
#[inline]
pub fn within_radius(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) < radius
}

/// Clamp a top-left position so a rectangle of `size` stays inside the field
pub fn clamp_to_field(pos: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, (FIELD_WIDTH - size.x).max(0.0)),
        pos.y.clamp(0.0, (FIELD_HEIGHT - size.y).max(0.0)),
    )
}
