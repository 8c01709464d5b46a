//! Expanding area-damage explosions
//!
//! An explosion grows from radius 0 to its maximum over a fixed lifetime and
//! damages each target at most once, tracked by target id.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::within_radius;
use super::projectile::EntityId;
use crate::consts::EXPLOSION_LIFETIME;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    /// Damage dealt to each target caught in the blast
    pub damage: f32,
    pub age: u32,
    hit: BTreeSet<EntityId>,
}

impl Explosion {
    pub fn new(center: Vec2, max_radius: f32, damage: f32) -> Self {
        Self {
            center,
            radius: 0.0,
            max_radius,
            damage,
            age: 0,
            hit: BTreeSet::new(),
        }
    }

    pub fn advance(&mut self) {
        self.age = (self.age + 1).min(EXPLOSION_LIFETIME);
        self.radius = self.max_radius * self.age as f32 / EXPLOSION_LIFETIME as f32;
    }

    pub fn is_finished(&self) -> bool {
        self.age >= EXPLOSION_LIFETIME
    }

    /// Fade factor for renderers (1 = fresh, 0 = gone)
    pub fn alpha(&self) -> f32 {
        1.0 - self.age as f32 / EXPLOSION_LIFETIME as f32
    }

    /// Register a hit on `id` if it is inside the current radius and was not
    /// hit before. Returns true exactly once per target.
    pub fn try_hit(&mut self, id: EntityId, target_center: Vec2) -> bool {
        if self.hit.contains(&id) || !within_radius(target_center, self.center, self.radius) {
            return false;
        }
        self.hit.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_grows_to_max() {
        let mut e = Explosion::new(Vec2::ZERO, 200.0, 2.5);
        assert_eq!(e.radius, 0.0);
        e.advance();
        assert!((e.radius - 10.0).abs() < 1e-4);
        for _ in 0..30 {
            e.advance();
        }
        assert!(e.is_finished());
        assert!((e.radius - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_each_target_hit_once() {
        let mut e = Explosion::new(Vec2::ZERO, 100.0, 1.0);
        let target = Vec2::new(10.0, 0.0);
        let mut hits = 0;
        for _ in 0..EXPLOSION_LIFETIME {
            e.advance();
            if e.try_hit(3, target) {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_out_of_range_target_not_recorded() {
        let mut e = Explosion::new(Vec2::ZERO, 100.0, 1.0);
        e.advance();
        assert!(!e.try_hit(1, Vec2::new(50.0, 0.0)));
        // Once the blast reaches it, the target can still be hit
        for _ in 0..10 {
            e.advance();
        }
        assert!(e.try_hit(1, Vec2::new(50.0, 0.0)));
    }
}
