//! Projectiles: one type for every bullet in the game
//!
//! Player bolts, boss lasers, bombs, missiles and the boss's radial fragments
//! all share this struct. Behavior differences are expressed through the
//! closed [`ProjectileKind`] tag plus a few optional properties, so the combat
//! pass and renderers only need one dispatch path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Stable identity for actors that projectiles and explosions can refer to
pub type EntityId = u32;

/// Who fired a projectile (collision rules differ by faction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
    Boss,
}

impl Faction {
    /// Default direction of travel when a projectile has no explicit velocity
    pub fn forward(self) -> Vec2 {
        match self {
            Faction::Player => Vec2::NEG_Y,
            Faction::Enemy | Faction::Boss => Vec2::Y,
        }
    }

    pub fn is_hostile(self) -> bool {
        self != Faction::Player
    }
}

/// Collision shape, centered on the projectile position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hitbox {
    Rect { w: f32, h: f32 },
    Circle { r: f32 },
}

/// Closed set of projectile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Plain bullet (default and spread weapons, regular enemy fire)
    Bolt,
    /// Charge-shot volley
    Charged,
    Laser,
    Bomb,
    Missile,
    /// Short-lived radial shard from the boss burst
    Fragment,
}

/// Homing behavior: blend strength plus the weakly held current target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub strength: f32,
    /// Re-resolved every tick; `None` means straight flight
    pub target: Option<EntityId>,
}

/// Area damage released on impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub radius: f32,
    /// Damage of the resulting explosion
    pub damage: f32,
}

/// Boolean view of a projectile's special properties (for renderers)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileFlags {
    pub penetrating: bool,
    pub homing: bool,
    pub laser: bool,
    pub bomb: bool,
    pub fragment: bool,
}

/// A potential homing target, snapshotted before projectiles advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingTarget {
    pub id: EntityId,
    pub center: Vec2,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Center position
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    /// Fallback speed along the faction's forward axis when `vel` is zero
    pub speed: f32,
    pub damage: f32,
    pub hitbox: Hitbox,
    pub faction: Faction,
    pub kind: ProjectileKind,
    pub penetrating: bool,
    pub homing: Option<Homing>,
    pub splash: Option<Splash>,
    /// Remaining lifetime in ticks (`None` = until off-field or hit)
    pub ttl: Option<u32>,
    pub alive: bool,
}

impl Projectile {
    pub fn new(
        faction: Faction,
        kind: ProjectileKind,
        pos: Vec2,
        vel: Vec2,
        damage: f32,
        hitbox: Hitbox,
    ) -> Self {
        Self {
            pos,
            vel,
            speed: vel.length(),
            damage,
            hitbox,
            faction,
            kind,
            penetrating: false,
            homing: None,
            splash: None,
            ttl: None,
            alive: true,
        }
    }

    /// Standard 4x12 bullet
    pub fn bolt(faction: Faction, pos: Vec2, vel: Vec2, damage: f32) -> Self {
        Self::new(
            faction,
            ProjectileKind::Bolt,
            pos,
            vel,
            damage,
            Hitbox::Rect {
                w: BULLET_WIDTH,
                h: BULLET_HEIGHT,
            },
        )
    }

    pub fn penetrating(mut self) -> Self {
        self.penetrating = true;
        self
    }

    pub fn with_homing(mut self, strength: f32) -> Self {
        self.homing = Some(Homing {
            strength,
            target: None,
        });
        self
    }

    pub fn with_splash(mut self, radius: f32, damage: f32) -> Self {
        self.splash = Some(Splash { radius, damage });
        self
    }

    pub fn with_ttl(mut self, ticks: u32) -> Self {
        self.ttl = Some(ticks);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn flags(&self) -> ProjectileFlags {
        ProjectileFlags {
            penetrating: self.penetrating,
            homing: self.homing.is_some(),
            laser: self.kind == ProjectileKind::Laser,
            bomb: self.splash.is_some(),
            fragment: self.kind == ProjectileKind::Fragment,
        }
    }

    /// Unit direction of travel
    pub fn heading(&self) -> Vec2 {
        self.vel.try_normalize().unwrap_or(self.faction.forward())
    }

    /// Bounding box of the hitbox
    pub fn bounds(&self) -> Rect {
        match self.hitbox {
            Hitbox::Rect { w, h } => Rect::from_center(self.pos, Vec2::new(w, h)),
            Hitbox::Circle { r } => Rect::from_center(self.pos, Vec2::splat(r * 2.0)),
        }
    }

    /// Whether a target at `center` sits inside the forward chase window
    fn in_forward_window(&self, center: Vec2) -> bool {
        match self.faction {
            Faction::Player => center.y - self.pos.y < HOMING_FORWARD_WINDOW,
            Faction::Enemy | Faction::Boss => self.pos.y - center.y < HOMING_FORWARD_WINDOW,
        }
    }

    /// Advance one tick: steer (if homing), move, age, bounds check
    pub fn advance(&mut self, candidates: &[HomingTarget]) {
        if !self.alive {
            return;
        }

        if self.homing.is_some() {
            self.steer(candidates);
        }

        if self.vel == Vec2::ZERO {
            self.pos += self.faction.forward() * self.speed;
        } else {
            self.pos += self.vel;
        }

        if let Some(ttl) = self.ttl.as_mut() {
            *ttl = ttl.saturating_sub(1);
            if *ttl == 0 {
                self.alive = false;
            }
        }

        if self.is_off_field() {
            self.alive = false;
        }
    }

    fn steer(&mut self, candidates: &[HomingTarget]) {
        let nearest = candidates
            .iter()
            .filter(|c| self.in_forward_window(c.center))
            .min_by(|a, b| {
                a.center
                    .distance_squared(self.pos)
                    .partial_cmp(&b.center.distance_squared(self.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .copied();

        let Some(homing) = self.homing.as_mut() else {
            return;
        };
        homing.target = nearest.map(|c| c.id);

        let Some(target) = nearest else {
            return;
        };
        let to_target = target.center - self.pos;
        let dist = to_target.length();
        let speed = self.vel.length();
        if dist <= f32::EPSILON || speed <= f32::EPSILON {
            return;
        }

        // Blend, don't snap: caps the turn rate per tick
        let s = homing.strength;
        let blended = self.vel / speed * (1.0 - s) + to_target / dist * s;
        let len = blended.length();
        if len > f32::EPSILON {
            self.vel = blended / len * speed;
        }
    }

    pub fn is_off_field(&self) -> bool {
        self.pos.x < -OFFSCREEN_PADDING
            || self.pos.x > FIELD_WIDTH + OFFSCREEN_PADDING
            || self.pos.y < -OFFSCREEN_PADDING
            || self.pos.y > FIELD_HEIGHT + OFFSCREEN_PADDING
    }
}
