//! Regular enemy craft
//!
//! Four profiles, each bound to a movement pattern. Enemies normally enter
//! from the top and descend; above a difficulty threshold some enter from the
//! bottom edge instead (`mirrored`) and climb and fire upward.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::projectile::{EntityId, Faction, Projectile};
use crate::consts::*;

/// Per-tick displacement function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePattern {
    /// Sinusoidal lateral offset around the spawn column
    Zigzag,
    /// Fast descent with a lateral drift that flips every 30 ticks
    Dive,
    /// Cosine lateral offset with slowed descent
    Circle,
    /// Straight descent
    Slow,
}

/// Enemy profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyProfile {
    Interceptor,
    Diver,
    Weaver,
    Bomber,
}

/// Base stats of a profile at difficulty 1
#[derive(Debug, Clone, Copy)]
pub struct ProfileStats {
    pub size: Vec2,
    pub speed: f32,
    pub health: i32,
    pub score: u64,
    pub fire_chance: f32,
    pub pattern: MovePattern,
}

impl EnemyProfile {
    pub const ALL: [EnemyProfile; 4] = [
        EnemyProfile::Interceptor,
        EnemyProfile::Diver,
        EnemyProfile::Weaver,
        EnemyProfile::Bomber,
    ];

    pub fn stats(self) -> ProfileStats {
        match self {
            EnemyProfile::Interceptor => ProfileStats {
                size: Vec2::new(35.0, 45.0),
                speed: 1.5,
                health: 1,
                score: 100,
                fire_chance: 0.02,
                pattern: MovePattern::Zigzag,
            },
            EnemyProfile::Diver => ProfileStats {
                size: Vec2::new(40.0, 50.0),
                speed: 2.0,
                health: 2,
                score: 200,
                fire_chance: 0.03,
                pattern: MovePattern::Dive,
            },
            EnemyProfile::Weaver => ProfileStats {
                size: Vec2::new(38.0, 48.0),
                speed: 2.5,
                health: 2,
                score: 250,
                fire_chance: 0.025,
                pattern: MovePattern::Circle,
            },
            EnemyProfile::Bomber => ProfileStats {
                size: Vec2::new(50.0, 55.0),
                speed: 1.0,
                health: 3,
                score: 300,
                fire_chance: 0.015,
                pattern: MovePattern::Slow,
            },
        }
    }

    /// Uniform random profile
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

const SWAY_AMPLITUDE: f32 = 50.0;
const MAX_FIRE_CHANCE: f32 = 0.05;

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub profile: EnemyProfile,
    pub pattern: MovePattern,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Scalar speed (direction comes from `mirrored`)
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
    pub score: u64,
    pub fire_chance: f32,
    /// Entered from the bottom edge; moves and fires upward
    pub mirrored: bool,
    pub alive: bool,
    time: u32,
    origin_x: f32,
    /// Freshly fired shots, drained into the shared hostile pool each tick
    #[serde(skip)]
    pub shots: Vec<Projectile>,
}

impl Enemy {
    /// Create an enemy scaled to `difficulty`, entering at column `x`
    pub fn new(
        id: EntityId,
        profile: EnemyProfile,
        difficulty: u32,
        x: f32,
        mirrored: bool,
    ) -> Self {
        let base = profile.stats();
        let d = difficulty.max(1);
        let step = (d - 1) as f32;
        let health = base.health + ((d - 1) / 2) as i32;
        let y = if mirrored { FIELD_HEIGHT } else { -base.size.y };
        Self {
            id,
            profile,
            pattern: base.pattern,
            pos: Vec2::new(x, y),
            size: base.size,
            speed: base.speed * (1.0 + step * 0.1),
            health,
            max_health: health,
            score: base.score * d as u64,
            fire_chance: (base.fire_chance * (1.0 + step * 0.15)).min(MAX_FIRE_CHANCE),
            mirrored,
            alive: true,
            time: 0,
            origin_x: x,
            shots: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn health_fraction(&self) -> f32 {
        self.health.max(0) as f32 / self.max_health.max(1) as f32
    }

    /// Vertical travel direction: +1 down, -1 up
    fn heading(&self) -> f32 {
        if self.mirrored { -1.0 } else { 1.0 }
    }

    /// Move one tick and maybe fire
    pub fn advance<R: Rng>(&mut self, rng: &mut R) {
        if !self.alive {
            return;
        }
        self.time += 1;
        let t = self.time as f32;
        let dy = self.heading() * self.speed;

        match self.pattern {
            MovePattern::Zigzag => {
                self.pos.x = self.origin_x + (t * 0.05).sin() * SWAY_AMPLITUDE;
                self.pos.y += dy;
            }
            MovePattern::Dive => {
                self.pos.y += dy * 1.5;
                if self.time % 60 < 30 {
                    self.pos.x += self.speed * 0.5;
                } else {
                    self.pos.x -= self.speed * 0.5;
                }
            }
            MovePattern::Circle => {
                self.pos.x = self.origin_x + (t * 0.08).cos() * SWAY_AMPLITUDE;
                self.pos.y += dy * 0.8;
            }
            MovePattern::Slow => {
                self.pos.y += dy;
            }
        }

        self.pos.x = self.pos.x.clamp(0.0, FIELD_WIDTH - self.size.x);

        let roll: f32 = rng.random();
        if roll < self.fire_chance && self.in_firing_half() {
            self.fire();
        }
    }

    /// Top entrants fire only from the upper half, bottom entrants from the lower
    pub fn in_firing_half(&self) -> bool {
        let half = FIELD_HEIGHT / 2.0;
        if self.mirrored {
            self.pos.y > half && self.pos.y < FIELD_HEIGHT
        } else {
            self.pos.y > 0.0 && self.pos.y < half
        }
    }

    fn fire(&mut self) {
        let cx = self.pos.x + self.size.x / 2.0;
        let (origin, vel) = if self.mirrored {
            (Vec2::new(cx, self.pos.y), Vec2::new(0.0, -ENEMY_BULLET_SPEED))
        } else {
            (
                Vec2::new(cx, self.pos.y + self.size.y),
                Vec2::new(0.0, ENEMY_BULLET_SPEED),
            )
        };
        self.shots.push(Projectile::bolt(Faction::Enemy, origin, vel, 1.0));
    }

    /// Hand freshly fired shots to the caller
    pub fn take_shots(&mut self) -> Vec<Projectile> {
        std::mem::take(&mut self.shots)
    }

    /// Apply one point of damage. Returns true exactly once, on destruction.
    pub fn hit(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= 1;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
            return true;
        }
        false
    }

    /// Remove without a destruction report (rammed the player)
    pub fn destroy(&mut self) {
        self.health = 0;
        self.alive = false;
    }

    /// Left the field through the edge opposite its entry
    pub fn is_off_field(&self) -> bool {
        if self.mirrored {
            self.pos.y < -self.size.y
        } else {
            self.pos.y > FIELD_HEIGHT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_difficulty_scaling() {
        let e = Enemy::new(1, EnemyProfile::Diver, 5, 100.0, false);
        assert!((e.speed - 2.0 * 1.4).abs() < 1e-5);
        assert_eq!(e.health, 4);
        assert_eq!(e.score, 1000);
        assert!((e.fire_chance - 0.03 * 1.6).abs() < 1e-6);

        let e = Enemy::new(2, EnemyProfile::Diver, 10, 100.0, false);
        assert_eq!(e.fire_chance, MAX_FIRE_CHANCE);
    }

    #[test]
    fn test_hit_reports_destruction_once() {
        let mut e = Enemy::new(1, EnemyProfile::Diver, 1, 100.0, false);
        assert_eq!(e.health, 2);
        assert!(!e.hit());
        assert!(e.hit());
        assert!(!e.hit());
        assert!(!e.hit());
        assert_eq!(e.health, 0);
    }

    #[test]
    fn test_top_entrant_descends_and_mirrored_climbs() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut top = Enemy::new(1, EnemyProfile::Bomber, 1, 100.0, false);
        let mut bottom = Enemy::new(2, EnemyProfile::Bomber, 1, 100.0, true);
        let (y0, y1) = (top.pos.y, bottom.pos.y);
        top.advance(&mut rng);
        bottom.advance(&mut rng);
        assert!((top.pos.y - (y0 + 1.0)).abs() < 1e-5);
        assert!((bottom.pos.y - (y1 - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_firing_half_gate() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut e = Enemy::new(1, EnemyProfile::Bomber, 1, 100.0, false);
        e.fire_chance = 1.0;
        e.pos.y = FIELD_HEIGHT * 0.75;
        e.advance(&mut rng);
        assert!(e.shots.is_empty());

        e.pos.y = 100.0;
        e.advance(&mut rng);
        let shots = e.take_shots();
        assert_eq!(shots.len(), 1);
        assert!(shots[0].vel.y > 0.0);
        assert!(e.shots.is_empty());

        let mut m = Enemy::new(2, EnemyProfile::Bomber, 1, 100.0, true);
        m.fire_chance = 1.0;
        m.pos.y = FIELD_HEIGHT * 0.75;
        m.advance(&mut rng);
        let shots = m.take_shots();
        assert_eq!(shots.len(), 1);
        assert!(shots[0].vel.y < 0.0);
    }

    #[test]
    fn test_zigzag_stays_near_spawn_column() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyProfile::Interceptor, 1, 300.0, false);
        for _ in 0..200 {
            e.advance(&mut rng);
            assert!((e.pos.x - 300.0).abs() <= SWAY_AMPLITUDE + 1e-3);
        }
    }

    #[test]
    fn test_x_clamped_to_field() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyProfile::Weaver, 1, FIELD_WIDTH - 10.0, false);
        e.advance(&mut rng);
        assert!(e.pos.x <= FIELD_WIDTH - e.size.x);
    }

    #[test]
    fn test_off_field_edge_depends_on_entry() {
        let mut e = Enemy::new(1, EnemyProfile::Bomber, 1, 0.0, false);
        e.pos.y = FIELD_HEIGHT + 1.0;
        assert!(e.is_off_field());
        let mut m = Enemy::new(2, EnemyProfile::Bomber, 1, 0.0, true);
        assert!(!m.is_off_field());
        m.pos.y = -m.size.y - 1.0;
        assert!(m.is_off_field());
    }
}
