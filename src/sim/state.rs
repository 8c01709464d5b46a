//! Game state and core simulation types
//!
//! Everything one session owns lives here: the player, per-faction entity
//! collections, the scheduler and both RNG streams. Gameplay randomness comes
//! from `rng` only; cosmetic effects draw from `fx_rng` so particle caps and
//! quality presets can never change how a seeded run plays out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::difficulty::Difficulty;
use super::enemy::Enemy;
use super::explosion::Explosion;
use super::pickup::{Pickup, PowerUpKind};
use super::player::Player;
use super::projectile::{EntityId, Projectile};
use crate::error::SimResult;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Notable things that happened during a tick (drained by the session)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    EnemyDestroyed { id: EntityId, score: u64 },
    BossSpawned { tier: u32 },
    BossDefeated { tier: u32, score: u64 },
    LevelUp { level: u32 },
    AugmentUp { level: u8 },
    DifficultyUp { level: u32 },
    GameOver { score: u64, kills: u32 },
}

/// Particle look, for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Explosion debris
    Ember,
    /// Small impact flash
    Spark,
    /// Shield deflection
    Deflect,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Remaining ticks
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.vel *= 0.95;
        self.life = self.life.saturating_sub(1);
    }

    /// Fade factor (1 = fresh)
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Screen-wide lightning strike left by the special ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightningFlash {
    pub ticks: u32,
    /// Jagged polylines from the top of the field to each struck enemy
    pub bolts: Vec<Vec<Vec2>>,
}

/// Lightning flash duration in ticks
pub const LIGHTNING_FLASH_TICKS: u32 = 20;

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Gameplay RNG
    pub rng: Pcg32,
    /// Cosmetic RNG (particles, lightning bolts)
    pub fx_rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub score: u64,
    /// Regular enemies destroyed
    pub kills: u32,
    pub player: Player,
    /// Active enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub player_shots: Vec<Projectile>,
    /// Shots fired by regular enemies
    pub hostile_shots: Vec<Projectile>,
    /// Active pickups (sorted by id for determinism)
    pub pickups: Vec<Pickup>,
    pub explosions: Vec<Explosion>,
    pub difficulty: Difficulty,
    /// Ticks until the special ability is ready again
    pub special_cooldown: u32,
    pub lightning: Option<LightningFlash>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    /// Fraction of full-quality particle bursts to spawn
    pub particle_density: f32,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and validated tuning
    pub fn new(seed: u64, tuning: Tuning) -> SimResult<Self> {
        tuning.validate()?;
        let budget = Settings::default().particle_budget();
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15),
            phase: GamePhase::Playing,
            time_ticks: 0,
            score: 0,
            kills: 0,
            player: Player::new(&tuning),
            enemies: Vec::new(),
            boss: None,
            player_shots: Vec::new(),
            hostile_shots: Vec::new(),
            pickups: Vec::new(),
            explosions: Vec::new(),
            difficulty: Difficulty::new(&tuning),
            special_cooldown: 0,
            lightning: None,
            particles: Vec::new(),
            max_particles: budget.cap,
            particle_density: budget.density,
            events: Vec::new(),
            next_id: 1,
            tuning,
        })
    }

    /// Apply presentation settings (particle budget only)
    pub fn apply_settings(&mut self, settings: &Settings) {
        let budget = settings.particle_budget();
        self.max_particles = budget.cap;
        self.particle_density = budget.density;
        if self.particles.len() > self.max_particles {
            let excess = self.particles.len() - self.max_particles;
            self.particles.drain(..excess);
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn boss_active(&self) -> bool {
        self.boss.as_ref().is_some_and(|b| b.alive)
    }

    /// Admit an enemy unless the cap is reached (new arrivals are dropped)
    pub fn spawn_enemy(&mut self, enemy: Enemy) -> bool {
        if self.enemies.len() >= self.tuning.max_enemies {
            log::debug!("Enemy cap reached, dropping spawn");
            return false;
        }
        self.enemies.push(enemy);
        true
    }

    /// Drop a pickup at `center` unless the cap is reached
    pub fn spawn_pickup(&mut self, kind: PowerUpKind, center: Vec2) -> bool {
        if self.pickups.len() >= self.tuning.max_pickups {
            return false;
        }
        let id = self.next_entity_id();
        self.pickups.push(Pickup::new(id, kind, center));
        true
    }

    /// Roll a weighted pickup kind and drop it
    pub fn drop_random_pickup(&mut self, center: Vec2) -> bool {
        let kind = PowerUpKind::roll(&mut self.rng, &self.tuning.power_up_weights);
        self.spawn_pickup(kind, center)
    }

    pub fn push_player_shots(&mut self, shots: Vec<Projectile>) {
        self.player_shots.extend(shots);
        evict_oldest(&mut self.player_shots, self.tuning.max_player_shots);
    }

    pub fn push_hostile_shots(&mut self, shots: Vec<Projectile>) {
        self.hostile_shots.extend(shots);
        evict_oldest(&mut self.hostile_shots, self.tuning.max_hostile_shots);
    }

    pub fn push_explosion(&mut self, explosion: Explosion) {
        self.explosions.push(explosion);
        evict_oldest(&mut self.explosions, self.tuning.max_explosions);
    }

    /// Radial particle burst, scaled by the quality preset
    pub fn emit_particles(&mut self, center: Vec2, full_count: usize, kind: ParticleKind) {
        if self.max_particles == 0 {
            return;
        }
        let count = (full_count as f32 * self.particle_density).ceil() as usize;
        for _ in 0..count {
            let angle = self.fx_rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.fx_rng.random_range(1.0..4.0);
            let life = self.fx_rng.random_range(20..40);
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                kind,
                life,
                max_life: life,
                size: self.fx_rng.random_range(1.5..4.0),
            });
        }
        evict_oldest(&mut self.particles, self.max_particles);
    }

    /// Ensure id-carrying collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.pickups.sort_by_key(|p| p.id);
    }

    /// Compact every collection, removing dead and finished entities
    pub fn prune(&mut self) {
        self.enemies.retain(|e| e.alive);
        self.player_shots.retain(|s| s.alive);
        self.hostile_shots.retain(|s| s.alive);
        self.pickups.retain(|p| p.alive);
        self.explosions.retain(|e| !e.is_finished());
        self.particles.retain(|p| p.life > 0);
        if let Some(boss) = self.boss.as_mut() {
            boss.shots.retain(|s| s.alive);
        }
        if self.boss.as_ref().is_some_and(|b| !b.alive) {
            self.boss = None;
        }
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Keep the newest `cap` entries
fn evict_oldest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyProfile;
    use crate::sim::projectile::Faction;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(42, Tuning::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_tuning() {
        let tuning = Tuning {
            player_max_health: 0.0,
            ..Tuning::default()
        };
        assert!(GameState::new(1, tuning).is_err());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut s = state();
        let a = s.next_entity_id();
        let b = s.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_enemy_cap_drops_new_arrivals() {
        let mut s = state();
        s.tuning.max_enemies = 2;
        for x in 0..3 {
            let id = s.next_entity_id();
            s.spawn_enemy(Enemy::new(id, EnemyProfile::Bomber, 1, x as f32 * 60.0, false));
        }
        assert_eq!(s.enemies.len(), 2);
        assert_eq!(s.enemies[0].id, 1);
        assert_eq!(s.enemies[1].id, 2);
    }

    #[test]
    fn test_shot_cap_evicts_oldest() {
        let mut s = state();
        s.tuning.max_hostile_shots = 3;
        let shots: Vec<Projectile> = (0..5)
            .map(|i| Projectile::bolt(Faction::Enemy, Vec2::new(i as f32, 0.0), Vec2::Y, 1.0))
            .collect();
        s.push_hostile_shots(shots);
        assert_eq!(s.hostile_shots.len(), 3);
        assert_eq!(s.hostile_shots[0].pos.x, 2.0);
    }

    #[test]
    fn test_particles_respect_settings() {
        let mut s = state();
        s.apply_settings(&Settings {
            particles: false,
            ..Settings::default()
        });
        s.emit_particles(Vec2::ZERO, 20, ParticleKind::Ember);
        assert!(s.particles.is_empty());

        s.apply_settings(&Settings::from_preset(crate::settings::QualityPreset::Low));
        for _ in 0..20 {
            s.emit_particles(Vec2::ZERO, 20, ParticleKind::Ember);
        }
        assert_eq!(s.particles.len(), 100);
    }

    #[test]
    fn test_particles_do_not_touch_gameplay_rng() {
        let mut a = state();
        let mut b = state();
        b.emit_particles(Vec2::ZERO, 50, ParticleKind::Spark);
        let x: u32 = a.rng.random();
        let y: u32 = b.rng.random();
        assert_eq!(x, y);
    }

    #[test]
    fn test_prune_removes_dead_boss() {
        let mut s = state();
        let mut boss = Boss::new(9, 1, s.tuning.boss_weapon_weights);
        boss.alive = false;
        s.boss = Some(boss);
        s.prune();
        assert!(s.boss.is_none());
    }
}
