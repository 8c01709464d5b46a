//! Boss encounter
//!
//! Two orthogonal state machines drive a boss:
//! - movement phase: `Entering -> Hovering <-> Strafing`
//! - charge attack (below half health): `Idle -> Charging -> Dashing ->
//!   (Waiting -> Dashing)* -> Returning -> Idle`
//!
//! While the charge attack is active the phase machine and the regular
//! attack timer are frozen. Damage never interrupts either machine.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::projectile::{EntityId, Faction, Hitbox, HomingTarget, Projectile, ProjectileKind};
use crate::consts::*;
use crate::{direction_to, step_toward, weighted_index};

/// Identity the player carries in boss homing target lists
pub const PLAYER_TARGET_ID: EntityId = 0;

const MIN_TIER: u32 = 3;
const HOVER_ALTITUDE: f32 = 80.0;
const ENTRY_SPEED: f32 = 0.5;
const HOVER_TICKS: u32 = 300;
const STRAFE_TICKS: u32 = 200;
const STRAFE_SPEED: f32 = 3.0;
const ATTACK_INTERVAL: u32 = 45;
const HIT_FLASH_TICKS: u32 = 10;

const CHARGE_HEALTH_FRACTION: f32 = 0.5;
const CHARGE_COOLDOWN: u32 = 300;
const CHARGE_TELEGRAPH: u32 = 60;
const CHARGE_JITTER: f32 = 6.0;
const DASH_START_SPEED: f32 = 2.0;
const DASH_ACCEL: f32 = 0.5;
const DASH_MAX_SPEED: f32 = 12.0;
const DASH_ARRIVAL: f32 = 10.0;
const DASH_WAIT: u32 = 30;
const RETURN_SPEED: f32 = 4.0;
const RETURN_TOLERANCE: f32 = 5.0;

const BURST_FRAGMENTS: usize = 16;
const FRAGMENT_SPEED: f32 = 3.5;
const FRAGMENT_TTL: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Descending to hover altitude
    Entering,
    /// Sinusoidal lateral patrol
    Hovering,
    /// Fast sweep, reversing at the walls
    Strafing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChargeState {
    Idle,
    /// Jitter telegraph before the first dash
    Charging { ticks: u32 },
    Dashing { speed: f32 },
    /// Pause between dashes
    Waiting { ticks: u32 },
    /// Heading back to the pre-charge position
    Returning,
}

/// Boss weapon archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossWeapon {
    Spread,
    LaserVolley,
    SplashBomb,
    HomingMissile,
}

impl BossWeapon {
    /// Order matches the `boss_weapon_weights` tuning table
    pub const ALL: [BossWeapon; 4] = [
        BossWeapon::Spread,
        BossWeapon::LaserVolley,
        BossWeapon::SplashBomb,
        BossWeapon::HomingMissile,
    ];
}

/// What the boss needs to know about the player each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossTarget {
    pub center: Vec2,
    pub max_health: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeAttack {
    pub state: ChargeState,
    cooldown: u32,
    /// Position to return to (top-left)
    home: Vec2,
    /// Snapshotted player center
    target: Vec2,
    /// Sampled at trigger time, 2..=4
    pub total_dashes: u32,
    pub completed_dashes: u32,
    /// Contact damage while dashing
    pub damage: f32,
}

impl Default for ChargeAttack {
    fn default() -> Self {
        Self {
            state: ChargeState::Idle,
            cooldown: 0,
            home: Vec2::ZERO,
            target: Vec2::ZERO,
            total_dashes: 0,
            completed_dashes: 0,
            damage: 0.0,
        }
    }
}

impl ChargeAttack {
    pub fn is_active(&self) -> bool {
        self.state != ChargeState::Idle
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.state, ChargeState::Dashing { .. })
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub score: u64,
    /// Difficulty the boss was scaled for (never below 3)
    pub tier: u32,
    pub phase: BossPhase,
    phase_ticks: u32,
    time: u32,
    strafe_dir: f32,
    attack_timer: u32,
    pub charge: ChargeAttack,
    pub hit_flash: u32,
    pub alive: bool,
    weapon_weights: [u32; 4],
    /// Boss-owned projectiles; discarded with the boss
    pub shots: Vec<Projectile>,
}

impl Boss {
    pub fn new(id: EntityId, difficulty: u32, weapon_weights: [u32; 4]) -> Self {
        let tier = difficulty.max(MIN_TIER);
        let health = i32::try_from(tier)
            .unwrap_or(i32::MAX)
            .saturating_mul(80)
            .saturating_add(150);
        Self {
            id,
            pos: Vec2::new(FIELD_WIDTH / 2.0 - BOSS_WIDTH / 2.0, -BOSS_HEIGHT),
            size: Vec2::new(BOSS_WIDTH, BOSS_HEIGHT),
            health,
            max_health: health,
            score: 5000 * tier as u64,
            tier,
            phase: BossPhase::Entering,
            phase_ticks: 0,
            time: 0,
            strafe_dir: 1.0,
            attack_timer: 0,
            charge: ChargeAttack::default(),
            hit_flash: 0,
            alive: true,
            weapon_weights,
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
        self.health as f32 / self.max_health.max(1) as f32
    }

    /// Difficulty multiplier applied to every attack
    fn bonus(&self) -> f32 {
        self.tier as f32 * 0.15
    }

    fn min_x(&self) -> f32 {
        BOSS_EDGE_MARGIN
    }

    fn max_x(&self) -> f32 {
        FIELD_WIDTH - self.size.x - BOSS_EDGE_MARGIN
    }

    /// One simulation tick of movement and attacks
    pub fn advance<R: Rng>(&mut self, player: Option<BossTarget>, rng: &mut R) {
        if !self.alive {
            return;
        }
        self.time += 1;
        self.attack_timer += 1;
        self.hit_flash = self.hit_flash.saturating_sub(1);

        if !self.charge.is_active() && self.health_fraction() < CHARGE_HEALTH_FRACTION {
            self.charge.cooldown += 1;
            if self.charge.cooldown >= CHARGE_COOLDOWN
                && let Some(target) = player
            {
                self.begin_charge(target, rng);
            }
        }

        if self.charge.is_active() {
            self.advance_charge(player, rng);
        } else {
            self.advance_phase();
        }

        if !self.charge.is_active()
            && self.attack_timer >= ATTACK_INTERVAL
            && let Some(target) = player
        {
            self.attack_timer = 0;
            let slot = weighted_index(rng, &self.weapon_weights);
            self.attack(BossWeapon::ALL[slot], target.center, rng);
        }
    }

    /// Advance boss-owned shots (the player is the only homing candidate)
    pub fn advance_shots(&mut self, player: Option<Vec2>) {
        let candidates: Vec<HomingTarget> = player
            .map(|center| HomingTarget {
                id: PLAYER_TARGET_ID,
                center,
            })
            .into_iter()
            .collect();
        for shot in &mut self.shots {
            shot.advance(&candidates);
        }
        self.shots.retain(|s| s.alive);
    }

    fn advance_phase(&mut self) {
        self.phase_ticks += 1;
        match self.phase {
            BossPhase::Entering => {
                self.pos.y += ENTRY_SPEED;
                if self.pos.y >= HOVER_ALTITUDE {
                    self.set_phase(BossPhase::Hovering);
                }
            }
            BossPhase::Hovering => {
                self.pos.x += (self.time as f32 * 0.02).sin() * 2.0;
                self.pos.x = self.pos.x.clamp(self.min_x(), self.max_x());
                if self.phase_ticks > HOVER_TICKS {
                    self.set_phase(BossPhase::Strafing);
                    self.radial_burst();
                }
            }
            BossPhase::Strafing => {
                self.pos.x += self.strafe_dir * STRAFE_SPEED;
                if self.pos.x <= self.min_x() || self.pos.x >= self.max_x() {
                    self.pos.x = self.pos.x.clamp(self.min_x(), self.max_x());
                    self.strafe_dir = -self.strafe_dir;
                }
                if self.phase_ticks > STRAFE_TICKS {
                    self.set_phase(BossPhase::Hovering);
                }
            }
        }
    }

    fn set_phase(&mut self, phase: BossPhase) {
        self.phase = phase;
        self.phase_ticks = 0;
    }

    fn begin_charge<R: Rng>(&mut self, target: BossTarget, rng: &mut R) {
        self.charge = ChargeAttack {
            state: ChargeState::Charging { ticks: 0 },
            cooldown: 0,
            home: self.pos,
            target: target.center,
            total_dashes: rng.random_range(2..=4),
            completed_dashes: 0,
            damage: (target.max_health / 3.0).floor(),
        };
        log::debug!("Boss charge attack: {} dashes", self.charge.total_dashes);
    }

    fn advance_charge<R: Rng>(&mut self, player: Option<BossTarget>, rng: &mut R) {
        match self.charge.state {
            ChargeState::Idle => {}
            ChargeState::Charging { ticks } => {
                let ticks = ticks + 1;
                if ticks >= CHARGE_TELEGRAPH {
                    self.pos = self.charge.home;
                    self.charge.state = ChargeState::Dashing {
                        speed: DASH_START_SPEED,
                    };
                } else {
                    let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
                    self.pos = self.charge.home + jitter * CHARGE_JITTER;
                    self.charge.state = ChargeState::Charging { ticks };
                }
            }
            ChargeState::Dashing { speed } => {
                let center = step_toward(self.center(), self.charge.target, speed);
                self.pos = center - self.size * 0.5;
                if center.distance(self.charge.target) < DASH_ARRIVAL {
                    self.charge.completed_dashes += 1;
                    self.charge.state = if self.charge.completed_dashes < self.charge.total_dashes {
                        ChargeState::Waiting { ticks: 0 }
                    } else {
                        ChargeState::Returning
                    };
                } else {
                    self.charge.state = ChargeState::Dashing {
                        speed: (speed + DASH_ACCEL).min(DASH_MAX_SPEED),
                    };
                }
            }
            ChargeState::Waiting { ticks } => {
                let ticks = ticks + 1;
                if ticks >= DASH_WAIT {
                    // Re-aim; without a player keep the previous target
                    if let Some(target) = player {
                        self.charge.target = target.center;
                    }
                    self.charge.state = ChargeState::Dashing {
                        speed: DASH_START_SPEED,
                    };
                } else {
                    self.charge.state = ChargeState::Waiting { ticks };
                }
            }
            ChargeState::Returning => {
                self.pos = step_toward(self.pos, self.charge.home, RETURN_SPEED);
                if self.pos.distance(self.charge.home) <= RETURN_TOLERANCE {
                    self.pos = self.charge.home;
                    self.charge.state = ChargeState::Idle;
                    self.charge.cooldown = 0;
                    self.set_phase(BossPhase::Hovering);
                }
            }
        }
    }

    /// Fire one attack pattern at the player
    pub fn attack<R: Rng>(&mut self, weapon: BossWeapon, player: Vec2, rng: &mut R) {
        let bonus = self.bonus();
        let tier = self.tier as usize;
        let center = self.center();
        let muzzle = Vec2::new(center.x, self.pos.y + self.size.y);

        match weapon {
            BossWeapon::Spread => {
                let count = (3 + tier / 2).min(7);
                let speed = 6.0 + bonus;
                let fan = PI / 2.0;
                for i in 0..count {
                    let angle = PI / 2.0 - fan / 2.0 + fan / (count - 1) as f32 * i as f32;
                    self.shots.push(Projectile::new(
                        Faction::Boss,
                        ProjectileKind::Bolt,
                        muzzle,
                        Vec2::new(angle.cos(), angle.sin()) * speed,
                        1.0 + bonus,
                        Hitbox::Circle { r: 6.0 },
                    ));
                }
            }
            BossWeapon::LaserVolley => {
                let count = 1 + tier / 3;
                let speed = 10.0 + bonus;
                for _ in 0..count {
                    let aim = player + Vec2::new((rng.random::<f32>() - 0.5) * 100.0, 0.0);
                    self.shots.push(
                        Projectile::new(
                            Faction::Boss,
                            ProjectileKind::Laser,
                            center,
                            direction_to(center, aim) * speed,
                            2.0 + bonus,
                            Hitbox::Circle { r: 8.0 },
                        )
                        .with_speed(speed)
                        .penetrating(),
                    );
                }
            }
            BossWeapon::SplashBomb => {
                let count = 1 + tier / 4;
                let speed = 5.0 + bonus * 0.5;
                for i in 0..count {
                    let dx = (i as f32 - count as f32 / 2.0) * 30.0;
                    self.shots.push(
                        Projectile::new(
                            Faction::Boss,
                            ProjectileKind::Bomb,
                            muzzle + Vec2::new(dx, 0.0),
                            Vec2::new(0.0, speed),
                            1.0 + bonus * 0.5,
                            Hitbox::Circle { r: 10.0 },
                        )
                        .with_splash(120.0 + 5.0 * self.tier as f32, 2.0 + bonus),
                    );
                }
            }
            BossWeapon::HomingMissile => {
                let count = 1 + tier / 3;
                let speed = 7.0 + bonus;
                for i in 0..count {
                    let origin = muzzle + Vec2::new((i as f32 - count as f32 / 2.0) * 40.0, 0.0);
                    self.shots.push(
                        Projectile::new(
                            Faction::Boss,
                            ProjectileKind::Missile,
                            origin,
                            direction_to(origin, player) * speed,
                            1.5 + bonus,
                            Hitbox::Circle { r: 9.0 },
                        )
                        .with_speed(speed)
                        .with_homing(0.08 + 0.005 * self.tier as f32),
                    );
                }
            }
        }
    }

    /// Ring of short-lived fragments released when a strafing run begins
    fn radial_burst(&mut self) {
        let center = self.center();
        for i in 0..BURST_FRAGMENTS {
            let angle = TAU * i as f32 / BURST_FRAGMENTS as f32;
            self.shots.push(
                Projectile::new(
                    Faction::Boss,
                    ProjectileKind::Fragment,
                    center,
                    Vec2::new(angle.cos(), angle.sin()) * FRAGMENT_SPEED,
                    1.0,
                    Hitbox::Circle { r: 5.0 },
                )
                .with_ttl(FRAGMENT_TTL),
            );
        }
    }

    /// One point of damage. Returns true exactly once, on destruction.
    pub fn hit(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.hit_flash = HIT_FLASH_TICKS;
        self.health -= 1;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WEIGHTS: [u32; 4] = [30, 20, 25, 25];

    fn target() -> BossTarget {
        BossTarget {
            center: Vec2::new(400.0, 555.0),
            max_health: 100.0,
        }
    }

    /// Boss already at hover altitude and below half health
    fn wounded_boss() -> Boss {
        let mut boss = Boss::new(1, 3, WEIGHTS);
        boss.pos.y = HOVER_ALTITUDE;
        boss.phase = BossPhase::Hovering;
        boss.health = boss.max_health / 3;
        boss
    }

    #[test]
    fn test_tier_floor_and_stats() {
        let boss = Boss::new(1, 1, WEIGHTS);
        assert_eq!(boss.tier, 3);
        assert_eq!(boss.max_health, 390);
        assert_eq!(boss.score, 15_000);
        let boss = Boss::new(1, 7, WEIGHTS);
        assert_eq!(boss.max_health, 710);
    }

    #[test]
    fn test_enters_then_hovers() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(1, 3, WEIGHTS);
        for _ in 0..459 {
            boss.advance(None, &mut rng);
        }
        assert_eq!(boss.phase, BossPhase::Entering);
        boss.advance(None, &mut rng);
        assert_eq!(boss.phase, BossPhase::Hovering);
    }

    #[test]
    fn test_strafe_starts_with_radial_burst_and_loops_back() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(1, 3, WEIGHTS);
        boss.pos.y = HOVER_ALTITUDE;
        boss.phase = BossPhase::Hovering;
        for _ in 0..=HOVER_TICKS {
            boss.advance(None, &mut rng);
        }
        assert_eq!(boss.phase, BossPhase::Strafing);
        let fragments = boss.shots.iter().filter(|s| s.kind == ProjectileKind::Fragment).count();
        assert_eq!(fragments, BURST_FRAGMENTS);
        for _ in 0..=STRAFE_TICKS {
            boss.advance(None, &mut rng);
            assert!(boss.pos.x >= BOSS_EDGE_MARGIN - 1e-3);
            assert!(boss.pos.x <= FIELD_WIDTH - BOSS_WIDTH - BOSS_EDGE_MARGIN + 1e-3);
        }
        assert_eq!(boss.phase, BossPhase::Hovering);
    }

    #[test]
    fn test_fragments_expire() {
        let mut boss = Boss::new(1, 3, WEIGHTS);
        boss.pos = Vec2::new(310.0, 200.0);
        boss.radial_burst();
        for _ in 0..FRAGMENT_TTL {
            boss.advance_shots(None);
        }
        assert!(boss.shots.is_empty());
    }

    #[test]
    fn test_no_attack_without_player() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut boss = wounded_boss();
        for _ in 0..1000 {
            boss.advance(None, &mut rng);
            assert!(!boss.charge.is_active());
        }
        // Only the radial bursts, never aimed attacks
        assert!(boss.shots.iter().all(|s| s.kind == ProjectileKind::Fragment));
    }

    #[test]
    fn test_attacks_every_interval() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut boss = Boss::new(1, 3, WEIGHTS);
        for _ in 0..ATTACK_INTERVAL - 1 {
            boss.advance(Some(target()), &mut rng);
        }
        assert!(boss.shots.is_empty());
        boss.advance(Some(target()), &mut rng);
        assert!(!boss.shots.is_empty());
    }

    #[test]
    fn test_weapon_scaling() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut boss = Boss::new(1, 10, WEIGHTS);
        boss.attack(BossWeapon::Spread, target().center, &mut rng);
        assert_eq!(boss.shots.len(), 7);
        assert!((boss.shots[0].damage - 2.5).abs() < 1e-5);

        boss.shots.clear();
        boss.attack(BossWeapon::LaserVolley, target().center, &mut rng);
        assert_eq!(boss.shots.len(), 4);
        assert!(boss.shots.iter().all(|s| s.penetrating && s.vel.y > 0.0));

        boss.shots.clear();
        boss.attack(BossWeapon::SplashBomb, target().center, &mut rng);
        assert_eq!(boss.shots.len(), 3);
        assert_eq!(boss.shots[0].splash.map(|s| s.radius), Some(170.0));

        boss.shots.clear();
        boss.attack(BossWeapon::HomingMissile, target().center, &mut rng);
        assert_eq!(boss.shots.len(), 4);
        assert!(boss.shots.iter().all(|s| s.homing.is_some()));
    }

    #[test]
    fn test_charge_attack_completes_sampled_dashes_and_returns_home() {
        for seed in 0..8 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut boss = wounded_boss();
            let mut started = false;
            let mut ticks = 0;
            while ticks < 5000 {
                boss.advance(Some(target()), &mut rng);
                ticks += 1;
                if boss.charge.is_active() {
                    started = true;
                } else if started {
                    break;
                }
            }
            assert!(started, "seed {}: charge never started", seed);
            assert!(!boss.charge.is_active(), "seed {}: charge never finished", seed);
            let total = boss.charge.total_dashes;
            assert!((2..=4).contains(&total));
            assert_eq!(boss.charge.completed_dashes, total);
            assert!(boss.pos.distance(boss.charge.home()) <= RETURN_TOLERANCE);
            assert_eq!(boss.phase, BossPhase::Hovering);
        }
    }

    #[test]
    fn test_charge_suspends_regular_attacks() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut boss = wounded_boss();
        boss.charge.cooldown = CHARGE_COOLDOWN - 1;
        boss.advance(Some(target()), &mut rng);
        assert!(boss.charge.is_active());
        assert_eq!(boss.charge.damage, 33.0);
        boss.shots.clear();
        for _ in 0..CHARGE_TELEGRAPH - 1 {
            boss.advance(Some(target()), &mut rng);
            boss.hit();
        }
        assert!(boss.shots.is_empty());
        assert!(matches!(boss.charge.state, ChargeState::Dashing { .. }));
    }

    #[test]
    fn test_hit_reports_destruction_once() {
        let mut boss = Boss::new(1, 3, WEIGHTS);
        boss.health = 2;
        assert!(!boss.hit());
        assert_eq!(boss.hit_flash, HIT_FLASH_TICKS);
        assert!(boss.hit());
        assert!(!boss.hit());
    }
}
