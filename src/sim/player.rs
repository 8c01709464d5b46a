//! The player craft
//!
//! Owns movement, the fire/charge trigger, the critical-health augment boost,
//! weapon pickup timers and the experience/gauge progression.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, clamp_to_field};
use super::pickup::PowerUpKind;
use super::projectile::Projectile;
use super::weapons::{self, Muzzle, WeaponMode, weapon_duration_ms};
use crate::consts::*;
use crate::tuning::Tuning;

/// Experience needed per player level
pub const EXP_PER_LEVEL: u32 = 100;
/// How long level/augment banners stay up
pub const BANNER_TICKS: u32 = 40;

const HEAL_FRACTION: f32 = 0.3;
const GAUGE_GROWTH: f32 = 1.35;
const MAX_HEALTH_MULTIPLE: f32 = 3.0;
/// Deflector geometry while charging
const SHIELD_OFFSET: f32 = 15.0;
const SHIELD_MIN_RADIUS: f32 = 10.0;
const SHIELD_GROWTH: f32 = 22.0;

/// Charge-shot deflector circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shield {
    pub center: Vec2,
    pub radius: f32,
}

/// Short-lived HUD notice (augment raised, player level up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub value: u32,
    pub ticks: u32,
}

/// What the trigger produced this tick
#[derive(Debug, Default)]
pub struct TriggerResult {
    pub shots: Vec<Projectile>,
    /// A regular volley left the guns
    pub fired: bool,
    /// First tick of a new charge
    pub charge_started: bool,
    /// Full charge released
    pub charged_shot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    base_max_health: f32,
    pub invulnerable_ticks: u32,
    pub weapon: WeaponMode,
    /// Wall-clock expiry of the current weapon (`None` = permanent)
    pub weapon_expires_at: Option<u64>,
    /// Augment level P, 0..=6
    pub augment: u8,
    /// Level to restore once the critical-health boost ends
    pub boost: Option<u8>,
    pub fire_cooldown: u32,
    pub charge: u32,
    pub charging: bool,
    pub exp: u32,
    pub level: u32,
    pub gauge: f32,
    pub gauge_max: f32,
    pub augment_banner: Option<Banner>,
    pub level_banner: Option<Banner>,
    fire_rate: u32,
    charge_max: u32,
    invulnerability: u32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0,
                FIELD_HEIGHT - PLAYER_HEIGHT - PLAYER_BOTTOM_MARGIN,
            ),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            base_max_health: tuning.player_max_health,
            invulnerable_ticks: 0,
            weapon: WeaponMode::Default,
            weapon_expires_at: None,
            augment: 0,
            boost: None,
            fire_cooldown: 0,
            charge: 0,
            charging: false,
            exp: 0,
            level: 1,
            gauge: 0.0,
            gauge_max: 100.0,
            augment_banner: None,
            level_banner: None,
            fire_rate: tuning.fire_cooldown_ticks,
            charge_max: tuning.charge_ticks,
            invulnerability: tuning.invulnerability_ticks,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    pub fn is_boosted(&self) -> bool {
        self.boost.is_some()
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Charge progress in [0, 1]
    pub fn charge_fraction(&self) -> f32 {
        if self.charge_max == 0 {
            return 1.0;
        }
        (self.charge as f32 / self.charge_max as f32).min(1.0)
    }

    /// Move by a direction (length clamped to 1) at player speed
    pub fn move_by(&mut self, dir: Vec2) {
        let dir = dir.clamp_length_max(1.0);
        self.pos = clamp_to_field(self.pos + dir * PLAYER_SPEED, self.size);
    }

    /// Run the fire and charge triggers for one tick
    pub fn trigger(&mut self, firing: bool, charging: bool) -> TriggerResult {
        let mut out = TriggerResult::default();
        let muzzle = Muzzle::for_player(self.pos);

        if firing && self.fire_cooldown == 0 {
            out.shots = weapons::fire(self.weapon, self.augment, muzzle);
            out.fired = true;
            self.fire_cooldown = self.fire_rate;
        }

        if charging {
            if !self.charging {
                self.charging = true;
                self.charge = 0;
                out.charge_started = true;
            }
            self.charge = (self.charge + 1).min(self.charge_max);
        } else if self.charging {
            // Released: below the cap nothing fires
            if self.charge >= self.charge_max && self.fire_cooldown == 0 {
                out.shots.extend(weapons::charged_volley(muzzle));
                out.charged_shot = true;
                self.fire_cooldown = self.fire_rate * 3;
            }
            self.charging = false;
            self.charge = 0;
        }

        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
        out
    }

    /// Deflector circle in front of the nose, present only while charging
    pub fn shield(&self) -> Option<Shield> {
        if !self.charging {
            return None;
        }
        Some(Shield {
            center: Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y - SHIELD_OFFSET),
            radius: SHIELD_MIN_RADIUS + SHIELD_GROWTH * self.charge_fraction(),
        })
    }

    /// Take damage unless invulnerable. Returns whether the hit landed.
    pub fn take_hit(&mut self, damage: f32) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.health -= damage;
        self.invulnerable_ticks = self.invulnerability;
        true
    }

    /// Apply a collected pickup
    pub fn collect(&mut self, kind: PowerUpKind, difficulty: u32, now_ms: u64) {
        match kind {
            PowerUpKind::Heal => {
                let amount = (self.max_health * HEAL_FRACTION).floor();
                self.health = (self.health + amount).min(self.max_health);
            }
            PowerUpKind::Augment => match self.boost.as_mut() {
                Some(saved) => *saved = (*saved + 1).min(MAX_AUGMENT_LEVEL),
                None => self.augment = (self.augment + 1).min(MAX_AUGMENT_LEVEL),
            },
            _ => {
                let Some(mode) = kind.weapon() else {
                    return;
                };
                if mode != self.weapon {
                    match self.boost.as_mut() {
                        // Stay pinned at max; the level to restore is lost
                        Some(saved) => *saved = 0,
                        None => self.augment = 0,
                    }
                }
                self.weapon = mode;
                self.weapon_expires_at = weapon_duration_ms(difficulty).map(|d| now_ms + d);
                log::debug!("Weapon {} until {:?}", mode.as_str(), self.weapon_expires_at);
            }
        }
    }

    /// Per-tick bookkeeping: weapon expiry, critical-health boost, banners
    pub fn update_power_ups(&mut self, now_ms: u64) {
        if let Some(expiry) = self.weapon_expires_at
            && now_ms >= expiry
        {
            log::debug!("Weapon {} expired", self.weapon.as_str());
            self.weapon = WeaponMode::Default;
            self.weapon_expires_at = None;
        }

        let fraction = self.health_fraction();
        if fraction < CRITICAL_HEALTH_FRACTION {
            if self.boost.is_none() && self.augment < MAX_AUGMENT_LEVEL {
                self.boost = Some(self.augment);
                self.augment = MAX_AUGMENT_LEVEL;
            }
        } else if let Some(saved) = self.boost.take() {
            self.augment = saved;
        }

        for banner in [&mut self.augment_banner, &mut self.level_banner] {
            if let Some(b) = banner.as_mut() {
                b.ticks = b.ticks.saturating_sub(1);
                if b.ticks == 0 {
                    *banner = None;
                }
            }
        }
    }

    /// Fill the augment gauge. Returns true if the augment level went up.
    pub fn add_gauge(&mut self, amount: f32) -> bool {
        if self.augment >= MAX_AUGMENT_LEVEL {
            return false;
        }
        self.gauge += amount;
        if self.gauge < self.gauge_max {
            return false;
        }
        self.gauge -= self.gauge_max;
        self.augment += 1;
        self.augment_banner = Some(Banner {
            value: self.augment as u32,
            ticks: BANNER_TICKS,
        });
        true
    }

    /// Add experience. Returns the number of levels gained.
    pub fn add_exp(&mut self, amount: u32) -> u32 {
        self.exp += amount;
        let mut gained = 0;
        while self.exp >= EXP_PER_LEVEL {
            self.exp -= EXP_PER_LEVEL;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;

        let progress = if self.gauge_max > 0.0 {
            self.gauge / self.gauge_max
        } else {
            0.0
        };
        self.gauge_max = (self.gauge_max * GAUGE_GROWTH).floor();
        self.gauge = (self.gauge_max * progress).floor();

        let increase = (self.base_max_health * 0.35 / 12.0).floor();
        self.max_health =
            (self.max_health + increase).min(self.base_max_health * MAX_HEALTH_MULTIPLE);
        self.health = (self.health + increase).min(self.max_health);

        self.level_banner = Some(Banner {
            value: self.level,
            ticks: BANNER_TICKS,
        });
        log::info!("Player level {}", self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&Tuning::default())
    }

    #[test]
    fn test_spawn_position() {
        let p = player();
        assert_eq!(p.pos, Vec2::new(380.0, 530.0));
    }

    #[test]
    fn test_move_is_clamped() {
        let mut p = player();
        for _ in 0..200 {
            p.move_by(Vec2::new(-1.0, 1.0));
        }
        assert_eq!(p.pos, Vec2::new(0.0, FIELD_HEIGHT - PLAYER_HEIGHT));
        // Diagonal input is normalized, not summed
        let mut p = player();
        p.move_by(Vec2::new(3.0, 4.0));
        assert!((p.pos - Vec2::new(383.0, 534.0)).length() < 1e-4);
    }

    #[test]
    fn test_fire_cooldown() {
        let mut p = player();
        let fired: Vec<bool> = (0..12).map(|_| p.trigger(true, false).fired).collect();
        assert!(fired[0]);
        assert!(!fired[1]);
        // Cooldown of 10 set on the firing tick, decremented the same tick
        assert!(fired[10]);
    }

    #[test]
    fn test_charge_release_below_cap_fires_nothing() {
        let mut p = player();
        let first = p.trigger(false, true);
        assert!(first.charge_started);
        for _ in 0..30 {
            assert!(!p.trigger(false, true).charge_started);
        }
        let release = p.trigger(false, false);
        assert!(!release.charged_shot);
        assert!(release.shots.is_empty());
        assert!(!p.charging);
    }

    #[test]
    fn test_full_charge_fires_volley_with_long_cooldown() {
        let mut p = player();
        for _ in 0..120 {
            p.trigger(false, true);
        }
        assert_eq!(p.charge_fraction(), 1.0);
        let release = p.trigger(false, false);
        assert!(release.charged_shot);
        assert_eq!(release.shots.len(), 3);
        assert_eq!(p.fire_cooldown, 29);
    }

    #[test]
    fn test_shield_grows_with_charge() {
        let mut p = player();
        assert!(p.shield().is_none());
        p.trigger(false, true);
        let small = p.shield().map(|s| s.radius).unwrap_or_default();
        for _ in 0..100 {
            p.trigger(false, true);
        }
        let full = p.shield().map(|s| s.radius).unwrap_or_default();
        assert!(small < full);
        assert!((full - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_invulnerability_window() {
        let mut p = player();
        assert!(p.take_hit(20.0));
        assert!(!p.take_hit(20.0));
        assert_eq!(p.health, 80.0);
        for _ in 0..120 {
            p.trigger(false, false);
        }
        assert!(p.take_hit(20.0));
        assert_eq!(p.health, 60.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut p = player();
        p.health = 50.0;
        p.collect(PowerUpKind::Heal, 1, 0);
        assert_eq!(p.health, 80.0);
        p.collect(PowerUpKind::Heal, 1, 0);
        assert_eq!(p.health, 100.0);
    }

    #[test]
    fn test_weapon_switch_resets_augment() {
        let mut p = player();
        p.augment = 4;
        p.collect(PowerUpKind::Laser, 1, 0);
        assert_eq!(p.weapon, WeaponMode::Laser);
        assert_eq!(p.augment, 0);
        // Same weapon again keeps the level
        p.augment = 3;
        p.collect(PowerUpKind::Laser, 1, 0);
        assert_eq!(p.augment, 3);
    }

    #[test]
    fn test_weapon_expiry_by_difficulty() {
        let mut p = player();
        p.collect(PowerUpKind::Spread, 1, 1000);
        assert_eq!(p.weapon_expires_at, None);
        p.update_power_ups(10_000_000);
        assert_eq!(p.weapon, WeaponMode::Spread);

        p.collect(PowerUpKind::Bomb, 10, 1000);
        assert_eq!(p.weapon_expires_at, Some(31_000));
        p.update_power_ups(30_999);
        assert_eq!(p.weapon, WeaponMode::Bomb);
        p.update_power_ups(31_000);
        assert_eq!(p.weapon, WeaponMode::Default);
    }

    #[test]
    fn test_critical_boost_pins_and_restores() {
        let mut p = player();
        p.augment = 2;
        p.health = 25.0;
        p.update_power_ups(0);
        assert_eq!(p.augment, 6);
        assert_eq!(p.boost, Some(2));

        // Weapon switch while boosted: stays at 6, restore target becomes 0
        p.collect(PowerUpKind::Homing, 1, 0);
        assert_eq!(p.augment, 6);
        p.health = 40.0;
        p.update_power_ups(0);
        assert_eq!(p.augment, 0);
        assert!(!p.is_boosted());
    }

    #[test]
    fn test_augment_monotonic_while_boosted() {
        let mut p = player();
        p.augment = 1;
        p.health = 10.0;
        p.update_power_ups(0);
        let mut last = p.augment;
        for _ in 0..5 {
            p.collect(PowerUpKind::Augment, 1, 0);
            p.update_power_ups(0);
            assert!(p.augment >= last);
            last = p.augment;
        }
        assert_eq!(p.boost, Some(6));
    }

    #[test]
    fn test_gauge_raises_augment() {
        let mut p = player();
        for _ in 0..9 {
            assert!(!p.add_gauge(10.0));
        }
        assert!(p.add_gauge(10.0));
        assert_eq!(p.augment, 1);
        assert_eq!(p.gauge, 0.0);
        assert!(p.augment_banner.is_some());

        p.augment = MAX_AUGMENT_LEVEL;
        assert!(!p.add_gauge(500.0));
    }

    #[test]
    fn test_level_up_grows_gauge_and_health() {
        let mut p = player();
        p.gauge = 50.0;
        assert_eq!(p.add_exp(60), 0);
        assert_eq!(p.add_exp(150), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.exp, 10);
        // 100 -> 135 -> 182
        assert_eq!(p.gauge_max, 182.0);
        assert_eq!(p.gauge, 90.0);
        assert_eq!(p.max_health, 104.0);
    }

    #[test]
    fn test_max_health_capped_at_three_times_base() {
        let mut p = player();
        p.add_exp(EXP_PER_LEVEL * 200);
        assert_eq!(p.max_health, 300.0);
        assert!(p.health <= p.max_health);
    }
}
