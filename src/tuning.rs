//! Data-driven game balance
//!
//! Every knob a designer may want to turn without recompiling. Missing keys in
//! a JSON override fall back to the defaults below, so a minimal file can
//! override just the values you care about. Values are validated once when a
//! session starts; the simulation trusts them afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, require_fraction, require_positive};

/// Highest difficulty a session may be configured for
pub const DIFFICULTY_CEILING: u32 = 100;

/// How the difficulty level advances during a session.
///
/// The two policies are mutually exclusive for a given session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifficultyPolicy {
    /// +1 level each time a boss is destroyed
    #[default]
    BossDefeat,
    /// +1 level every `difficulty_interval_ticks`
    Interval,
}

/// Runtime-tunable balance values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // ── Difficulty ────────────────────────────────────────────────────────────
    pub difficulty_policy: DifficultyPolicy,
    pub difficulty_interval_ticks: u32,
    pub max_difficulty: u32,
    pub base_spawn_interval: u32,
    pub spawn_interval_step: u32,
    pub min_spawn_interval: u32,
    /// Trailing-edge spawns only happen above this level
    pub trailing_spawn_threshold: u32,
    pub trailing_spawn_chance: f32,
    pub boss_interval_ticks: u32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_max_health: f32,
    /// Damage of one enemy bullet or body contact
    pub player_hit_damage: f32,
    pub invulnerability_ticks: u32,
    pub fire_cooldown_ticks: u32,
    pub charge_ticks: u32,
    pub exp_per_kill: u32,
    pub gauge_per_kill: f32,

    // ── Drops ─────────────────────────────────────────────────────────────────
    pub drop_chance: f32,
    pub boss_drop_count: u32,
    /// Spread, Laser, Bomb, Homing, Heal, Augment
    pub power_up_weights: [u32; 6],
    /// Spread, Laser volley, Splash bomb, Homing missile
    pub boss_weapon_weights: [u32; 4],

    // ── Special ability ───────────────────────────────────────────────────────
    pub lightning_cooldown_ticks: u32,

    // ── Caps ──────────────────────────────────────────────────────────────────
    pub max_enemies: usize,
    pub max_player_shots: usize,
    pub max_hostile_shots: usize,
    pub max_explosions: usize,
    pub max_pickups: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty_policy: DifficultyPolicy::BossDefeat,
            difficulty_interval_ticks: 600,
            max_difficulty: 10,
            base_spawn_interval: 100,
            spawn_interval_step: 7,
            min_spawn_interval: 30,
            trailing_spawn_threshold: 7,
            trailing_spawn_chance: 0.3,
            boss_interval_ticks: 1080,

            player_max_health: 100.0,
            player_hit_damage: 20.0,
            invulnerability_ticks: 120,
            fire_cooldown_ticks: 10,
            charge_ticks: 90,
            exp_per_kill: 20,
            gauge_per_kill: 10.0,

            drop_chance: 0.3,
            boss_drop_count: 5,
            power_up_weights: [25, 15, 18, 21, 8, 13],
            boss_weapon_weights: [30, 20, 25, 25],

            lightning_cooldown_ticks: 300,

            max_enemies: 48,
            max_player_shots: 400,
            max_hostile_shots: 300,
            max_explosions: 32,
            max_pickups: 24,
        }
    }
}

impl Tuning {
    /// Parse a JSON override and validate the result
    pub fn from_json(json: &str) -> SimResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)
            .map_err(|source| SimError::Parse { what: "tuning", source })?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> SimResult<()> {
        require_positive("max_difficulty", self.max_difficulty as f32)?;
        if self.max_difficulty > DIFFICULTY_CEILING {
            return Err(SimError::InvalidConfig {
                field: "max_difficulty",
                value: self.max_difficulty as f32,
                expected: "<= 100",
            });
        }
        require_positive("base_spawn_interval", self.base_spawn_interval as f32)?;
        require_positive("min_spawn_interval", self.min_spawn_interval as f32)?;
        if self.min_spawn_interval > self.base_spawn_interval {
            return Err(SimError::InvalidConfig {
                field: "min_spawn_interval",
                value: self.min_spawn_interval as f32,
                expected: "<= base_spawn_interval",
            });
        }
        if self.difficulty_policy == DifficultyPolicy::Interval {
            require_positive("difficulty_interval_ticks", self.difficulty_interval_ticks as f32)?;
        }
        require_fraction("trailing_spawn_chance", self.trailing_spawn_chance)?;
        require_positive("boss_interval_ticks", self.boss_interval_ticks as f32)?;

        require_positive("player_max_health", self.player_max_health)?;
        require_positive("player_hit_damage", self.player_hit_damage)?;
        require_positive("charge_ticks", self.charge_ticks as f32)?;

        require_fraction("drop_chance", self.drop_chance)?;
        require_weight_total("power_up_weights", &self.power_up_weights)?;
        require_weight_total("boss_weapon_weights", &self.boss_weapon_weights)?;

        require_positive("max_enemies", self.max_enemies as f32)?;
        require_positive("max_player_shots", self.max_player_shots as f32)?;
        require_positive("max_hostile_shots", self.max_hostile_shots as f32)?;
        require_positive("max_explosions", self.max_explosions as f32)?;
        require_positive("max_pickups", self.max_pickups as f32)?;
        Ok(())
    }
}

/// Weight tables need a positive total that fits in a `u32`
fn require_weight_total(field: &'static str, weights: &[u32]) -> SimResult<()> {
    let total = weights.iter().try_fold(0u32, |acc, &w| acc.checked_add(w));
    match total {
        Some(t) if t > 0 => Ok(()),
        _ => Err(SimError::InvalidConfig {
            field,
            value: weights.iter().map(|&w| w as f32).sum(),
            expected: "a positive total weight below 2^32",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_override() {
        let tuning = Tuning::from_json(r#"{ "max_difficulty": 5, "drop_chance": 0.5 }"#).unwrap();
        assert_eq!(tuning.max_difficulty, 5);
        assert!((tuning.drop_chance - 0.5).abs() < 1e-6);
        // Untouched keys keep their defaults
        assert_eq!(tuning.boss_interval_ticks, 1080);
    }

    #[test]
    fn test_policy_from_json() {
        let tuning = Tuning::from_json(r#"{ "difficulty_policy": "Interval" }"#).unwrap();
        assert_eq!(tuning.difficulty_policy, DifficultyPolicy::Interval);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Tuning::from_json(r#"{ "drop_chance": 1.5 }"#).is_err());
        assert!(Tuning::from_json(r#"{ "power_up_weights": [0, 0, 0, 0, 0, 0] }"#).is_err());
        assert!(Tuning::from_json(r#"{ "min_spawn_interval": 500 }"#).is_err());
        assert!(Tuning::from_json("not json").is_err());
    }

    #[test]
    fn test_rejects_overflowing_values() {
        let huge = r#"{ "boss_weapon_weights": [4294967295, 1, 0, 0] }"#;
        assert!(matches!(
            Tuning::from_json(huge),
            Err(SimError::InvalidConfig {
                field: "boss_weapon_weights",
                ..
            })
        ));
        assert!(Tuning::from_json(r#"{ "max_difficulty": 100 }"#).is_ok());
        assert!(Tuning::from_json(r#"{ "max_difficulty": 4294967295 }"#).is_err());
    }
}
