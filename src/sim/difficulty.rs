//! Difficulty level and spawn scheduling
//!
//! One policy per session decides how the level rises (see
//! [`DifficultyPolicy`]). The level drives spawn cadence, group size, the
//! trailing-edge spawn chance, enemy/boss stats and weapon pickup duration.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::{DifficultyPolicy, Tuning};

/// Enemies per spawn group for levels 1..=10. Peaks mid-game on purpose.
const SIMULTANEOUS_SPAWNS: [u32; 10] = [2, 2, 3, 3, 3, 5, 5, 5, 4, 4];

/// What the scheduler wants spawned this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOrder {
    Nothing,
    /// A group of regular enemies
    Wave { count: u32 },
    Boss,
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub order: SpawnOrder,
    /// The level rose this tick
    pub raised: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    /// Current level, 1..=max
    pub level: u32,
    pub policy: DifficultyPolicy,
    max_level: u32,
    interval_ticks: u32,
    base_spawn_interval: u32,
    spawn_interval_step: u32,
    min_spawn_interval: u32,
    trailing_threshold: u32,
    trailing_chance: f32,
    boss_interval_ticks: u32,
    level_timer: u32,
    spawn_timer: u32,
    boss_timer: u32,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 1,
            policy: tuning.difficulty_policy,
            max_level: tuning.max_difficulty.max(1),
            interval_ticks: tuning.difficulty_interval_ticks,
            base_spawn_interval: tuning.base_spawn_interval,
            spawn_interval_step: tuning.spawn_interval_step,
            min_spawn_interval: tuning.min_spawn_interval,
            trailing_threshold: tuning.trailing_spawn_threshold,
            trailing_chance: tuning.trailing_spawn_chance,
            boss_interval_ticks: tuning.boss_interval_ticks,
            level_timer: 0,
            spawn_timer: 0,
            boss_timer: 0,
        }
    }

    /// Ticks between spawn groups at the current level
    pub fn spawn_interval(&self) -> u32 {
        self.base_spawn_interval
            .saturating_sub(self.spawn_interval_step.saturating_mul(self.level))
            .max(self.min_spawn_interval)
    }

    /// Enemies per spawn group at the current level
    pub fn simultaneous_spawns(&self) -> u32 {
        let idx = (self.level.max(1) as usize - 1).min(SIMULTANEOUS_SPAWNS.len() - 1);
        SIMULTANEOUS_SPAWNS[idx]
    }

    /// Roll whether the next enemy enters from the bottom edge
    pub fn roll_trailing_spawn<R: Rng>(&self, rng: &mut R) -> bool {
        self.level > self.trailing_threshold && rng.random::<f32>() < self.trailing_chance
    }

    /// Raise the level by one (saturating). Returns true if it changed.
    fn raise(&mut self) -> bool {
        if self.level < self.max_level {
            self.level += 1;
            log::info!("Difficulty raised to {}", self.level);
            true
        } else {
            false
        }
    }

    /// Boss destroyed: advances the level under the boss-defeat policy
    pub fn on_boss_defeated(&mut self) -> bool {
        self.boss_timer = 0;
        match self.policy {
            DifficultyPolicy::BossDefeat => self.raise(),
            DifficultyPolicy::Interval => false,
        }
    }

    /// Advance timers one tick and decide what to spawn
    ///
    /// While a boss is active no regular enemies spawn and the boss timer
    /// holds still.
    pub fn advance(&mut self, boss_active: bool) -> Schedule {
        let mut raised = false;
        if self.policy == DifficultyPolicy::Interval && self.interval_ticks > 0 {
            self.level_timer += 1;
            if self.level_timer >= self.interval_ticks {
                self.level_timer = 0;
                raised = self.raise();
            }
        }
        Schedule {
            order: self.next_order(boss_active),
            raised,
        }
    }

    fn next_order(&mut self, boss_active: bool) -> SpawnOrder {
        if boss_active {
            return SpawnOrder::Nothing;
        }

        self.boss_timer += 1;
        if self.boss_timer >= self.boss_interval_ticks {
            self.boss_timer = 0;
            self.spawn_timer = 0;
            return SpawnOrder::Boss;
        }

        self.spawn_timer += 1;
        if self.spawn_timer >= self.spawn_interval() {
            self.spawn_timer = 0;
            return SpawnOrder::Wave {
                count: self.simultaneous_spawns(),
            };
        }

        SpawnOrder::Nothing
    }
}
