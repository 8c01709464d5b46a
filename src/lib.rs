//! Sky Ace - a vertical arcade shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, spawning, bosses)
//! - `session`: Host-facing lifecycle (start/reset/tick/game over)
//! - `audio`: Sound trigger facade and music loop scheduling
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality, volume)
//! - `highscores`: In-memory leaderboard

pub mod audio;
pub mod error;
pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{SimError, SimResult};
pub use highscores::HighScores;
pub use session::{Clock, GameOverReport, Session, SessionPhase, SystemClock};
pub use settings::{ParticleBudget, QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions (screen coordinates, y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Projectiles further than this outside the field are discarded
    pub const OFFSCREEN_PADDING: f32 = 50.0;

    /// Player craft
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_BOTTOM_MARGIN: f32 = 20.0;

    /// Rectangular bullet hitbox (player and regular enemy shots)
    pub const BULLET_WIDTH: f32 = 4.0;
    pub const BULLET_HEIGHT: f32 = 12.0;
    /// Regular enemy bullet speed (pixels per tick)
    pub const ENEMY_BULLET_SPEED: f32 = 5.0;

    /// Augment (P) level ceiling
    pub const MAX_AUGMENT_LEVEL: u8 = 6;
    /// Health fraction below which the augment boost pins P at max
    pub const CRITICAL_HEALTH_FRACTION: f32 = 0.3;

    /// Homing: how far "behind" a projectile a target may sit and still be chased
    pub const HOMING_FORWARD_WINDOW: f32 = 100.0;
    /// Default homing blend per tick
    pub const HOMING_STRENGTH: f32 = 0.15;

    /// Explosion lifetime in ticks
    pub const EXPLOSION_LIFETIME: u32 = 20;

    /// Pickup size and fall speed
    pub const PICKUP_SIZE: f32 = 30.0;
    pub const PICKUP_FALL_SPEED: f32 = 2.0;

    /// Boss hull
    pub const BOSS_WIDTH: f32 = 180.0;
    pub const BOSS_HEIGHT: f32 = 150.0;
    /// Distance the boss keeps from the side walls
    pub const BOSS_EDGE_MARGIN: f32 = 20.0;
}

/// Velocity for a shot fired at `angle` radians off the vertical.
///
/// Angle 0 points toward the top of the field, PI toward the bottom. The
/// lateral component is squashed so fans stay narrow on screen.
#[inline]
pub fn fan_velocity(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.sin() * speed * 0.6, -angle.cos() * speed)
}

/// Unit vector from `from` toward `to`, or zero if they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Move `pos` toward `target` by at most `step`, never overshooting
#[inline]
pub fn step_toward(pos: Vec2, target: Vec2, step: f32) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    if dist <= step || dist <= f32::EPSILON {
        target
    } else {
        pos + delta / dist * step
    }
}

/// Pick an index with probability proportional to its weight
///
/// Weights are validated to have a positive, non-overflowing total at session
/// start; any other table falls back to index 0.
pub fn weighted_index<R: rand::Rng>(rng: &mut R, weights: &[u32]) -> usize {
    let total = weights.iter().try_fold(0u32, |acc, &w| acc.checked_add(w));
    let Some(total) = total.filter(|&t| t > 0) else {
        return 0;
    };
    let mut roll = rng.random_range(0..total);
    for (i, &w) in weights.iter().enumerate() {
        if roll < w {
            return i;
        }
        roll -= w;
    }
    weights.len().saturating_sub(1)
}
