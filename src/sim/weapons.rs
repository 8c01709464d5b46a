//! Player weapon patterns
//!
//! Firing is a pure function of weapon mode and augment level: each mode owns
//! an angle (or offset) table that grows by symmetric additions as the
//! augment level climbs from 0 to 6.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Faction, Hitbox, Projectile, ProjectileKind};
use crate::consts::*;
use crate::fan_velocity;

/// Mutually exclusive weapon modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponMode {
    #[default]
    Default,
    Spread,
    Laser,
    Bomb,
    Homing,
}

impl WeaponMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponMode::Default => "default",
            WeaponMode::Spread => "spread",
            WeaponMode::Laser => "laser",
            WeaponMode::Bomb => "bomb",
            WeaponMode::Homing => "homing",
        }
    }
}

/// Where shots leave the craft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Muzzle {
    /// Nose of the craft (center x, top edge)
    pub front: Vec2,
    /// Lower fuselage, used by rear-facing lasers
    pub rear: Vec2,
}

impl Muzzle {
    /// Muzzle points for a player craft with the given top-left position
    pub fn for_player(pos: Vec2) -> Self {
        let cx = pos.x + PLAYER_WIDTH / 2.0;
        Self {
            front: Vec2::new(cx, pos.y),
            rear: Vec2::new(cx, pos.y + PLAYER_HEIGHT * 0.7),
        }
    }
}

const BOLT_SPEED: f32 = 10.0;
const LASER_SPEED: f32 = 15.0;
const REAR_LASER_SPEED: f32 = 12.0;
const LASER_SPACING: f32 = 36.0;
const REAR_LASER_SPACING: f32 = 45.0;
const BOMB_SPEED: f32 = 10.0;
const BOMB_SPLASH_RADIUS: f32 = 200.0;
const BOMB_SPLASH_DAMAGE: f32 = 2.5;
const MISSILE_SPEED: f32 = 8.0;
const CHARGED_SPEED: f32 = 12.0;
const CHARGED_DAMAGE: f32 = 2.5;

/// Base shot damage at an augment level
#[inline]
pub fn base_damage(level: u8) -> f32 {
    1.0 + 0.5 * level as f32
}

/// Fire the given weapon. Pure: no hidden state beyond the two inputs.
pub fn fire(mode: WeaponMode, level: u8, muzzle: Muzzle) -> Vec<Projectile> {
    let level = level.min(MAX_AUGMENT_LEVEL);
    match mode {
        WeaponMode::Default => fan(&default_angles(level), level, muzzle.front),
        WeaponMode::Spread => fan(&spread_angles(level), level, muzzle.front),
        WeaponMode::Laser => lasers(level, muzzle),
        WeaponMode::Bomb => bombs(level, muzzle.front),
        WeaponMode::Homing => vec![missile(level, muzzle.front)],
    }
}

/// The charge-shot volley: three homing, penetrating shots at -30, 0, 30 degrees
pub fn charged_volley(muzzle: Muzzle) -> Vec<Projectile> {
    [-PI / 6.0, 0.0, PI / 6.0]
        .iter()
        .map(|&angle| {
            Projectile::new(
                Faction::Player,
                ProjectileKind::Charged,
                muzzle.front,
                fan_velocity(angle, CHARGED_SPEED),
                CHARGED_DAMAGE,
                Hitbox::Circle { r: 12.0 },
            )
            .penetrating()
            .with_homing(HOMING_STRENGTH)
        })
        .collect()
}

fn fan(angles: &[f32], level: u8, origin: Vec2) -> Vec<Projectile> {
    angles
        .iter()
        .map(|&angle| {
            Projectile::bolt(
                Faction::Player,
                origin,
                fan_velocity(angle, BOLT_SPEED),
                base_damage(level),
            )
        })
        .collect()
}

/// Default gun: straight shot, widening forward fan, then flank shots
pub fn default_angles(level: u8) -> Vec<f32> {
    let mut angles = vec![0.0];
    if level >= 1 {
        angles.extend([-PI / 12.0, PI / 12.0]);
    }
    if level >= 2 {
        angles.extend([-PI / 6.0, PI / 6.0]);
    }
    if level >= 3 {
        angles.extend([PI / 2.5, -PI / 2.5]);
    }
    if level >= 4 {
        angles.extend([PI / 2.0, -PI / 2.0]);
    }
    if level >= 5 {
        angles.extend([-PI / 8.0, PI / 8.0]);
    }
    if level >= 6 {
        angles.extend([-PI / 4.0, PI / 4.0]);
    }
    angles
}

/// Spread gun: three-way fan that grows rear coverage first
pub fn spread_angles(level: u8) -> Vec<f32> {
    let mut angles = vec![-PI / 6.0, 0.0, PI / 6.0];
    if level >= 1 {
        angles.extend([PI + PI / 6.0, PI - PI / 6.0]);
    }
    if level >= 2 {
        angles.push(PI);
    }
    if level >= 3 {
        angles.extend([-PI / 12.0, PI / 12.0]);
    }
    if level >= 4 {
        angles.extend([-PI / 8.0, PI / 8.0]);
    }
    if level >= 5 {
        angles.extend([-PI / 4.0, PI / 4.0, PI + PI / 12.0, PI - PI / 12.0]);
    }
    if level >= 6 {
        angles.extend([-PI / 3.0, PI / 3.0]);
    }
    angles
}

/// Bomb fan by bomb count
pub fn bomb_angles(count: usize) -> Vec<f32> {
    match count {
        2 => vec![-PI / 12.0, PI / 12.0],
        3 => vec![-PI / 6.0, 0.0, PI / 6.0],
        4 => vec![-PI / 5.0, -PI / 12.0, PI / 12.0, PI / 5.0],
        5 => vec![-PI / 4.0, -PI / 8.0, 0.0, PI / 8.0, PI / 4.0],
        // Five forward plus both flanks
        6 => vec![
            -PI / 4.0,
            -PI / 8.0,
            0.0,
            PI / 8.0,
            PI / 4.0,
            PI / 2.5,
            -PI / 2.5,
        ],
        _ => vec![0.0],
    }
}

/// Offsets for `count` parallel beams centered on zero
fn beam_offsets(count: usize, spacing: f32) -> impl Iterator<Item = f32> {
    (0..count).map(move |i| (i as f32 - (count as f32 - 1.0) / 2.0) * spacing)
}

fn lasers(level: u8, muzzle: Muzzle) -> Vec<Projectile> {
    let forward = (1 + level as usize).min(6);
    let beam = Hitbox::Rect { w: 6.0, h: 40.0 };
    let mut shots: Vec<Projectile> = beam_offsets(forward, LASER_SPACING)
        .map(|dx| {
            Projectile::new(
                Faction::Player,
                ProjectileKind::Laser,
                muzzle.front + Vec2::new(dx, 0.0),
                Vec2::new(0.0, -LASER_SPEED),
                base_damage(level) * 1.5,
                beam,
            )
            .penetrating()
        })
        .collect();

    if level >= 4 {
        let rear = (level as usize - 3).min(4);
        shots.extend(beam_offsets(rear, REAR_LASER_SPACING).map(|dx| {
            Projectile::new(
                Faction::Player,
                ProjectileKind::Laser,
                muzzle.rear + Vec2::new(dx, 0.0),
                Vec2::new(0.0, REAR_LASER_SPEED),
                base_damage(level) * 1.2,
                beam,
            )
            .penetrating()
        }));
    }
    shots
}

fn bombs(level: u8, origin: Vec2) -> Vec<Projectile> {
    let count = (1 + level as usize).min(6);
    bomb_angles(count)
        .iter()
        .map(|&angle| {
            Projectile::new(
                Faction::Player,
                ProjectileKind::Bomb,
                origin,
                fan_velocity(angle, BOMB_SPEED),
                base_damage(level),
                Hitbox::Circle { r: 10.0 },
            )
            .with_splash(BOMB_SPLASH_RADIUS, BOMB_SPLASH_DAMAGE)
        })
        .collect()
}

fn missile(level: u8, origin: Vec2) -> Projectile {
    Projectile::new(
        Faction::Player,
        ProjectileKind::Missile,
        origin,
        Vec2::new(0.0, -MISSILE_SPEED),
        3.0 + 1.2 * level as f32,
        Hitbox::Circle { r: 8.0 },
    )
    .with_homing(HOMING_STRENGTH)
}

/// Duration of a weapon pickup at a difficulty level, in milliseconds.
///
/// `None` means the weapon never expires.
pub fn weapon_duration_ms(difficulty: u32) -> Option<u64> {
    if difficulty <= 1 {
        None
    } else if difficulty >= 10 {
        Some(30_000)
    } else {
        // Linear from 180 s at level 2 down to 60 s at level 9
        let t = (difficulty - 2) as f64 / 7.0;
        let ms = 180_000.0 - t * 120_000.0;
        Some(ms.max(60_000.0) as u64)
    }
}
