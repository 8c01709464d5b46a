//! Falling power-up pickups

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::projectile::EntityId;
use super::weapons::WeaponMode;
use crate::consts::*;
use crate::weighted_index;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Spread,
    Laser,
    Bomb,
    Homing,
    Heal,
    Augment,
}

impl PowerUpKind {
    /// Order matches the `power_up_weights` tuning table
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Spread,
        PowerUpKind::Laser,
        PowerUpKind::Bomb,
        PowerUpKind::Homing,
        PowerUpKind::Heal,
        PowerUpKind::Augment,
    ];

    /// Weighted random pick
    pub fn roll<R: Rng>(rng: &mut R, weights: &[u32; 6]) -> Self {
        Self::ALL[weighted_index(rng, weights)]
    }

    /// The weapon this pickup switches to, if it is a weapon pickup
    pub fn weapon(self) -> Option<WeaponMode> {
        match self {
            PowerUpKind::Spread => Some(WeaponMode::Spread),
            PowerUpKind::Laser => Some(WeaponMode::Laser),
            PowerUpKind::Bomb => Some(WeaponMode::Bomb),
            PowerUpKind::Homing => Some(WeaponMode::Homing),
            PowerUpKind::Heal | PowerUpKind::Augment => None,
        }
    }
}

/// A pickup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PowerUpKind,
    /// Top-left corner
    pub pos: Vec2,
    pub alive: bool,
}

impl Pickup {
    /// Create a pickup centered on `center`
    pub fn new(id: EntityId, kind: PowerUpKind, center: Vec2) -> Self {
        Self {
            id,
            kind,
            pos: center - Vec2::splat(PICKUP_SIZE / 2.0),
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Vec2::splat(PICKUP_SIZE))
    }

    /// Fall one tick; leaving the bottom of the field removes it
    pub fn advance(&mut self) {
        self.pos.y += PICKUP_FALL_SPEED;
        if self.pos.y > FIELD_HEIGHT {
            self.alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_falls_and_expires() {
        let mut p = Pickup::new(1, PowerUpKind::Heal, Vec2::new(100.0, FIELD_HEIGHT + 12.0));
        p.advance();
        assert!(p.alive);
        p.advance();
        assert!(!p.alive);
    }

    #[test]
    fn test_roll_respects_weights() {
        let mut rng = Pcg32::seed_from_u64(42);
        let only_heal = [0, 0, 0, 0, 1, 0];
        for _ in 0..50 {
            assert_eq!(PowerUpKind::roll(&mut rng, &only_heal), PowerUpKind::Heal);
        }
    }

    #[test]
    fn test_roll_distribution_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let weights = [25, 15, 18, 21, 8, 13];
        let mut seen = [0u32; 6];
        for _ in 0..2000 {
            let kind = PowerUpKind::roll(&mut rng, &weights);
            let i = PowerUpKind::ALL.iter().position(|k| *k == kind).unwrap();
            seen[i] += 1;
        }
        assert!(seen.iter().all(|&n| n > 0));
        // Spread (25) should clearly outnumber Heal (8)
        assert!(seen[0] > seen[4]);
    }

    #[test]
    fn test_weapon_mapping() {
        assert_eq!(PowerUpKind::Laser.weapon(), Some(WeaponMode::Laser));
        assert_eq!(PowerUpKind::Augment.weapon(), None);
    }
}
