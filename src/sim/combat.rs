//! Cross-collection combat pass
//!
//! Runs once per tick after everything has moved. The pass only flags
//! entities dead and reports what happened; awarding score, dropping pickups
//! and compacting collections happen afterwards in the tick, so every kill is
//! counted exactly once no matter how many shots overlapped it.
//!
//! Order:
//! 1. charge-shield interception of hostile shots (penetrating shots pass)
//! 2. player shots vs enemies, then the boss (bombs always explode)
//! 3. hostile shots and body contact vs the player
//! 4. explosions vs enemies

use glam::Vec2;

use super::collision::{projectile_hits, within_radius};
use super::explosion::Explosion;
use super::projectile::{EntityId, Projectile};
use super::state::GameState;
use crate::audio::SoundEffect;

/// How an enemy was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillCause {
    Weapon,
    Explosion,
    Lightning,
}

/// One destruction, reported exactly once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillReport {
    pub id: EntityId,
    pub center: Vec2,
    pub score: u64,
    pub cause: KillCause,
}

/// Everything the combat pass decided this tick
#[derive(Debug, Default)]
pub struct CombatOutcome {
    pub kills: Vec<KillReport>,
    pub boss_kill: Option<KillReport>,
    /// Damage hits that landed on the player
    pub player_hits: u32,
    /// Where shield deflections happened (cosmetic)
    pub deflections: Vec<Vec2>,
    /// Non-lethal impact points (cosmetic)
    pub sparks: Vec<Vec2>,
    pub sounds: Vec<SoundEffect>,
}

/// Apply `floor(damage)` single-point hits until one reports destruction.
/// The fractional remainder is dropped.
fn apply_damage(damage: f32, mut hit: impl FnMut() -> bool) -> bool {
    let points = damage.max(0.0).floor() as u32;
    for _ in 0..points {
        if hit() {
            return true;
        }
    }
    false
}

/// Player damage taken from a hostile shot: one hit's worth, scaled by the
/// shot's damage rating within [1, 2]
fn shot_damage(base: f32, shot: &Projectile) -> f32 {
    base * shot.damage.clamp(1.0, 2.0)
}

/// Resolve every collision for this tick
pub fn resolve(state: &mut GameState) -> CombatOutcome {
    let mut out = CombatOutcome::default();
    let mut new_explosions = Vec::new();

    let GameState {
        player,
        enemies,
        boss,
        player_shots,
        hostile_shots,
        explosions,
        tuning,
        ..
    } = state;

    // 1. Shield interception
    if let Some(shield) = player.shield() {
        let boss_shots = boss.iter_mut().flat_map(|b| b.shots.iter_mut());
        for shot in hostile_shots.iter_mut().chain(boss_shots) {
            if shot.alive
                && !shot.penetrating
                && within_radius(shot.pos, shield.center, shield.radius)
            {
                shot.alive = false;
                out.deflections.push(shot.pos);
            }
        }
    }

    // 2. Player shots vs enemies and boss
    for shot in player_shots.iter_mut() {
        if !shot.alive {
            continue;
        }

        for enemy in enemies.iter_mut() {
            if !enemy.alive || !projectile_hits(shot, &enemy.rect()) {
                continue;
            }
            let destroyed = apply_damage(shot.damage, || enemy.hit());
            if destroyed {
                out.kills.push(KillReport {
                    id: enemy.id,
                    center: enemy.center(),
                    score: enemy.score,
                    cause: KillCause::Weapon,
                });
            }
            if let Some(splash) = shot.splash {
                new_explosions.push(Explosion::new(enemy.center(), splash.radius, splash.damage));
                out.sounds.push(SoundEffect::Explosion);
            } else if destroyed {
                out.sounds.push(SoundEffect::Explosion);
            } else {
                out.sparks.push(shot.pos);
                out.sounds.push(SoundEffect::Hit);
            }
            if !shot.penetrating {
                shot.alive = false;
                break;
            }
        }

        if !shot.alive {
            continue;
        }
        if let Some(b) = boss.as_mut().filter(|b| b.alive)
            && projectile_hits(shot, &b.rect())
        {
            let destroyed = apply_damage(shot.damage, || b.hit());
            if destroyed {
                out.boss_kill = Some(KillReport {
                    id: b.id,
                    center: b.center(),
                    score: b.score,
                    cause: KillCause::Weapon,
                });
                out.sounds.push(SoundEffect::Explosion);
            } else {
                out.sparks.push(shot.pos);
                out.sounds.push(SoundEffect::Hit);
            }
            if let Some(splash) = shot.splash {
                new_explosions.push(Explosion::new(b.center(), splash.radius, splash.damage));
            }
            if !shot.penetrating {
                shot.alive = false;
            }
        }
    }

    // 3. Hostile shots and contact vs player
    let player_rect = player.rect();
    let mut landed = |damage: f32, out: &mut CombatOutcome| {
        if player.take_hit(damage) {
            out.player_hits += 1;
            out.sounds.push(SoundEffect::PlayerHit);
        }
    };

    let boss_shots = boss.iter_mut().flat_map(|b| b.shots.iter_mut());
    for shot in hostile_shots.iter_mut().chain(boss_shots) {
        if shot.alive && projectile_hits(shot, &player_rect) {
            shot.alive = false;
            // Hostile splash is cosmetic: no explosion near the player
            if shot.splash.is_some() {
                out.sparks.push(shot.pos);
            }
            landed(shot_damage(tuning.player_hit_damage, shot), &mut out);
        }
    }

    for enemy in enemies.iter_mut() {
        if enemy.alive && enemy.rect().overlaps(&player_rect) {
            landed(tuning.player_hit_damage, &mut out);
            // Rammed: destroyed without score
            enemy.destroy();
            out.sounds.push(SoundEffect::Explosion);
            out.sparks.push(enemy.center());
        }
    }

    if let Some(b) = boss.as_ref().filter(|b| b.alive)
        && b.rect().overlaps(&player_rect)
    {
        let damage = if b.charge.is_dashing() {
            b.charge.damage
        } else {
            tuning.player_hit_damage
        };
        landed(damage, &mut out);
    }

    // 4. Explosions vs enemies (this tick's new blasts start at radius 0)
    for explosion in explosions.iter_mut() {
        for enemy in enemies.iter_mut() {
            if !enemy.alive || !explosion.try_hit(enemy.id, enemy.center()) {
                continue;
            }
            if apply_damage(explosion.damage, || enemy.hit()) {
                out.kills.push(KillReport {
                    id: enemy.id,
                    center: enemy.center(),
                    score: enemy.score,
                    cause: KillCause::Explosion,
                });
                out.sounds.push(SoundEffect::Explosion);
            }
        }
    }

    for explosion in new_explosions {
        state.push_explosion(explosion);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyProfile};
    use crate::sim::projectile::{Faction, Hitbox, ProjectileKind};
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(7, Tuning::default()).unwrap()
    }

    /// Enemy with its center at (400, 200)
    fn enemy(state: &mut GameState, health: i32) -> EntityId {
        let id = state.next_entity_id();
        let mut e = Enemy::new(id, EnemyProfile::Bomber, 1, 375.0, false);
        e.pos = Vec2::new(375.0, 172.5);
        e.health = health;
        e.max_health = health;
        state.enemies.push(e);
        id
    }

    fn bolt_at(pos: Vec2, damage: f32) -> Projectile {
        Projectile::bolt(Faction::Player, pos, Vec2::new(0.0, -10.0), damage)
    }

    fn hostile_at(pos: Vec2) -> Projectile {
        Projectile::bolt(Faction::Enemy, pos, Vec2::new(0.0, 5.0), 1.0)
    }

    #[test]
    fn test_fractional_damage_is_truncated() {
        let mut s = state();
        enemy(&mut s, 2);
        s.player_shots.push(bolt_at(Vec2::new(400.0, 200.0), 2.5));
        let out = resolve(&mut s);
        assert_eq!(out.kills.len(), 1);
        assert_eq!(s.enemies[0].health, 0);

        // 1.9 truncates to a single point
        let mut s = state();
        enemy(&mut s, 2);
        s.player_shots.push(bolt_at(Vec2::new(400.0, 200.0), 1.9));
        let out = resolve(&mut s);
        assert!(out.kills.is_empty());
        assert_eq!(s.enemies[0].health, 1);
    }

    #[test]
    fn test_bomb_explodes_without_kill() {
        let mut s = state();
        enemy(&mut s, 100);
        let bomb = Projectile::new(
            Faction::Player,
            ProjectileKind::Bomb,
            Vec2::new(400.0, 200.0),
            Vec2::new(0.0, -10.0),
            1.0,
            Hitbox::Circle { r: 10.0 },
        )
        .with_splash(200.0, 2.5);
        s.player_shots.push(bomb);
        let out = resolve(&mut s);
        assert!(out.kills.is_empty());
        assert_eq!(s.explosions.len(), 1);
        assert_eq!(s.explosions[0].center, Vec2::new(400.0, 200.0));
        assert_eq!(s.enemies[0].health, 99);
    }

    #[test]
    fn test_non_penetrating_stops_at_first_hit() {
        let mut s = state();
        enemy(&mut s, 5);
        enemy(&mut s, 5);
        s.player_shots.push(bolt_at(Vec2::new(400.0, 200.0), 1.0));
        resolve(&mut s);
        assert!(!s.player_shots[0].alive);
        let damaged = s.enemies.iter().filter(|e| e.health < 5).count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn test_penetrating_hits_everything_and_survives() {
        let mut s = state();
        enemy(&mut s, 5);
        enemy(&mut s, 5);
        s.player_shots.push(bolt_at(Vec2::new(400.0, 200.0), 1.0).penetrating());
        resolve(&mut s);
        assert!(s.player_shots[0].alive);
        assert!(s.enemies.iter().all(|e| e.health == 4));
    }

    #[test]
    fn test_kill_reported_once_under_overlapping_shots() {
        let mut s = state();
        enemy(&mut s, 1);
        for _ in 0..6 {
            s.player_shots.push(bolt_at(Vec2::new(400.0, 200.0), 3.0).penetrating());
        }
        let out = resolve(&mut s);
        assert_eq!(out.kills.len(), 1);
    }

    #[test]
    fn test_shield_blocks_only_non_penetrating() {
        let mut s = state();
        for _ in 0..90 {
            s.player.trigger(false, true);
        }
        let shield = s.player.shield().unwrap();
        // Inside the shield and touching the nose of the hull
        let spot = shield.center + Vec2::new(0.0, 12.0);

        s.hostile_shots.push(hostile_at(spot));
        let out = resolve(&mut s);
        assert_eq!(out.deflections.len(), 1);
        assert_eq!(s.player.health, 100.0);

        s.hostile_shots.clear();
        s.hostile_shots.push(hostile_at(spot).penetrating());
        let out = resolve(&mut s);
        assert!(out.deflections.is_empty());
        assert_eq!(out.player_hits, 1);
        assert!(s.player.health < 100.0);
    }

    #[test]
    fn test_invulnerability_gates_player_damage() {
        let mut s = state();
        let center = s.player.center();
        s.hostile_shots.push(hostile_at(center));
        s.hostile_shots.push(hostile_at(center));
        let out = resolve(&mut s);
        assert_eq!(out.player_hits, 1);
        assert_eq!(s.player.health, 80.0);
        assert!(s.hostile_shots.iter().all(|b| !b.alive));
    }

    #[test]
    fn test_ramming_enemy_is_destroyed_without_score() {
        let mut s = state();
        let id = s.next_entity_id();
        let mut e = Enemy::new(id, EnemyProfile::Bomber, 1, 0.0, false);
        e.pos = s.player.pos;
        s.enemies.push(e);
        let out = resolve(&mut s);
        assert!(out.kills.is_empty());
        assert!(!s.enemies[0].alive);
        assert_eq!(out.player_hits, 1);
    }

    #[test]
    fn test_explosion_damages_each_enemy_once() {
        let mut s = state();
        enemy(&mut s, 10);
        s.explosions.push(Explosion::new(Vec2::new(400.0, 230.0), 200.0, 2.5));
        for _ in 0..20 {
            s.explosions.iter_mut().for_each(|e| e.advance());
            resolve(&mut s);
        }
        assert_eq!(s.enemies[0].health, 8);
    }

    #[test]
    fn test_boss_kill_reported() {
        let mut s = state();
        let id = s.next_entity_id();
        let mut boss = crate::sim::boss::Boss::new(id, 3, s.tuning.boss_weapon_weights);
        boss.pos = Vec2::new(310.0, 100.0);
        boss.health = 2;
        let center = boss.center();
        s.boss = Some(boss);
        s.player_shots.push(bolt_at(center, 2.0));
        s.player_shots.push(bolt_at(center, 2.0));
        let out = resolve(&mut s);
        assert!(out.boss_kill.is_some());
        assert!(out.kills.is_empty());
        // Second shot found a dead boss and flew on
        assert!(s.player_shots[1].alive);
    }
}
