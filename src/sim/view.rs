//! Read-only render views
//!
//! Flat, serializable snapshots for whatever draws the game. Nothing here
//! mutates the state.

use glam::Vec2;
use serde::Serialize;

use super::boss::{BossPhase, ChargeState};
use super::enemy::EnemyProfile;
use super::pickup::PowerUpKind;
use super::projectile::{Faction, Projectile, ProjectileFlags, ProjectileKind};
use super::state::{GamePhase, GameState, ParticleKind};

/// What a sprite depicts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpriteKind {
    Player,
    Shield,
    /// `mirrored` craft entered from the bottom and are drawn nose-up
    Enemy {
        profile: EnemyProfile,
        mirrored: bool,
        /// Remaining health fraction for the health bar
        health: f32,
    },
    Boss { phase: BossPhase },
    Shot {
        faction: Faction,
        kind: ProjectileKind,
        flags: ProjectileFlags,
        /// Unit direction of travel
        heading: Vec2,
    },
    Pickup { kind: PowerUpKind },
    Explosion,
    Particle { kind: ParticleKind },
}

/// One drawable item. `pos` is the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sprite {
    pub kind: SpriteKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Opacity in [0, 1]
    pub alpha: f32,
    /// Damage flash or invulnerability blink
    pub flash: bool,
}

impl Sprite {
    fn new(kind: SpriteKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            pos,
            size,
            alpha: 1.0,
            flash: false,
        }
    }
}

fn shot_sprite(shot: &Projectile) -> Sprite {
    let bounds = shot.bounds();
    Sprite::new(
        SpriteKind::Shot {
            faction: shot.faction,
            kind: shot.kind,
            flags: shot.flags(),
            heading: shot.heading(),
        },
        bounds.center(),
        bounds.size,
    )
}

/// Everything visible this tick, back to front
pub fn sprites(state: &GameState) -> Vec<Sprite> {
    let mut out = Vec::with_capacity(
        state.enemies.len()
            + state.player_shots.len()
            + state.hostile_shots.len()
            + state.particles.len()
            + 8,
    );

    for pickup in state.pickups.iter().filter(|p| p.alive) {
        let rect = pickup.rect();
        out.push(Sprite::new(
            SpriteKind::Pickup { kind: pickup.kind },
            rect.center(),
            rect.size,
        ));
    }

    for enemy in state.enemies.iter().filter(|e| e.alive) {
        out.push(Sprite::new(
            SpriteKind::Enemy {
                profile: enemy.profile,
                mirrored: enemy.mirrored,
                health: enemy.health_fraction(),
            },
            enemy.center(),
            enemy.size,
        ));
    }

    if let Some(boss) = state.boss.as_ref().filter(|b| b.alive) {
        let mut sprite = Sprite::new(
            SpriteKind::Boss { phase: boss.phase },
            boss.center(),
            boss.size,
        );
        sprite.flash =
            boss.hit_flash > 0 || matches!(boss.charge.state, ChargeState::Charging { .. });
        out.push(sprite);
        out.extend(boss.shots.iter().filter(|s| s.alive).map(shot_sprite));
    }

    out.extend(state.hostile_shots.iter().filter(|s| s.alive).map(shot_sprite));
    out.extend(state.player_shots.iter().filter(|s| s.alive).map(shot_sprite));

    if state.phase == GamePhase::Playing {
        let player = &state.player;
        let mut sprite = Sprite::new(SpriteKind::Player, player.center(), player.size);
        // Blink every 5 ticks while invulnerable
        sprite.flash = player.is_invulnerable() && (player.invulnerable_ticks / 5) % 2 == 0;
        out.push(sprite);

        if let Some(shield) = player.shield() {
            let mut sprite = Sprite::new(
                SpriteKind::Shield,
                shield.center,
                Vec2::splat(shield.radius * 2.0),
            );
            sprite.alpha = 0.3 + 0.5 * player.charge_fraction();
            out.push(sprite);
        }
    }

    for explosion in &state.explosions {
        let mut sprite = Sprite::new(
            SpriteKind::Explosion,
            explosion.center,
            Vec2::splat(explosion.radius * 2.0),
        );
        sprite.alpha = explosion.alpha();
        out.push(sprite);
    }

    for particle in &state.particles {
        let mut sprite = Sprite::new(
            SpriteKind::Particle {
                kind: particle.kind,
            },
            particle.pos,
            Vec2::splat(particle.size),
        );
        sprite.alpha = particle.alpha();
        out.push(sprite);
    }

    out
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub kills: u32,
    pub health: f32,
    pub max_health: f32,
    pub weapon: &'static str,
    pub augment: u8,
    pub boosted: bool,
    pub level: u32,
    pub exp: u32,
    /// Augment gauge fill in [0, 1]
    pub gauge: f32,
    pub charge: f32,
    pub difficulty: u32,
    /// Frames until the special is ready (0 = ready)
    pub special_cooldown: u32,
    /// Boss health fraction, when a boss is on screen
    pub boss_health: Option<f32>,
    /// Bolt polylines of an active lightning strike
    pub lightning: Vec<Vec<Vec2>>,
    pub augment_banner: Option<u32>,
    pub level_banner: Option<u32>,
    pub game_over: bool,
}

/// Snapshot of the HUD
pub fn hud(state: &GameState) -> Hud {
    let player = &state.player;
    let gauge = if player.gauge_max > 0.0 {
        (player.gauge / player.gauge_max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Hud {
        score: state.score,
        kills: state.kills,
        health: player.health.max(0.0),
        max_health: player.max_health,
        weapon: player.weapon.as_str(),
        augment: player.augment,
        boosted: player.is_boosted(),
        level: player.level,
        exp: player.exp,
        gauge,
        charge: player.charge_fraction(),
        difficulty: state.difficulty.level,
        special_cooldown: state.special_cooldown,
        boss_health: state
            .boss
            .as_ref()
            .filter(|b| b.alive)
            .map(|b| b.health_fraction()),
        lightning: state
            .lightning
            .as_ref()
            .map(|l| l.bolts.clone())
            .unwrap_or_default(),
        augment_banner: player.augment_banner.as_ref().map(|b| b.value),
        level_banner: player.level_banner.as_ref().map(|b| b.value),
        game_over: state.is_over(),
    }
}
