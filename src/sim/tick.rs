//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Per tick:
//! special ability, player, player shots, scheduler, enemies and their shots,
//! boss, pickups, timers, the combat pass, kill bookkeeping, compaction and
//! finally the game-over check.

use glam::Vec2;
use rand::Rng;

use super::boss::{Boss, BossTarget};
use super::combat::{self, CombatOutcome, KillCause, KillReport};
use super::difficulty::SpawnOrder;
use super::enemy::{Enemy, EnemyProfile};
use super::projectile::HomingTarget;
use super::state::{
    GameEvent, GamePhase, GameState, LIGHTNING_FLASH_TICKS, LightningFlash, ParticleKind,
};
use crate::audio::{AudioManager, MusicTrack, SoundEffect};
use crate::consts::*;

/// Horizontal gap between enemies of one spawn group
const WAVE_SPACING: f32 = 80.0;
/// Burst sizes at full particle quality
const KILL_PARTICLES: usize = 20;
const BOSS_PARTICLES: usize = 60;
const SPARK_PARTICLES: usize = 5;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement; longer than 1 is clamped
    pub move_dir: Vec2,
    /// Fire button held
    pub firing: bool,
    /// Charge button held (release fires the charged volley)
    pub charging: bool,
    /// One-shot special ability trigger
    pub special: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
///
/// `now_ms` is the wall clock, used only for weapon pickup expiry.
pub fn tick(state: &mut GameState, input: &TickInput, audio: &mut AudioManager, now_ms: u64) {
    audio.begin_frame();
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.time_ticks += 1;
    audio.update();

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    // Special ability
    state.special_cooldown = state.special_cooldown.saturating_sub(1);
    let lightning_kills = if input.special && state.special_cooldown == 0 {
        strike_lightning(state, audio)
    } else {
        Vec::new()
    };

    // Player
    state.player.move_by(input.move_dir);
    let trigger = state.player.trigger(input.firing, input.charging);
    if trigger.fired {
        audio.play(SoundEffect::Shoot);
    }
    if trigger.charge_started {
        audio.play(SoundEffect::ChargeStart);
    }
    if trigger.charged_shot {
        audio.play(SoundEffect::ChargedShot);
    }
    state.push_player_shots(trigger.shots);

    let targets = homing_targets(state);
    for shot in &mut state.player_shots {
        shot.advance(&targets);
    }

    // Scheduler
    let schedule = state.difficulty.advance(state.boss_active());
    if schedule.raised {
        state.events.push(GameEvent::DifficultyUp {
            level: state.difficulty.level,
        });
    }
    match schedule.order {
        SpawnOrder::Nothing => {}
        SpawnOrder::Wave { count } => spawn_wave(state, count),
        SpawnOrder::Boss => spawn_boss(state, audio),
    }

    // Enemies hand their fresh shots to the shared hostile pool
    for enemy in &mut state.enemies {
        enemy.advance(&mut state.rng);
        if enemy.is_off_field() {
            enemy.alive = false;
        }
    }
    let fired: Vec<_> = state.enemies.iter_mut().flat_map(|e| e.take_shots()).collect();
    state.push_hostile_shots(fired);
    for shot in &mut state.hostile_shots {
        shot.advance(&[]);
    }

    // Boss
    let player_center = state.player.center();
    if let Some(boss) = state.boss.as_mut() {
        let target = BossTarget {
            center: player_center,
            max_health: state.player.max_health,
        };
        boss.advance(Some(target), &mut state.rng);
        boss.advance_shots(Some(player_center));
    }

    // Pickups
    let player_rect = state.player.rect();
    let level = state.difficulty.level;
    for pickup in &mut state.pickups {
        pickup.advance();
        if pickup.alive && pickup.rect().overlaps(&player_rect) {
            pickup.alive = false;
            state.player.collect(pickup.kind, level, now_ms);
            audio.play(SoundEffect::PowerUp);
        }
    }

    state.player.update_power_ups(now_ms);
    for explosion in &mut state.explosions {
        explosion.advance();
    }

    let outcome = combat::resolve(state);
    apply_outcome(state, outcome, lightning_kills, audio);

    state.prune();
    state.normalize_order();

    for particle in &mut state.particles {
        particle.advance();
    }
    if let Some(flash) = state.lightning.as_mut() {
        flash.ticks = flash.ticks.saturating_sub(1);
        if flash.ticks == 0 {
            state.lightning = None;
        }
    }

    if state.player.health <= 0.0 {
        state.phase = GamePhase::GameOver;
        audio.stop_music();
        audio.play(SoundEffect::GameOver);
        state.events.push(GameEvent::GameOver {
            score: state.score,
            kills: state.kills,
        });
        log::info!(
            "Game over at tick {}: score {}, kills {}",
            state.time_ticks,
            state.score,
            state.kills
        );
    }
}

/// Everything a homing player shot may chase
fn homing_targets(state: &GameState) -> Vec<HomingTarget> {
    let mut targets: Vec<HomingTarget> = state
        .enemies
        .iter()
        .filter(|e| e.alive)
        .map(|e| HomingTarget {
            id: e.id,
            center: e.center(),
        })
        .collect();
    if let Some(boss) = state.boss.as_ref().filter(|b| b.alive) {
        targets.push(HomingTarget {
            id: boss.id,
            center: boss.center(),
        });
    }
    targets
}

fn spawn_wave(state: &mut GameState, count: u32) {
    let level = state.difficulty.level;
    let mut spawned = 0;
    for i in 0..count {
        let profile = EnemyProfile::roll(&mut state.rng);
        let width = profile.stats().size.x;
        // Later members wrap back into the field instead of piling on the wall
        let lane = FIELD_WIDTH - width;
        let x = (state.rng.random::<f32>() * lane + i as f32 * WAVE_SPACING).rem_euclid(lane);
        let mirrored = state.difficulty.roll_trailing_spawn(&mut state.rng);
        let id = state.next_entity_id();
        if state.spawn_enemy(Enemy::new(id, profile, level, x, mirrored)) {
            spawned += 1;
        }
    }
    log::debug!("Wave of {} at difficulty {}", spawned, level);
}

fn spawn_boss(state: &mut GameState, audio: &mut AudioManager) {
    // The arena is cleared for the encounter
    for enemy in &mut state.enemies {
        enemy.destroy();
    }
    for shot in &mut state.hostile_shots {
        shot.alive = false;
    }

    let id = state.next_entity_id();
    let boss = Boss::new(id, state.difficulty.level, state.tuning.boss_weapon_weights);
    log::info!("Boss incoming (tier {}, {} hp)", boss.tier, boss.max_health);
    state.events.push(GameEvent::BossSpawned { tier: boss.tier });
    state.boss = Some(boss);
    audio.play(SoundEffect::BossWarning);
    audio.play_music(MusicTrack::Boss);
}

/// Destroy every regular enemy on screen for double score
fn strike_lightning(state: &mut GameState, audio: &mut AudioManager) -> Vec<KillReport> {
    let origin = Vec2::new(FIELD_WIDTH / 2.0, 0.0);
    let mut kills = Vec::new();
    let mut bolts = Vec::new();

    for enemy in state.enemies.iter_mut().filter(|e| e.alive) {
        enemy.destroy();
        kills.push(KillReport {
            id: enemy.id,
            center: enemy.center(),
            score: enemy.score * 2,
            cause: KillCause::Lightning,
        });
        bolts.push(jagged_bolt(&mut state.fx_rng, origin, enemy.center()));
    }

    for shot in &mut state.hostile_shots {
        shot.alive = false;
    }
    if let Some(boss) = state.boss.as_mut() {
        for shot in &mut boss.shots {
            shot.alive = false;
        }
    }

    state.special_cooldown = state.tuning.lightning_cooldown_ticks;
    state.lightning = Some(LightningFlash {
        ticks: LIGHTNING_FLASH_TICKS,
        bolts,
    });
    audio.play(SoundEffect::Lightning);
    log::debug!("Lightning struck {} enemies", kills.len());
    kills
}

/// Eight-segment polyline with lateral noise
fn jagged_bolt<R: Rng>(rng: &mut R, from: Vec2, to: Vec2) -> Vec<Vec2> {
    const SEGMENTS: usize = 8;
    const JITTER: f32 = 30.0;
    let mut points = Vec::with_capacity(SEGMENTS + 1);
    points.push(from);
    for i in 1..SEGMENTS {
        let t = i as f32 / SEGMENTS as f32;
        let noise = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5) * JITTER;
        points.push(from.lerp(to, t) + noise);
    }
    points.push(to);
    points
}

/// Apply the combat pass's verdicts: score, progression, drops, effects
fn apply_outcome(
    state: &mut GameState,
    outcome: CombatOutcome,
    lightning_kills: Vec<KillReport>,
    audio: &mut AudioManager,
) {
    for sound in &outcome.sounds {
        audio.play(*sound);
    }

    for report in lightning_kills.into_iter().chain(outcome.kills) {
        award_kill(state, report, audio);
    }

    if let Some(report) = outcome.boss_kill {
        let tier = state.boss.as_ref().map_or(0, |b| b.tier);
        state.score += report.score;
        state.events.push(GameEvent::BossDefeated {
            tier,
            score: report.score,
        });
        for i in 0..state.tuning.boss_drop_count {
            let at = report.center + Vec2::new(-50.0 + i as f32 * 25.0, 0.0);
            state.drop_random_pickup(at);
        }
        if state.difficulty.on_boss_defeated() {
            state.events.push(GameEvent::DifficultyUp {
                level: state.difficulty.level,
            });
        }
        state.emit_particles(report.center, BOSS_PARTICLES, ParticleKind::Ember);
        audio.play_music(MusicTrack::Battle);
        log::info!("Boss defeated (+{})", report.score);
    }

    for at in outcome.sparks {
        state.emit_particles(at, SPARK_PARTICLES, ParticleKind::Spark);
    }
    for at in outcome.deflections {
        state.emit_particles(at, SPARK_PARTICLES, ParticleKind::Deflect);
    }
    if outcome.player_hits > 0 {
        let center = state.player.center();
        state.emit_particles(center, KILL_PARTICLES, ParticleKind::Spark);
    }
}

fn award_kill(state: &mut GameState, report: KillReport, audio: &mut AudioManager) {
    state.score += report.score;
    state.kills += 1;
    state.events.push(GameEvent::EnemyDestroyed {
        id: report.id,
        score: report.score,
    });

    let levels = state.player.add_exp(state.tuning.exp_per_kill);
    if levels > 0 {
        audio.play(SoundEffect::LevelUp);
        state.events.push(GameEvent::LevelUp {
            level: state.player.level,
        });
    }
    if state.player.add_gauge(state.tuning.gauge_per_kill) {
        audio.play(SoundEffect::PowerUp);
        state.events.push(GameEvent::AugmentUp {
            level: state.player.augment,
        });
    }

    if report.cause == KillCause::Weapon && state.rng.random::<f32>() < state.tuning.drop_chance {
        state.drop_random_pickup(report.center);
    }
    state.emit_particles(report.center, KILL_PARTICLES, ParticleKind::Ember);
}

/// Demo pilot: dodge nearby shots, otherwise chase pickups and targets
fn autopilot(state: &GameState) -> TickInput {
    let me = state.player.center();
    let boss_shots = state.boss.iter().flat_map(|b| b.shots.iter());

    let threat = state
        .hostile_shots
        .iter()
        .chain(boss_shots)
        .filter(|s| s.alive && s.pos.y < me.y + 20.0 && s.pos.distance(me) < 120.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(me)
                .partial_cmp(&b.pos.distance_squared(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = if let Some(shot) = threat {
        if shot.pos.x < me.x {
            me.x + 80.0
        } else {
            me.x - 80.0
        }
    } else if let Some(pickup) = state.pickups.iter().min_by(|a, b| {
        a.pos
            .distance_squared(me)
            .partial_cmp(&b.pos.distance_squared(me))
            .unwrap_or(std::cmp::Ordering::Equal)
    }) {
        pickup.rect().center().x
    } else if let Some(boss) = state.boss.as_ref() {
        boss.center().x
    } else {
        // Lowest enemy is the most urgent
        state
            .enemies
            .iter()
            .max_by(|a, b| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map_or(FIELD_WIDTH / 2.0, |e| e.center().x)
    };

    let home_y = FIELD_HEIGHT - PLAYER_BOTTOM_MARGIN - PLAYER_HEIGHT / 2.0;
    let move_dir = Vec2::new(
        ((target_x - me.x) / 20.0).clamp(-1.0, 1.0),
        ((home_y - me.y) / 20.0).clamp(-1.0, 1.0),
    );

    TickInput {
        move_dir,
        firing: true,
        charging: false,
        special: state.enemies.len() >= 5 && state.special_cooldown == 0,
        autopilot: true,
    }
}
