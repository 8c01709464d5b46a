//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame, timers count frames)
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies; audio goes through a sink

pub mod boss;
pub mod collision;
pub mod combat;
pub mod difficulty;
pub mod enemy;
pub mod explosion;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod view;
pub mod weapons;

pub use boss::{Boss, BossPhase, BossWeapon, ChargeState};
pub use collision::Rect;
pub use combat::{CombatOutcome, KillCause, KillReport};
pub use difficulty::{Difficulty, Schedule, SpawnOrder};
pub use enemy::{Enemy, EnemyProfile, MovePattern};
pub use explosion::Explosion;
pub use pickup::{Pickup, PowerUpKind};
pub use player::Player;
pub use projectile::{EntityId, Faction, Projectile, ProjectileFlags, ProjectileKind};
pub use state::{GameEvent, GamePhase, GameState, Particle, ParticleKind};
pub use tick::{TickInput, tick};
pub use view::{Hud, Sprite, SpriteKind, hud, sprites};
pub use weapons::WeaponMode;
