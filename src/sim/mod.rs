//! Deterministic run simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod combat;
pub mod difficulty;
pub mod economy;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod status;
pub mod tick;

pub use state::{
    AttackPattern, BossSession, BurnState, Coin, Enemy, EnemyKind, Faction, GameEvent, PerkId,
    PerkOffer, Projectile, RunContext, RunPhase, RunState,
};
pub use tick::{Category, ContactEvent, TickInput, tick};
