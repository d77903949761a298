//! Dopamine Archer - an endless survive-and-shoot run simulation
//!
//! Core modules:
//! - `sim`: Deterministic run simulation (difficulty, spawning, combat,
//!   perks, boss encounters, economy)
//! - `persistence`: Key-value store seam for best score / lifetime coins
//! - `shop`: Permanent meta-progression consumed at run start
//!
//! Rendering, audio, input decoding and real physics are external
//! collaborators; the simulation consumes contact events and hands out
//! velocities and lifetimes.

pub mod persistence;
pub mod shop;
pub mod sim;

pub use persistence::{KeyValueStore, MemoryStore};
pub use sim::{ContactEvent, GameEvent, RunPhase, RunState, TickInput, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz frame callback)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena dimensions (origin bottom-left, y up)
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_HEIGHT: f32 = 700.0;
    /// Horizontal spawn inset from the arena edges
    pub const SPAWN_MARGIN: f32 = 8.0;
    /// Entities further than this outside the arena are expired
    pub const DESPAWN_MARGIN: f32 = 80.0;

    /// Player defaults - fixed height near the bottom edge
    pub const PLAYER_SIZE: f32 = 40.0;
    pub const PLAYER_Y: f32 = 60.0;
    pub const PLAYER_MOVE_SPEED: f32 = 600.0;

    /// Arrow defaults
    pub const ARROW_SPEED: f32 = 900.0;
    pub const ARROW_LIFETIME: f32 = 2.5;
    /// Total angular fan for multi-arrow volleys (radians)
    pub const VOLLEY_SPREAD: f32 = 0.6;
    pub const MAX_ARROWS_PER_VOLLEY: u32 = 6;

    /// Fire cadence
    pub const BASE_FIRE_INTERVAL: f32 = 0.9;
    pub const FIRE_INTERVAL_FLOOR: f32 = 0.3;

    /// Enemy spawn cadence
    pub const ENEMY_SIZE: f32 = 32.0;
    pub const BASE_SPAWN_INTERVAL: f32 = 1.2;
    pub const SPAWN_INTERVAL_FLOOR: f32 = 0.2;
    /// Spawn density caps out even as enemy toughness keeps rising
    pub const SPAWN_COMPRESSION_CAP: f32 = 3.0;

    /// Combat defaults
    pub const BASE_ARROW_DAMAGE: i32 = 1;
    pub const BASE_CRIT_CHANCE: f32 = 0.15;
    pub const CRIT_CHANCE_CAP: f32 = 0.6;
    pub const BASE_CRIT_MULTIPLIER: f32 = 2.0;
    pub const CRIT_MULTIPLIER_CAP: f32 = 4.0;

    /// Loot
    pub const BASE_MAGNET_RADIUS: f32 = 80.0;
    pub const MAGNET_RADIUS_CAP: f32 = 200.0;
    pub const BOSS_COIN_BONUS: u32 = 10;

    /// Status effects
    pub const FREEZE_DURATION: f32 = 0.6;
    pub const FREEZE_SPEED_FACTOR: f32 = 0.6;
    pub const BURN_TICKS: u32 = 3;
    pub const BURN_TICK_INTERVAL: f32 = 0.4;

    /// Boss encounter
    pub const BOSS_KILL_INTERVAL: u32 = 50;
    pub const BOSS_BASE_HP: i32 = 60;
    pub const BOSS_HP_PER_LEVEL: i32 = 10;
    pub const BOSS_RADIAL_COUNT: u32 = 12;
    pub const BOSS_AIMED_COUNT: u32 = 5;
    /// Angular spread of the aimed fan (radians)
    pub const BOSS_AIMED_SPREAD: f32 = 0.5;
    pub const BOSS_PROJECTILE_SPEED: f32 = 260.0;
    pub const BOSS_PROJECTILE_TTL: f32 = 4.0;
    /// Pause after a radial burst before the aimed volley
    pub const BOSS_RADIAL_WAIT: f32 = 1.2;
    /// Pause after an aimed volley before the next radial burst
    pub const BOSS_AIMED_WAIT: f32 = 2.2;
}

/// Normalized direction from one point toward another (zero if coincident)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Unit vector for an angle in radians
#[inline]
pub fn angle_to_dir(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
