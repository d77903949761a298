//! Enemy spawn scheduling
//!
//! A recurring countdown re-armed after every spawn from the *current*
//! difficulty output, so pacing tracks the live run counters. The timer
//! is cancelled outright (not ignored) while the phase suppresses
//! spawning; `tick` re-arms it on resume.

use rand::Rng;

use super::state::{Enemy, EnemyKind, RunState};
use crate::consts::*;
use crate::sim::difficulty;
use glam::Vec2;

/// Static parameters for one regular enemy archetype
#[derive(Debug, Clone, Copy)]
pub struct EnemySpec {
    pub kind: EnemyKind,
    pub base_hp: i32,
    pub base_speed: f32,
    pub weight: f32,
}

/// Weighted spawn catalog
pub const ENEMY_CATALOG: [EnemySpec; 3] = [
    EnemySpec { kind: EnemyKind::Light, base_hp: 3, base_speed: 120.0, weight: 1.0 },
    EnemySpec { kind: EnemyKind::Heavy, base_hp: 7, base_speed: 90.0, weight: 0.55 },
    EnemySpec { kind: EnemyKind::Fast, base_hp: 2, base_speed: 170.0, weight: 0.6 },
];

/// Cumulative-weight roll in [0, total_weight)
pub fn pick_spec(rng: &mut impl Rng) -> &'static EnemySpec {
    let total: f32 = ENEMY_CATALOG.iter().map(|s| s.weight).sum();
    let mut roll = rng.random_range(0.0..total);
    for spec in &ENEMY_CATALOG {
        if roll < spec.weight {
            return spec;
        }
        roll -= spec.weight;
    }
    &ENEMY_CATALOG[0]
}

/// Spawn interval for the current difficulty
pub fn current_interval(state: &RunState) -> f32 {
    difficulty::spawn_interval(BASE_SPAWN_INTERVAL, state.context.global_scale())
}

/// Arm (or re-arm) the spawn countdown from the live difficulty
pub fn arm_timer(state: &mut RunState) {
    state.spawn_timer = Some(current_interval(state));
}

/// Instantiate one enemy at a random x along the top edge, parameterized
/// by the current difficulty. Returns its id.
///
/// The downward velocity is the motion contract handed to the physics
/// collaborator; the sim mirrors it for targeting and expiry decisions.
pub fn spawn_enemy(state: &mut RunState) -> u32 {
    let spec = pick_spec(&mut state.rng);
    let scale = state.context.global_scale();

    let half = ENEMY_SIZE / 2.0;
    let min_x = half + SPAWN_MARGIN;
    let max_x = ARENA_WIDTH - half - SPAWN_MARGIN;
    let x = state.rng.random_range(min_x..=max_x);

    let hp = difficulty::scaled_hp(spec.base_hp, scale);
    let speed = difficulty::scaled_speed(spec.base_speed, scale, state.context.level);

    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        kind: spec.kind,
        pos: Vec2::new(x, ARENA_HEIGHT + ENEMY_SIZE),
        vel: Vec2::new(0.0, -speed),
        hp,
        max_hp: hp,
        freeze_timer: 0.0,
        burn: None,
    });
    id
}
