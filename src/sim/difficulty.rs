//! Difficulty scaling
//!
//! Pure functions of the run counters. The global scale multiplies enemy
//! toughness and compresses spawn pacing; each factor has a floor so the
//! product never drops below 1.0 and never decreases as a run progresses.

use crate::consts::*;

/// Unified difficulty multiplier, always >= 1.0 and monotonically
/// non-decreasing in each argument.
pub fn global_scale(elapsed: f32, kills: u32, perks_taken: u32, bosses_defeated: u32) -> f32 {
    let time_factor = (elapsed.max(1.0) / 60.0).powf(0.35);
    let kill_factor = ((kills.max(1) as f32) / 30.0).powf(0.45);
    let perk_factor = 1.0 + 0.12 * perks_taken as f32;
    let boss_factor = 1.0 + 0.25 * bosses_defeated as f32;
    (time_factor * kill_factor * perk_factor * boss_factor).max(1.0)
}

/// Enemy hit points scaled by difficulty, floored at 2
pub fn scaled_hp(base_hp: i32, scale: f32) -> i32 {
    ((base_hp as f32 * scale).round() as i32).max(2)
}

/// Enemy traversal speed scaled by difficulty and run level
pub fn scaled_speed(base_speed: f32, scale: f32, level: u32) -> f32 {
    base_speed + scale * 20.0 + level as f32 * 2.0
}

/// Spawn interval compressed by difficulty. Compression is capped so
/// spawn density levels off while per-enemy toughness keeps climbing.
pub fn spawn_interval(base_interval: f32, scale: f32) -> f32 {
    (base_interval / scale.min(SPAWN_COMPRESSION_CAP)).max(SPAWN_INTERVAL_FLOOR)
}
