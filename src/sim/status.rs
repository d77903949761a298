//! Status effects: freeze, burn, ricochet
//!
//! Freeze and burn are armed on hit once the matching enhanced perk is
//! owned; their timers advance only while the simulation runs, so a
//! paused world never leaks a stale tick. Burn ticks against a removed
//! target are silent no-ops.

use glam::Vec2;

use super::state::{BurnState, Faction, GameEvent, Projectile, RunState};
use super::combat;
use crate::consts::*;
use crate::direction_to;

/// Arm freeze/burn on a surviving target.
///
/// Re-application resets the freeze window and restarts the burn
/// schedule; neither stacks.
pub fn apply_on_hit(state: &mut RunState, enemy_id: u32) {
    let (has_freeze, has_burn) = (state.context.has_freeze, state.context.has_burn);
    if !has_freeze && !has_burn {
        return;
    }
    if let Some(enemy) = state.enemy_mut(enemy_id) {
        if has_freeze {
            enemy.freeze_timer = FREEZE_DURATION;
        }
        if has_burn {
            enemy.burn = Some(BurnState {
                ticks_left: BURN_TICKS,
                next_tick: BURN_TICK_INTERVAL,
            });
        }
    }
}

/// Spawn one extra projectile from the hit point at the nearest other
/// live regular enemy. Single bounce: a ricochet-spawned projectile
/// carries depth 1 and never re-triggers this.
pub fn try_ricochet(state: &mut RunState, point: Vec2, hit_enemy_id: u32, depth: u8) {
    if !state.context.has_ricochet || depth >= 1 {
        return;
    }

    let target = state
        .enemies
        .iter()
        .filter(|e| e.id != hit_enemy_id && !e.is_boss())
        .min_by(|a, b| {
            a.pos
                .distance_squared(point)
                .partial_cmp(&b.pos.distance_squared(point))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| (e.id, e.pos));
    let Some((target_id, target_pos)) = target else {
        return;
    };

    let dir = direction_to(point, target_pos);
    if dir == Vec2::ZERO {
        return;
    }

    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        faction: Faction::Player,
        pos: point,
        vel: dir * ARROW_SPEED,
        ttl: ARROW_LIFETIME,
        ricochet_depth: depth + 1,
    });
    state.push_event(GameEvent::RicochetSpawned { from: hit_enemy_id, to: target_id });
}

/// Advance freeze windows and burn schedules by `dt`
pub fn advance(state: &mut RunState, dt: f32) {
    for enemy in &mut state.enemies {
        if enemy.freeze_timer > 0.0 {
            enemy.freeze_timer = (enemy.freeze_timer - dt).max(0.0);
        }
    }

    let mut due: Vec<u32> = Vec::new();
    for enemy in &mut state.enemies {
        if let Some(burn) = enemy.burn.as_mut() {
            burn.next_tick -= dt;
            if burn.next_tick <= 0.0 {
                due.push(enemy.id);
            }
        }
    }

    for id in due {
        let burn_damage = (state.context.base_damage / 2).max(1);

        // Reschedule first; the target may have been removed since the
        // due list was built, which makes this tick a no-op
        let Some(enemy) = state.enemy_mut(id) else {
            continue;
        };
        if let Some(burn) = enemy.burn.as_mut() {
            burn.ticks_left = burn.ticks_left.saturating_sub(1);
            burn.next_tick += BURN_TICK_INTERVAL;
        }
        if enemy.burn.is_some_and(|b| b.ticks_left == 0) {
            enemy.burn = None;
        }

        let mut hp = enemy.hp;
        // Burn ticks never crit
        let outcome = combat::resolve_hit(burn_damage, 0.0, 1.0, &mut hp, &mut state.rng);
        if let Some(enemy) = state.enemy_mut(id) {
            enemy.hp = hp;
        }
        if let Some(session) = state.boss.as_mut() {
            if session.enemy_id == id {
                session.hp = (session.hp - outcome.damage).max(0);
            }
        }
        state.push_event(GameEvent::EnemyHit { enemy: id, damage: outcome.damage, critical: false });
        if outcome.died {
            combat::handle_death(state, id);
        }
    }
}
