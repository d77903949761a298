//! Boss encounter state machine
//!
//! Lifecycle: trigger (clean-slate spawn) -> attack loop alternating a
//! radial burst and an aimed volley on a fixed cadence -> defeat reward.
//! While a session exists the regular spawn timer stays cancelled; it is
//! re-armed only once the post-defeat enhanced offer resolves.

use glam::Vec2;

use super::state::{
    AttackPattern, BossSession, Enemy, EnemyKind, Faction, GameEvent, Projectile, RunPhase,
    RunState,
};
use super::{economy, progression};
use crate::consts::*;
use crate::{angle_to_dir, direction_to};

/// Boss spawn position, centered near the top edge
fn spawn_pos() -> Vec2 {
    Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT - 120.0)
}

/// Hard-override boss trigger: clean-slate the arena, spawn the boss and
/// enter `BossFight`. Only one session may exist at a time.
pub fn trigger(state: &mut RunState) {
    if state.boss.is_some() {
        return;
    }

    // A boss fight is a clean-slate encounter
    state.enemies.clear();
    state.coins.clear();

    let hp = BOSS_BASE_HP + state.context.level as i32 * BOSS_HP_PER_LEVEL;
    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        kind: EnemyKind::Boss,
        pos: spawn_pos(),
        vel: Vec2::ZERO,
        hp,
        max_hp: hp,
        freeze_timer: 0.0,
        burn: None,
    });
    state.boss = Some(BossSession {
        enemy_id: id,
        max_hp: hp,
        hp,
        pattern: AttackPattern::RadialBurst,
        attack_timer: BOSS_RADIAL_WAIT,
    });

    state.phase = RunPhase::BossFight;
    state.spawn_timer = None;
    state.push_event(GameEvent::BossSpawned { hp });
    log::info!("boss spawned at {} kills with {} hp", state.context.kills, hp);
}

/// Advance the attack loop. Fires the current pattern when its timer
/// elapses, then flips the pattern and re-arms the cadence.
pub fn advance(state: &mut RunState, dt: f32) {
    let Some(session) = state.boss.as_mut() else {
        return;
    };
    session.attack_timer -= dt;
    if session.attack_timer > 0.0 {
        return;
    }

    let pattern = session.pattern;
    let enemy_id = session.enemy_id;
    let (next_pattern, wait) = match pattern {
        AttackPattern::RadialBurst => (AttackPattern::AimedVolley, BOSS_RADIAL_WAIT),
        AttackPattern::AimedVolley => (AttackPattern::RadialBurst, BOSS_AIMED_WAIT),
    };
    session.pattern = next_pattern;
    session.attack_timer = wait;

    let Some(origin) = state.enemy(enemy_id).map(|e| e.pos) else {
        return;
    };
    match pattern {
        AttackPattern::RadialBurst => fire_radial(state, origin),
        AttackPattern::AimedVolley => fire_aimed(state, origin),
    }
}

/// N hazards at equal angular spacing around the boss
fn fire_radial(state: &mut RunState, origin: Vec2) {
    for i in 0..BOSS_RADIAL_COUNT {
        let theta = std::f32::consts::TAU * (i as f32 / BOSS_RADIAL_COUNT as f32);
        push_shot(state, origin, angle_to_dir(theta));
    }
}

/// A fan of hazards centered on the angle toward the player
fn fire_aimed(state: &mut RunState, origin: Vec2) {
    let aim = direction_to(origin, state.player_pos());
    let center = aim.y.atan2(aim.x);
    let count = BOSS_AIMED_COUNT;
    for i in 0..count {
        let t = if count == 1 {
            0.0
        } else {
            i as f32 / (count - 1) as f32 - 0.5
        };
        push_shot(state, origin, angle_to_dir(center + BOSS_AIMED_SPREAD * t));
    }
}

fn push_shot(state: &mut RunState, origin: Vec2, dir: Vec2) {
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        faction: Faction::Boss,
        pos: origin,
        vel: dir * BOSS_PROJECTILE_SPEED,
        ttl: BOSS_PROJECTILE_TTL,
        ricochet_depth: 0,
    });
}

/// Defeat: stop the loop, award the coin bonus, and hand control to
/// progression for the enhanced offer. Spawning resumes only after the
/// offer resolves.
pub fn on_defeated(state: &mut RunState, pos: Vec2) {
    state.boss = None;
    state.context.kills += 1;
    state.context.bosses_defeated += 1;

    economy::on_kill(state, pos);
    economy::drop_coins(state, pos, BOSS_COIN_BONUS);

    state.push_event(GameEvent::BossDefeated);
    log::info!(
        "boss defeated ({} total), {} kills",
        state.context.bosses_defeated,
        state.context.kills
    );

    progression::open_enhanced_offer(state);
}
