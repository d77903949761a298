//! Hit resolution pipeline
//!
//! Computes damage (with crit roll), applies it, and routes death events
//! exactly once: boss deaths to the encounter machine, regular deaths to
//! progression and the economy. Projectiles are single-use; a hit
//! referencing an already-removed entity is a silent no-op.

use glam::Vec2;
use rand::Rng;

use super::state::{Faction, GameEvent, RunState};
use super::{boss, economy, progression, status};

/// Result of one damage application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: i32,
    pub critical: bool,
    pub died: bool,
}

/// Roll a crit, compute damage (always at least 1, rounded up so
/// fractional multipliers never deal zero), and subtract it.
pub fn resolve_hit(
    attacker_damage: i32,
    crit_chance: f32,
    crit_multiplier: f32,
    target_hp: &mut i32,
    rng: &mut impl Rng,
) -> HitOutcome {
    let critical = rng.random::<f32>() < crit_chance;
    let raw = attacker_damage as f32 * if critical { crit_multiplier } else { 1.0 };
    let damage = (raw.ceil() as i32).max(1);
    *target_hp -= damage;
    HitOutcome { damage, critical, died: *target_hp <= 0 }
}

/// Resolve one arrow-vs-enemy contact event.
///
/// The projectile is consumed regardless of whether the target survives
/// or even still exists. Exactly one death event per enemy.
pub fn apply_projectile_hit(
    state: &mut RunState,
    projectile_id: u32,
    enemy_id: u32,
    point: Vec2,
) {
    // Consume the projectile first; a second contact for it is stale
    let Some(idx) = state.projectiles.iter().position(|p| p.id == projectile_id) else {
        return;
    };
    let projectile = state.projectiles.swap_remove(idx);
    if projectile.faction != Faction::Player {
        // Boss shots are hazards, not weapons against enemies
        return;
    }

    // Target may already be dead and removed
    if state.enemy(enemy_id).is_none() {
        return;
    }

    let (damage, chance, mult) = (
        state.context.base_damage,
        state.context.crit_chance,
        state.context.crit_multiplier,
    );
    let outcome = {
        let mut hp = state.enemy(enemy_id).map(|e| e.hp).unwrap_or(0);
        let outcome = resolve_hit(damage, chance, mult, &mut hp, &mut state.rng);
        if let Some(enemy) = state.enemy_mut(enemy_id) {
            enemy.hp = hp;
        }
        outcome
    };
    if let Some(session) = state.boss.as_mut() {
        if session.enemy_id == enemy_id {
            session.hp = (session.hp - outcome.damage).max(0);
        }
    }

    state.push_event(GameEvent::EnemyHit {
        enemy: enemy_id,
        damage: outcome.damage,
        critical: outcome.critical,
    });

    if !outcome.died {
        status::apply_on_hit(state, enemy_id);
    }
    if outcome.died {
        handle_death(state, enemy_id);
    }

    // Ricochet fires on fatal and non-fatal hits alike, and spawns a new
    // projectile rather than letting the original chain
    status::try_ricochet(state, point, enemy_id, projectile.ricochet_depth);
}

/// Remove a dead enemy and route its death exactly once
pub fn handle_death(state: &mut RunState, enemy_id: u32) {
    let Some(idx) = state.enemies.iter().position(|e| e.id == enemy_id) else {
        return;
    };
    let enemy = state.enemies.remove(idx);
    state.push_event(GameEvent::EnemyKilled { enemy: enemy.id, kind: enemy.kind });

    if enemy.is_boss() {
        boss::on_defeated(state, enemy.pos);
    } else {
        economy::on_kill(state, enemy.pos);
        progression::on_kill(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind, Projectile, RunPhase};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn push_enemy(state: &mut RunState, hp: i32) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind: EnemyKind::Light,
            pos: Vec2::new(200.0, 400.0),
            vel: Vec2::new(0.0, -120.0),
            hp,
            max_hp: hp,
            freeze_timer: 0.0,
            burn: None,
        });
        id
    }

    fn push_arrow(state: &mut RunState) -> u32 {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            faction: Faction::Player,
            pos: Vec2::new(200.0, 390.0),
            vel: Vec2::new(0.0, 900.0),
            ttl: 2.5,
            ricochet_depth: 0,
        });
        id
    }

    #[test]
    fn test_minimum_damage_is_one() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut hp = 5;
        let outcome = resolve_hit(1, 0.0, 2.0, &mut hp, &mut rng);
        assert_eq!(outcome.damage, 1);
        assert!(!outcome.critical);
        assert_eq!(hp, 4);
    }

    #[test]
    fn test_lethal_hit_on_one_hp_target() {
        // baseDamage=1, critChance=0, hp=1 -> damage 1, died
        let mut rng = Pcg32::seed_from_u64(1);
        let mut hp = 1;
        let outcome = resolve_hit(1, 0.0, 2.0, &mut hp, &mut rng);
        assert_eq!(outcome.damage, 1);
        assert!(outcome.died);
    }

    #[test]
    fn test_guaranteed_crit_rounds_up() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut hp = 10;
        let outcome = resolve_hit(1, 1.0, 2.5, &mut hp, &mut rng);
        assert!(outcome.critical);
        assert_eq!(outcome.damage, 3); // ceil(1 * 2.5)
    }

    #[test]
    fn test_projectile_consumed_on_hit() {
        let mut state = RunState::new(3);
        let enemy = push_enemy(&mut state, 10);
        let arrow = push_arrow(&mut state);
        apply_projectile_hit(&mut state, arrow, enemy, Vec2::new(200.0, 400.0));
        assert!(state.projectiles.is_empty());
        assert!(state.enemy(enemy).is_some());
        assert!(state.enemy(enemy).unwrap().hp < 10);
    }

    #[test]
    fn test_stale_hit_is_noop() {
        let mut state = RunState::new(3);
        let arrow = push_arrow(&mut state);
        // Enemy id that never existed
        apply_projectile_hit(&mut state, arrow, 999, Vec2::ZERO);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.context.kills, 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_death_counted_exactly_once() {
        let mut state = RunState::new(3);
        state.context.crit_chance = 0.0;
        let enemy = push_enemy(&mut state, 1);
        let a1 = push_arrow(&mut state);
        let a2 = push_arrow(&mut state);
        apply_projectile_hit(&mut state, a1, enemy, Vec2::ZERO);
        assert_eq!(state.context.kills, 1);
        let coins_after_first = state.coins.len();
        // Second arrow resolves against the removed enemy: silent no-op
        apply_projectile_hit(&mut state, a2, enemy, Vec2::ZERO);
        assert_eq!(state.context.kills, 1);
        assert_eq!(state.coins.len(), coins_after_first);
    }

    #[test]
    fn test_handle_death_twice_is_noop() {
        let mut state = RunState::new(3);
        let enemy = push_enemy(&mut state, 1);
        handle_death(&mut state, enemy);
        assert_eq!(state.context.kills, 1);
        handle_death(&mut state, enemy);
        assert_eq!(state.context.kills, 1);
    }

    #[test]
    fn test_fatal_hit_still_ricochets() {
        let mut state = RunState::new(3);
        state.context.crit_chance = 0.0;
        state.context.has_ricochet = true;
        let victim = push_enemy(&mut state, 1);
        let survivor = state.next_entity_id();
        state.enemies.push(Enemy {
            id: survivor,
            kind: EnemyKind::Heavy,
            pos: Vec2::new(300.0, 450.0),
            vel: Vec2::new(0.0, -90.0),
            hp: 7,
            max_hp: 7,
            freeze_timer: 0.0,
            burn: None,
        });
        let arrow = push_arrow(&mut state);

        apply_projectile_hit(&mut state, arrow, victim, Vec2::new(200.0, 400.0));

        // Target died and was removed, yet a bounce spawned at the survivor
        assert!(state.enemy(victim).is_none());
        assert_eq!(state.projectiles.len(), 1);
        let bounce = &state.projectiles[0];
        assert_eq!(bounce.ricochet_depth, 1);
        assert!(bounce.vel.x > 0.0);
        assert!(state.events.iter().any(|e| matches!(
            e,
            crate::sim::GameEvent::RicochetSpawned { to, .. } if *to == survivor
        )));
    }

    #[test]
    fn test_kill_stays_active_below_threshold() {
        let mut state = RunState::new(3);
        state.context.crit_chance = 0.0;
        let enemy = push_enemy(&mut state, 1);
        let arrow = push_arrow(&mut state);
        apply_projectile_hit(&mut state, arrow, enemy, Vec2::ZERO);
        assert_eq!(state.phase, RunPhase::Active);
    }
}
