//! Fixed timestep run driver
//!
//! Composes the schedulers, combat pipeline and economy into one
//! synchronous step. Every timer in the run advances only inside the
//! live-phase branch, so a suppressed or paused world is frozen as a
//! whole; there is no half-paused state to observe.

use glam::Vec2;

use super::state::{Faction, GameEvent, Projectile, RunPhase, RunState};
use super::{boss, combat, economy, progression, spawn, status};
use crate::angle_to_dir;
use crate::consts::*;

/// Physics category of one contact body, mirroring the collaborator's
/// category bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Player,
    Arrow,
    Enemy,
    BossShot,
}

impl Category {
    fn bit(self) -> u32 {
        match self {
            Category::Player => 1 << 0,
            Category::Arrow => 1 << 1,
            Category::Enemy => 1 << 2,
            Category::BossShot => 1 << 3,
        }
    }
}

/// A discrete contact reported by the external physics collaborator.
/// The core classifies by category pair and never inspects anything
/// engine-internal.
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub a: Category,
    pub a_id: u32,
    pub b: Category,
    pub b_id: u32,
    pub point: Vec2,
}

impl ContactEvent {
    /// Bodies ordered by category bit, lowest first
    fn ordered(&self) -> ((Category, u32), (Category, u32)) {
        if self.a.bit() < self.b.bit() {
            ((self.a, self.a_id), (self.b, self.b_id))
        } else {
            ((self.b, self.b_id), (self.a, self.a_id))
        }
    }
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target horizontal player position (from pointer/touch)
    pub target_x: Option<f32>,
    /// Resolve the pending perk offer with this choice index
    pub choose: Option<usize>,
    /// Toggle the settings overlay
    pub toggle_settings: bool,
    /// Contacts detected by the physics collaborator since last tick
    pub contacts: Vec<ContactEvent>,
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, input: &TickInput, dt: f32) {
    if input.toggle_settings {
        match state.phase {
            RunPhase::Active | RunPhase::BossFight => {
                state.phase = RunPhase::Settings;
            }
            RunPhase::Settings => {
                state.phase = if state.is_boss_active() {
                    RunPhase::BossFight
                } else {
                    RunPhase::Active
                };
            }
            _ => {}
        }
    }

    match state.phase {
        RunPhase::GameOver | RunPhase::Settings => return,
        RunPhase::PerkChoice | RunPhase::EnhancedPerkChoice => {
            if let Some(choice) = input.choose {
                progression::accept(state, choice);
            }
            return;
        }
        RunPhase::Active | RunPhase::BossFight => {}
    }

    state.context.elapsed += dt;

    // Player slides toward the pointer, clamped to the arena
    if let Some(target) = input.target_x {
        let half = PLAYER_SIZE / 2.0;
        let target = target.clamp(half, ARENA_WIDTH - half);
        let max_step = PLAYER_MOVE_SPEED * dt;
        let delta = (target - state.player_x).clamp(-max_step, max_step);
        state.player_x += delta;
    }

    // Auto-fire cadence
    state.fire_timer -= dt;
    if state.fire_timer <= 0.0 {
        fire_volley(state);
        state.fire_timer = state.context.fire_interval;
    }

    // Regular spawning runs only in Active; the countdown is re-armed
    // from the live difficulty after every spawn
    if state.phase == RunPhase::Active {
        if state.spawn_timer.is_none() {
            spawn::arm_timer(state);
        }
        if let Some(timer) = state.spawn_timer.as_mut() {
            *timer -= dt;
            if *timer <= 0.0 {
                spawn::spawn_enemy(state);
                spawn::arm_timer(state);
            }
        }
    }

    if state.phase == RunPhase::BossFight {
        boss::advance(state, dt);
    }

    status::advance(state, dt);
    integrate(state, dt);
    expire(state);

    // Route collaborator contacts through the combat pipeline; once the
    // run is over no further mutation may happen
    for contact in &input.contacts {
        if state.phase == RunPhase::GameOver {
            break;
        }
        route_contact(state, contact);
    }

    if state.phase != RunPhase::GameOver {
        economy::magnet_sweep(state);
    }

    state.normalize_order();
}

/// Fire one volley of arrows, fanned across a fixed spread
fn fire_volley(state: &mut RunState) {
    let count = state.context.arrows_per_volley.max(1);
    let spread = if count > 1 { VOLLEY_SPREAD } else { 0.0 };
    let origin = state.player_pos() + Vec2::new(0.0, 28.0);
    for i in 0..count {
        let t = if count == 1 {
            0.0
        } else {
            i as f32 / (count - 1) as f32 - 0.5
        };
        let theta = std::f32::consts::FRAC_PI_2 + spread * t;
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            faction: Faction::Player,
            pos: origin,
            vel: angle_to_dir(theta) * ARROW_SPEED,
            ttl: ARROW_LIFETIME,
            ricochet_depth: 0,
        });
    }
    state.push_event(GameEvent::VolleyFired { count });
}

/// Advance the kinematic mirror of every entity. The collaborator owns
/// presentation motion; these positions back targeting, magnet and
/// expiry decisions.
fn integrate(state: &mut RunState, dt: f32) {
    for enemy in &mut state.enemies {
        let factor = enemy.speed_factor();
        enemy.pos += enemy.vel * factor * dt;
    }
    for projectile in &mut state.projectiles {
        projectile.pos += projectile.vel * dt;
        projectile.ttl -= dt;
    }
    for coin in &mut state.coins {
        coin.pos += coin.vel * dt;
        // Scatter settles quickly
        coin.vel *= 0.85;
    }
}

/// Remove expired projectiles and enemies that left the arena.
/// Off-screen expiry is silent: no kill, no coins.
fn expire(state: &mut RunState) {
    state.projectiles.retain(|p| {
        p.ttl > 0.0
            && p.pos.y > -DESPAWN_MARGIN
            && p.pos.y < ARENA_HEIGHT + DESPAWN_MARGIN
            && p.pos.x > -DESPAWN_MARGIN
            && p.pos.x < ARENA_WIDTH + DESPAWN_MARGIN
    });
    state.enemies.retain(|e| e.pos.y > -DESPAWN_MARGIN);
}

/// Classify one contact by its ordered category pair. Unknown pairs and
/// references to already-removed entities are silent no-ops.
fn route_contact(state: &mut RunState, contact: &ContactEvent) {
    let ((first, first_id), (second, second_id)) = contact.ordered();
    match (first, second) {
        (Category::Arrow, Category::Enemy) => {
            combat::apply_projectile_hit(state, first_id, second_id, contact.point);
        }
        (Category::Player, Category::Enemy) => {
            if state.enemy(second_id).is_some() {
                on_player_death(state);
            }
        }
        (Category::Player, Category::BossShot) => {
            let Some(idx) = state
                .projectiles
                .iter()
                .position(|p| p.id == second_id && p.faction == Faction::Boss)
            else {
                return;
            };
            state.projectiles.swap_remove(idx);
            on_player_death(state);
        }
        _ => {}
    }
}

/// Terminal transition: cancel everything, emit the death event.
/// Persisting the best score is the embedder's hand-off.
fn on_player_death(state: &mut RunState) {
    state.phase = RunPhase::GameOver;
    state.spawn_timer = None;
    state.offer = None;
    state.push_event(GameEvent::PlayerDied { kills: state.context.kills });
    log::info!(
        "run over: {} kills, {} coins, level {}",
        state.context.kills,
        state.context.coins,
        state.context.level
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, EnemyKind};

    fn push_enemy(state: &mut RunState, hp: i32, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind: EnemyKind::Light,
            pos,
            vel: Vec2::new(0.0, -120.0),
            hp,
            max_hp: hp,
            freeze_timer: 0.0,
            burn: None,
        });
        id
    }

    fn push_arrow(state: &mut RunState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            faction: Faction::Player,
            pos,
            vel: Vec2::new(0.0, ARROW_SPEED),
            ttl: ARROW_LIFETIME,
            ricochet_depth: 0,
        });
        id
    }

    fn arrow_enemy_contact(arrow: u32, enemy: u32, point: Vec2) -> ContactEvent {
        ContactEvent {
            a: Category::Enemy,
            a_id: enemy,
            b: Category::Arrow,
            b_id: arrow,
            point,
        }
    }

    #[test]
    fn test_auto_fire_cadence() {
        let mut state = RunState::new(1);
        let input = TickInput::default();
        let mut t = 0.0;
        while t < BASE_FIRE_INTERVAL + SIM_DT {
            tick(&mut state, &input, SIM_DT);
            t += SIM_DT;
        }
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::VolleyFired { .. })));
        assert!(state.projectiles.iter().any(|p| p.faction == Faction::Player));
    }

    #[test]
    fn test_spawning_over_time() {
        let mut state = RunState::new(2);
        let input = TickInput::default();
        for _ in 0..(5.0 / SIM_DT) as usize {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_settings_freezes_world() {
        let mut state = RunState::new(3);
        let open = TickInput { toggle_settings: true, ..Default::default() };
        tick(&mut state, &open, SIM_DT);
        assert_eq!(state.phase, RunPhase::Settings);

        let elapsed = state.context.elapsed;
        let spawn_timer = state.spawn_timer;
        let fire_timer = state.fire_timer;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.context.elapsed, elapsed);
        assert_eq!(state.spawn_timer, spawn_timer);
        assert_eq!(state.fire_timer, fire_timer);

        tick(&mut state, &open, SIM_DT);
        assert_eq!(state.phase, RunPhase::Active);
    }

    #[test]
    fn test_settings_returns_to_boss_fight() {
        let mut state = RunState::new(3);
        crate::sim::boss::trigger(&mut state);
        let open = TickInput { toggle_settings: true, ..Default::default() };
        tick(&mut state, &open, SIM_DT);
        assert_eq!(state.phase, RunPhase::Settings);
        tick(&mut state, &open, SIM_DT);
        assert_eq!(state.phase, RunPhase::BossFight);
    }

    #[test]
    fn test_kill_through_contact_pipeline() {
        let mut state = RunState::new(4);
        state.context.crit_chance = 0.0;
        let enemy = push_enemy(&mut state, 1, Vec2::new(200.0, 400.0));
        let arrow = push_arrow(&mut state, Vec2::new(200.0, 395.0));
        let input = TickInput {
            contacts: vec![arrow_enemy_contact(arrow, enemy, Vec2::new(200.0, 400.0))],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.context.kills, 1);
        assert!(state.enemy(enemy).is_none());
        assert!(!state.coins.is_empty());
    }

    #[test]
    fn test_fiftieth_kill_triggers_boss_and_suppresses_spawns() {
        let mut state = RunState::new(5);
        state.context.crit_chance = 0.0;
        state.context.kills = 49;
        // Threshold far away so only the boss condition fires
        state.context.next_perk_threshold = 1000;
        let enemy = push_enemy(&mut state, 1, Vec2::new(200.0, 400.0));
        let arrow = push_arrow(&mut state, Vec2::new(200.0, 395.0));
        let input = TickInput {
            contacts: vec![arrow_enemy_contact(arrow, enemy, Vec2::new(200.0, 400.0))],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        assert_eq!(state.context.kills, 50);
        assert_eq!(state.phase, RunPhase::BossFight);
        assert!(state.is_boss_active());
        assert!(state.spawn_timer.is_none());

        // No regular enemy appears while the boss is up
        for _ in 0..(10.0 / SIM_DT) as usize {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.enemies.iter().filter(|e| !e.is_boss()).count(), 0);
    }

    #[test]
    fn test_perk_choice_freezes_and_resolves() {
        let mut state = RunState::new(6);
        state.context.crit_chance = 0.0;
        state.context.kills = state.context.next_perk_threshold - 1;
        let enemy = push_enemy(&mut state, 1, Vec2::new(200.0, 400.0));
        let arrow = push_arrow(&mut state, Vec2::new(200.0, 395.0));
        let input = TickInput {
            contacts: vec![arrow_enemy_contact(arrow, enemy, Vec2::new(200.0, 400.0))],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::PerkChoice);
        assert!(state.spawn_timer.is_none());

        // Frozen while the offer is pending
        let elapsed = state.context.elapsed;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.context.elapsed, elapsed);

        let choose = TickInput { choose: Some(0), ..Default::default() };
        tick(&mut state, &choose, SIM_DT);
        assert_eq!(state.phase, RunPhase::Active);
        assert_eq!(state.context.level, 2);
        assert!(state.spawn_timer.is_some());
    }

    #[test]
    fn test_player_enemy_contact_ends_run() {
        let mut state = RunState::new(7);
        let player_pos = state.player_pos();
        let enemy = push_enemy(&mut state, 5, player_pos);
        let input = TickInput {
            contacts: vec![ContactEvent {
                a: Category::Player,
                a_id: 0,
                b: Category::Enemy,
                b_id: enemy,
                point: state.player_pos(),
            }],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::GameOver);
        assert!(state.spawn_timer.is_none());
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::PlayerDied { .. })));

        // Terminal: nothing advances afterwards
        let kills = state.context.kills;
        let elapsed = state.context.elapsed;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.context.kills, kills);
        assert_eq!(state.context.elapsed, elapsed);
    }

    #[test]
    fn test_boss_shot_contact_ends_run() {
        let mut state = RunState::new(8);
        crate::sim::boss::trigger(&mut state);
        // Let the boss fire its first pattern
        for _ in 0..((BOSS_RADIAL_WAIT / SIM_DT) as usize + 2) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let shot = state
            .projectiles
            .iter()
            .find(|p| p.faction == Faction::Boss)
            .map(|p| p.id)
            .expect("boss should have fired");
        let input = TickInput {
            contacts: vec![ContactEvent {
                a: Category::BossShot,
                a_id: shot,
                b: Category::Player,
                b_id: 0,
                point: state.player_pos(),
            }],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::GameOver);
    }

    #[test]
    fn test_stale_contacts_are_noops() {
        let mut state = RunState::new(9);
        let input = TickInput {
            contacts: vec![
                arrow_enemy_contact(500, 501, Vec2::ZERO),
                ContactEvent {
                    a: Category::Player,
                    a_id: 0,
                    b: Category::Enemy,
                    b_id: 502,
                    point: Vec2::ZERO,
                },
                ContactEvent {
                    a: Category::Player,
                    a_id: 0,
                    b: Category::BossShot,
                    b_id: 503,
                    point: Vec2::ZERO,
                },
            ],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::Active);
        assert_eq!(state.context.kills, 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = RunState::new(99999);
        let mut b = RunState::new(99999);
        let inputs = [
            TickInput { target_x: Some(120.0), ..Default::default() },
            TickInput::default(),
            TickInput { target_x: Some(300.0), ..Default::default() },
        ];
        for _ in 0..600 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.context.kills, b.context.kills);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        assert_eq!(a.player_x, b.player_x);
        assert_eq!(
            serde_json::to_string(&a.context).unwrap(),
            serde_json::to_string(&b.context).unwrap()
        );
    }

    #[test]
    fn test_frozen_enemy_moves_slower() {
        let mut state = RunState::new(10);
        let normal = push_enemy(&mut state, 10, Vec2::new(100.0, 500.0));
        let frozen = push_enemy(&mut state, 10, Vec2::new(300.0, 500.0));
        state.enemy_mut(frozen).unwrap().freeze_timer = 1.0;

        let y_normal = state.enemy(normal).unwrap().pos.y;
        let y_frozen = state.enemy(frozen).unwrap().pos.y;
        tick(&mut state, &TickInput::default(), SIM_DT);
        let d_normal = y_normal - state.enemy(normal).unwrap().pos.y;
        let d_frozen = y_frozen - state.enemy(frozen).unwrap().pos.y;
        assert!(d_frozen < d_normal);
        assert!((d_frozen - d_normal * FREEZE_SPEED_FACTOR).abs() < 1e-3);
    }

    #[test]
    fn test_offscreen_enemy_expires_silently() {
        let mut state = RunState::new(11);
        let id = push_enemy(&mut state, 10, Vec2::new(200.0, -DESPAWN_MARGIN - 1.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.enemy(id).is_none());
        assert_eq!(state.context.kills, 0);
        assert!(state.coins.is_empty());
    }
}
