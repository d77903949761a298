//! Headless run driver
//!
//! Plays one autopiloted run with a naive circle-overlap contact pass
//! standing in for the platform physics, then persists the results.
//! Useful for balance checks and as a reference embedding.

use std::fs;
use std::path::Path;

use dopamine_archer::consts::*;
use dopamine_archer::persistence::{KeyValueStore, MemoryStore, keys};
use dopamine_archer::sim::{
    Category, ContactEvent, Faction, GameEvent, RunPhase, RunState, TickInput, economy, tick,
};

const SAVE_PATH: &str = "dopamine_archer_save.json";

fn load_store(path: &Path) -> MemoryStore {
    match fs::read_to_string(path) {
        Ok(json) => MemoryStore::from_json(&json).unwrap_or_else(|err| {
            log::warn!("corrupt save, starting fresh: {err}");
            MemoryStore::new()
        }),
        Err(_) => MemoryStore::new(),
    }
}

fn save_store(path: &Path, store: &MemoryStore) {
    match store.to_json() {
        Ok(json) => {
            if let Err(err) = fs::write(path, json) {
                log::error!("failed to write save: {err}");
            }
        }
        Err(err) => log::error!("failed to serialize save: {err}"),
    }
}

/// Naive overlap detection over the kinematic mirror. The platform
/// physics normally does this; radii are generous to keep runs short.
fn detect_contacts(state: &RunState) -> Vec<ContactEvent> {
    let mut contacts = Vec::new();
    let player = state.player_pos();

    for projectile in &state.projectiles {
        match projectile.faction {
            Faction::Player => {
                for enemy in &state.enemies {
                    if projectile.pos.distance(enemy.pos) <= ENEMY_SIZE / 2.0 + 4.0 {
                        contacts.push(ContactEvent {
                            a: Category::Arrow,
                            a_id: projectile.id,
                            b: Category::Enemy,
                            b_id: enemy.id,
                            point: enemy.pos,
                        });
                        break;
                    }
                }
            }
            Faction::Boss => {
                if projectile.pos.distance(player) <= PLAYER_SIZE / 2.0 + 6.0 {
                    contacts.push(ContactEvent {
                        a: Category::BossShot,
                        a_id: projectile.id,
                        b: Category::Player,
                        b_id: 0,
                        point: player,
                    });
                }
            }
        }
    }

    for enemy in &state.enemies {
        if enemy.pos.distance(player) <= (PLAYER_SIZE + ENEMY_SIZE) / 2.0 {
            contacts.push(ContactEvent {
                a: Category::Player,
                a_id: 0,
                b: Category::Enemy,
                b_id: enemy.id,
                point: player,
            });
        }
    }

    contacts
}

/// Chase the nearest threat horizontally so arrows connect
fn autopilot_target(state: &RunState) -> Option<f32> {
    state
        .enemies
        .iter()
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|e| e.pos.x)
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD0FA);

    let save_path = Path::new(SAVE_PATH);
    let mut store = load_store(save_path);
    let mut state = RunState::new_with_meta(seed, &store);
    log::info!(
        "starting run, seed {seed}, best {} kills",
        store.get_int(keys::BEST_KILLS)
    );

    let max_ticks = (20.0 * 60.0 / SIM_DT) as usize;
    for _ in 0..max_ticks {
        let input = TickInput {
            target_x: autopilot_target(&state),
            choose: matches!(
                state.phase,
                RunPhase::PerkChoice | RunPhase::EnhancedPerkChoice
            )
            .then_some(0),
            toggle_settings: false,
            contacts: detect_contacts(&state),
        };
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::CoinCollected => economy::record_pickup(&mut store),
                GameEvent::BossSpawned { hp } => log::info!("boss up with {hp} hp"),
                GameEvent::PerkAccepted { perk } => log::debug!("took {perk:?}"),
                _ => {}
            }
        }

        if state.phase == RunPhase::GameOver {
            break;
        }
    }

    let kills = state.context.kills;
    if economy::commit_best_kills(kills, &mut store) {
        log::info!("new best: {kills} kills");
    }
    save_store(save_path, &store);

    println!(
        "run over: {} kills, level {}, {} coins this run, {:.1}s survived, {} bosses down",
        kills,
        state.context.level,
        state.context.coins,
        state.context.elapsed,
        state.context.bosses_defeated
    );
}
