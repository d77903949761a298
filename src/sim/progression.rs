//! Kill-driven progression: perk thresholds, offers, and boss triggers
//!
//! Phase gating keeps triggers mutually exclusive: exactly one offer may
//! be pending, and no new perk or boss trigger fires outside `Active`.
//! The boss trigger is a hard override; a perk threshold met on the same
//! kill is deferred (the threshold stays put) rather than dropped.

use rand::seq::SliceRandom;

use super::state::{GameEvent, PerkId, PerkOffer, RunContext, RunPhase, RunState};
use super::{boss, spawn};
use crate::consts::*;

/// Kill count that opens the first perk offer
pub const FIRST_PERK_THRESHOLD: u32 = 8;

/// Threshold increments after each perk taken; the margin grows then
/// settles at the last step
const THRESHOLD_STEPS: [u32; 6] = [8, 10, 15, 20, 25, 30];

pub const BASIC_PERKS: [PerkId; 6] = [
    PerkId::FireRate,
    PerkId::ExtraArrow,
    PerkId::CritChance,
    PerkId::CritDamage,
    PerkId::Magnet,
    PerkId::Damage,
];

pub const ENHANCED_PERKS: [PerkId; 3] = [PerkId::Freeze, PerkId::Ricochet, PerkId::Burn];

/// Threshold increment applied after the Nth perk is taken
pub fn threshold_step(perks_taken: u32) -> u32 {
    let idx = (perks_taken as usize).min(THRESHOLD_STEPS.len() - 1);
    THRESHOLD_STEPS[idx]
}

/// One confirmed regular kill: bump the counter and evaluate triggers.
///
/// Boss trigger (every 50th kill) takes precedence over a simultaneously
/// met perk threshold; the perk offer is picked up on the next check.
pub fn on_kill(state: &mut RunState) {
    state.context.kills += 1;

    if state.phase != RunPhase::Active {
        return;
    }

    if state.context.kills % BOSS_KILL_INTERVAL == 0 {
        boss::trigger(state);
        return;
    }

    if state.context.kills >= state.context.next_perk_threshold {
        open_perk_offer(state);
    }
}

/// Draw a 3-option offer from the basic catalog without replacement and
/// advance the threshold sequence
pub fn open_perk_offer(state: &mut RunState) {
    if state.offer.is_some() || state.phase != RunPhase::Active {
        return;
    }

    let mut pool: Vec<PerkId> = BASIC_PERKS.to_vec();
    pool.shuffle(&mut state.rng);
    let choices = [pool[0], pool[1], pool[2]];

    state.context.perks_taken += 1;
    state.context.next_perk_threshold += threshold_step(state.context.perks_taken);

    state.offer = Some(PerkOffer { choices, enhanced: false });
    state.phase = RunPhase::PerkChoice;
    state.spawn_timer = None;
    state.push_event(GameEvent::PerkOffered { enhanced: false });
    log::debug!(
        "perk offer at {} kills, next threshold {}",
        state.context.kills,
        state.context.next_perk_threshold
    );
}

/// Boss-reward offer: every unowned enhanced perk, topped up from the
/// basic catalog to keep exactly 3 distinct options
pub fn open_enhanced_offer(state: &mut RunState) {
    if state.offer.is_some() {
        return;
    }

    let mut choices: Vec<PerkId> = ENHANCED_PERKS
        .iter()
        .copied()
        .filter(|perk| !owns_enhanced(&state.context, *perk))
        .collect();
    if choices.len() < 3 {
        let mut fill: Vec<PerkId> = BASIC_PERKS.to_vec();
        fill.shuffle(&mut state.rng);
        choices.extend(fill.into_iter().take(3 - choices.len()));
    }

    state.context.perks_taken += 1;
    state.offer = Some(PerkOffer {
        choices: [choices[0], choices[1], choices[2]],
        enhanced: true,
    });
    state.phase = RunPhase::EnhancedPerkChoice;
    state.push_event(GameEvent::PerkOffered { enhanced: true });
}

fn owns_enhanced(context: &RunContext, perk: PerkId) -> bool {
    match perk {
        PerkId::Freeze => context.has_freeze,
        PerkId::Ricochet => context.has_ricochet,
        PerkId::Burn => context.has_burn,
        _ => false,
    }
}

/// Resolve the pending offer with the player's pick (0..3).
///
/// An out-of-range index is ignored with no state change; the offer
/// stays pending.
pub fn accept(state: &mut RunState, choice: usize) {
    let Some(offer) = state.offer.as_ref() else {
        return;
    };
    let Some(&perk) = offer.choices.get(choice) else {
        return;
    };

    apply_perk(&mut state.context, perk);
    state.context.level += 1;
    state.offer = None;
    state.phase = RunPhase::Active;
    // Fire cadence may have improved; pick it up on the next volley
    state.fire_timer = state.fire_timer.min(state.context.fire_interval);
    spawn::arm_timer(state);
    state.push_event(GameEvent::PerkAccepted { perk });
    log::info!("perk accepted: {:?} (level {})", perk, state.context.level);
}

/// Apply one perk's fixed, clamped delta to the run tunables.
/// Enhanced perks flip their flag permanently; re-grants are no-ops.
pub fn apply_perk(context: &mut RunContext, perk: PerkId) {
    match perk {
        PerkId::FireRate => {
            context.fire_interval = (context.fire_interval - 0.15).max(FIRE_INTERVAL_FLOOR);
        }
        PerkId::ExtraArrow => {
            context.arrows_per_volley = (context.arrows_per_volley + 1).min(MAX_ARROWS_PER_VOLLEY);
        }
        PerkId::CritChance => {
            context.crit_chance = (context.crit_chance + 0.05).min(CRIT_CHANCE_CAP);
        }
        PerkId::CritDamage => {
            context.crit_multiplier = (context.crit_multiplier + 0.25).min(CRIT_MULTIPLIER_CAP);
        }
        PerkId::Magnet => {
            context.magnet_radius = (context.magnet_radius + 20.0).min(MAGNET_RADIUS_CAP);
        }
        PerkId::Damage => {
            context.base_damage += 1;
        }
        PerkId::Freeze => context.has_freeze = true,
        PerkId::Ricochet => context.has_ricochet = true,
        PerkId::Burn => context.has_burn = true,
    }
}
