//! Permanent meta-progression shop
//!
//! Levels and prices live in the injected key-value store; purchases are
//! made between runs out of the lifetime coin total, and the owned levels
//! are folded into the starting run tunables.

use crate::consts::*;
use crate::persistence::{KeyValueStore, keys};
use crate::sim::RunContext;

/// The three permanent upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeKind {
    Damage,
    FireRate,
    Magnet,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [
        UpgradeKind::Damage,
        UpgradeKind::FireRate,
        UpgradeKind::Magnet,
    ];

    fn level_key(self) -> &'static str {
        match self {
            UpgradeKind::Damage => keys::UPGRADE_DAMAGE,
            UpgradeKind::FireRate => keys::UPGRADE_FIRE,
            UpgradeKind::Magnet => keys::UPGRADE_MAGNET,
        }
    }

    fn price_key(self) -> &'static str {
        match self {
            UpgradeKind::Damage => keys::UPGRADE_DAMAGE_PRICE,
            UpgradeKind::FireRate => keys::UPGRADE_FIRE_PRICE,
            UpgradeKind::Magnet => keys::UPGRADE_MAGNET_PRICE,
        }
    }

    fn base_price(self) -> i64 {
        match self {
            UpgradeKind::Damage => 50,
            UpgradeKind::FireRate => 80,
            UpgradeKind::Magnet => 60,
        }
    }
}

/// Owned level of an upgrade
pub fn level(kind: UpgradeKind, store: &dyn KeyValueStore) -> i64 {
    store.get_int(kind.level_key())
}

/// Current price. Prices escalate by one base price per owned level; a
/// store without a recorded price falls back to the level formula.
pub fn cost(kind: UpgradeKind, store: &dyn KeyValueStore) -> i64 {
    let stored = store.get_int(kind.price_key());
    if stored > 0 {
        stored
    } else {
        kind.base_price() * (level(kind, store) + 1).max(1)
    }
}

/// Attempt a purchase from the lifetime coin total.
/// Returns whether the purchase went through.
pub fn buy(kind: UpgradeKind, store: &mut dyn KeyValueStore) -> bool {
    let price = cost(kind, store);
    let coins = store.get_int(keys::TOTAL_COINS);
    if coins < price {
        return false;
    }

    store.set_int(keys::TOTAL_COINS, coins - price);
    store.set_int(kind.level_key(), level(kind, store) + 1);
    store.set_int(kind.price_key(), price + kind.base_price());
    log::info!("bought {:?} for {} coins", kind, price);
    true
}

/// Fold owned upgrade levels into a fresh run's tunables
pub fn apply_upgrades(context: &mut RunContext, store: &dyn KeyValueStore) {
    let damage = level(UpgradeKind::Damage, store);
    context.base_damage += damage as i32;

    let fire = level(UpgradeKind::FireRate, store);
    context.fire_interval =
        (context.fire_interval - 0.05 * fire as f32).max(FIRE_INTERVAL_FLOOR);

    let magnet = level(UpgradeKind::Magnet, store);
    context.magnet_radius =
        (context.magnet_radius + 20.0 * magnet as f32).min(MAGNET_RADIUS_CAP);
}
