//! Key-value persistence seam
//!
//! The simulation never touches the platform store directly. Embedders
//! inject a `KeyValueStore` (user defaults on mobile, a JSON file in the
//! desktop driver, an in-memory map in tests); the core only reads meta
//! upgrades at run start and writes the best-kills record at run end.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Well-known store keys, matching the historical save format
pub mod keys {
    pub const BEST_KILLS: &str = "BestKills";
    pub const TOTAL_COINS: &str = "TotalCoins";

    pub const UPGRADE_DAMAGE: &str = "UG_damage";
    pub const UPGRADE_FIRE: &str = "UG_fire";
    pub const UPGRADE_MAGNET: &str = "UG_magnet";

    pub const UPGRADE_DAMAGE_PRICE: &str = "UG_damage_price";
    pub const UPGRADE_FIRE_PRICE: &str = "UG_fire_price";
    pub const UPGRADE_MAGNET_PRICE: &str = "UG_magnet_price";
}

/// Integer key-value storage. Missing keys read as zero.
pub trait KeyValueStore {
    fn get_int(&self, key: &str) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
}

/// In-memory store, serializable for file-backed embedders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.get_int(keys::BEST_KILLS), 0);
    }

    #[test]
    fn test_set_then_get() {
        let mut store = MemoryStore::new();
        store.set_int(keys::TOTAL_COINS, 137);
        assert_eq!(store.get_int(keys::TOTAL_COINS), 137);
        store.set_int(keys::TOTAL_COINS, 140);
        assert_eq!(store.get_int(keys::TOTAL_COINS), 140);
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = MemoryStore::new();
        store.set_int(keys::BEST_KILLS, 42);
        store.set_int(keys::UPGRADE_DAMAGE, 3);
        let json = store.to_json().unwrap();
        let restored = MemoryStore::from_json(&json).unwrap();
        assert_eq!(restored.get_int(keys::BEST_KILLS), 42);
        assert_eq!(restored.get_int(keys::UPGRADE_DAMAGE), 3);
    }
}
