//! Meta-progression: permanent upgrades bought with banked currency.
//!
//! State lives in an opaque key/value store so hosts can back it with
//! whatever persistence they have. Levels are stored under
//! `PermanentUpgrade_<Type>`.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use tankalore_core::constants::*;
use tankalore_core::enums::PermanentUpgradeType;
use tankalore_core::stats::TankStats;

use crate::wallet::Wallet;

pub const KEY_TOTAL_CURRENCY: &str = "TotalCurrency";
pub const KEY_BEST_SURVIVAL: &str = "BestSurvivalTime";
pub const KEY_GAMES_PLAYED: &str = "TotalGamesPlayed";
pub const KEY_HIGHEST_WAVE: &str = "HighestWave";

/// One stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Int(i64),
    Float(f64),
}

/// Opaque persistent key/value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<StoredValue>;

    fn set(&mut self, key: &str, value: StoredValue);

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            StoredValue::Int(v) => Some(v),
            StoredValue::Float(v) => Some(v as i64),
        }
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            StoredValue::Int(v) => Some(v as f64),
            StoredValue::Float(v) => Some(v),
        }
    }
}

/// In-memory store. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoredValue> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: StoredValue) {
        self.values.insert(key.to_string(), value);
    }
}

/// Cost of buying the next level when at `level`: `round(100 * 1.5^level)`.
pub fn upgrade_cost(level: u32) -> u64 {
    (PERMANENT_UPGRADE_BASE_COST as f64
        * (PERMANENT_UPGRADE_COST_MULTIPLIER as f64).powi(level as i32))
    .round() as u64
}

/// Fractional bonus at `level` (+10% per level).
pub fn upgrade_effect(level: u32) -> f32 {
    PERMANENT_UPGRADE_EFFECT_PER_LEVEL * level as f32
}

/// Typed view over a key/value store.
pub struct MetaProgress {
    store: Box<dyn KeyValueStore>,
}

impl Default for MetaProgress {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }
}

impl MetaProgress {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn level(&self, upgrade: PermanentUpgradeType) -> u32 {
        self.store
            .get_int(&upgrade.key())
            .map(|v| v.clamp(0, PERMANENT_UPGRADE_MAX_LEVEL as i64) as u32)
            .unwrap_or(0)
    }

    pub fn set_level(&mut self, upgrade: PermanentUpgradeType, level: u32) {
        let level = level.min(PERMANENT_UPGRADE_MAX_LEVEL);
        self.store.set(&upgrade.key(), StoredValue::Int(level as i64));
    }

    pub fn is_maxed(&self, upgrade: PermanentUpgradeType) -> bool {
        self.level(upgrade) >= PERMANENT_UPGRADE_MAX_LEVEL
    }

    /// Cost of the next level, or `None` when maxed.
    pub fn next_cost(&self, upgrade: PermanentUpgradeType) -> Option<u64> {
        if self.is_maxed(upgrade) {
            None
        } else {
            Some(upgrade_cost(self.level(upgrade)))
        }
    }

    pub fn bonus(&self, upgrade: PermanentUpgradeType) -> f32 {
        upgrade_effect(self.level(upgrade))
    }

    /// Buy one level with banked currency. Returns the price paid.
    pub fn purchase(
        &mut self,
        upgrade: PermanentUpgradeType,
        wallet: &mut Wallet,
    ) -> Result<u64, String> {
        let cost = self
            .next_cost(upgrade)
            .ok_or_else(|| format!("{:?} already at max level", upgrade))?;
        wallet.spend(cost)?;
        let level = self.level(upgrade) + 1;
        self.set_level(upgrade, level);
        self.save_currency(wallet);
        info!("Purchased {:?} level {} for {}", upgrade, level, cost);
        Ok(cost)
    }

    pub fn total_currency(&self) -> u64 {
        self.store
            .get_int(KEY_TOTAL_CURRENCY)
            .map(|v| v.max(0) as u64)
            .unwrap_or(0)
    }

    pub fn save_currency(&mut self, wallet: &Wallet) {
        self.store
            .set(KEY_TOTAL_CURRENCY, StoredValue::Int(wallet.total() as i64));
    }

    pub fn best_survival_secs(&self) -> f32 {
        self.store.get_float(KEY_BEST_SURVIVAL).unwrap_or(0.0) as f32
    }

    pub fn games_played(&self) -> u32 {
        self.store
            .get_int(KEY_GAMES_PLAYED)
            .map(|v| v.max(0) as u32)
            .unwrap_or(0)
    }

    pub fn highest_wave(&self) -> u32 {
        self.store
            .get_int(KEY_HIGHEST_WAVE)
            .map(|v| v.max(0) as u32)
            .unwrap_or(0)
    }

    /// Record a finished run. Returns `true` on a new best survival time.
    pub fn record_run(&mut self, survival_secs: f32, wave: u32) -> bool {
        let games = self.games_played() + 1;
        self.store.set(KEY_GAMES_PLAYED, StoredValue::Int(games as i64));
        if wave > self.highest_wave() {
            self.store.set(KEY_HIGHEST_WAVE, StoredValue::Int(wave as i64));
        }
        if survival_secs > self.best_survival_secs() {
            self.store
                .set(KEY_BEST_SURVIVAL, StoredValue::Float(survival_secs as f64));
            return true;
        }
        false
    }

    /// Fold base-stat permanents into a fresh tank's base stats.
    pub fn apply_to_tank(&self, stats: &mut TankStats) {
        stats.max_health *= 1.0 + self.bonus(PermanentUpgradeType::BaseHealth);
        stats.armor *= 1.0 + self.bonus(PermanentUpgradeType::BaseArmor);
        stats.firepower *= 1.0 + self.bonus(PermanentUpgradeType::BaseDamage);
        stats.fire_rate *= 1.0 + self.bonus(PermanentUpgradeType::BaseFireRate);
        stats.movement_speed *= 1.0 + self.bonus(PermanentUpgradeType::BaseSpeed);
    }

    pub fn xp_multiplier(&self) -> f32 {
        1.0 + self.bonus(PermanentUpgradeType::XpMultiplier)
    }

    pub fn currency_multiplier(&self) -> f32 {
        1.0 + self.bonus(PermanentUpgradeType::CurrencyMultiplier)
    }

    /// Level a session starts at.
    pub fn starting_level(&self) -> u32 {
        1 + self.level(PermanentUpgradeType::StartingLevel)
    }

    /// Copy every known key into a `MemoryStore` snapshot.
    pub fn export(&self) -> MemoryStore {
        let mut out = MemoryStore::new();
        let mut keys: Vec<String> = PermanentUpgradeType::ALL.iter().map(|u| u.key()).collect();
        keys.extend(
            [
                KEY_TOTAL_CURRENCY,
                KEY_BEST_SURVIVAL,
                KEY_GAMES_PLAYED,
                KEY_HIGHEST_WAVE,
            ]
            .iter()
            .map(|k| k.to_string()),
        );
        for key in keys {
            if let Some(v) = self.store.get(&key) {
                out.set(&key, v);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_curve() {
        assert_eq!(upgrade_cost(0), 100);
        assert_eq!(upgrade_cost(1), 150);
        assert_eq!(upgrade_cost(2), 225);
        assert_eq!(upgrade_cost(3), 338);
    }

    #[test]
    fn purchase_spends_and_levels() {
        let mut meta = MetaProgress::default();
        let mut wallet = Wallet::with_total(260);
        assert_eq!(meta.purchase(PermanentUpgradeType::BaseHealth, &mut wallet), Ok(100));
        assert_eq!(meta.purchase(PermanentUpgradeType::BaseHealth, &mut wallet), Ok(150));
        assert_eq!(meta.level(PermanentUpgradeType::BaseHealth), 2);
        assert_eq!(wallet.total(), 10);
        assert_eq!(meta.total_currency(), 10);
        assert!(meta.purchase(PermanentUpgradeType::BaseHealth, &mut wallet).is_err());
        assert_eq!(meta.level(PermanentUpgradeType::BaseHealth), 2);
    }

    #[test]
    fn maxed_upgrade_cannot_be_bought() {
        let mut meta = MetaProgress::default();
        meta.set_level(PermanentUpgradeType::BaseSpeed, 10);
        let mut wallet = Wallet::with_total(1_000_000);
        let err = meta
            .purchase(PermanentUpgradeType::BaseSpeed, &mut wallet)
            .unwrap_err();
        assert!(err.contains("max level"));
        assert_eq!(wallet.total(), 1_000_000);
    }

    #[test]
    fn base_stat_permanents_fold_into_tank() {
        let mut meta = MetaProgress::default();
        meta.set_level(PermanentUpgradeType::BaseHealth, 3);
        meta.set_level(PermanentUpgradeType::BaseDamage, 1);
        let mut stats = TankStats::default();
        meta.apply_to_tank(&mut stats);
        assert!((stats.max_health - 130.0).abs() < 1e-3);
        assert!((stats.firepower - 27.5).abs() < 1e-3);
        assert!(stats.multipliers.is_identity());
    }

    #[test]
    fn run_records_keep_the_best() {
        let mut meta = MetaProgress::default();
        assert!(meta.record_run(120.0, 4));
        assert!(!meta.record_run(60.0, 2));
        assert!(meta.record_run(200.5, 7));
        assert_eq!(meta.games_played(), 3);
        assert_eq!(meta.highest_wave(), 7);
        assert!((meta.best_survival_secs() - 200.5).abs() < 1e-3);
    }

    #[test]
    fn export_contains_known_keys() {
        let mut meta = MetaProgress::default();
        meta.set_level(PermanentUpgradeType::XpMultiplier, 2);
        meta.record_run(10.0, 1);
        let snapshot = meta.export();
        assert_eq!(snapshot.get_int("PermanentUpgrade_XpMultiplier"), Some(2));
        assert_eq!(snapshot.get_int(KEY_GAMES_PLAYED), Some(1));
        assert!((meta.xp_multiplier() - 1.2).abs() < 1e-5);
    }
}
