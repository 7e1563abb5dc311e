//! Upgrade selection and application.
//!
//! The engine is the only writer of the player's multiplier set. It owns
//! the session ledger (stacks per upgrade type plus the ordered history)
//! and publishes choices and applications to subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use log::{info, warn};
use rand::Rng;

use tankalore_core::constants::UPGRADES_PER_LEVEL_UP;
use tankalore_core::enums::{EffectMode, UpgradeType};
use tankalore_core::observer::{Listeners, SubscriptionId};
use tankalore_core::stats::PlayerStats;

use crate::catalog::{UpgradeCatalog, UpgradeEntry};

/// Notifications published by the upgrade engine.
#[derive(Debug, Clone)]
pub enum UpgradeEvent {
    ChoicesReady(Vec<Arc<UpgradeEntry>>),
    Applied { entry: Arc<UpgradeEntry>, stacks: u32 },
}

/// Index picked by a cumulative-weight walk: the first entry whose running
/// sum reaches `draw`. Falls back to the last index when rounding pushes the
/// draw past the end.
pub fn weighted_index(weights: &[f32], draw: f32) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w.max(0.0);
        if *w > 0.0 && draw <= cumulative {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Pick one entry from `pool` by rarity weight.
pub fn select_weighted<R: Rng + ?Sized>(pool: &[Arc<UpgradeEntry>], rng: &mut R) -> Option<usize> {
    let weights: Vec<f32> = pool.iter().map(|e| e.rarity.weight()).collect();
    let total: f32 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }
    let draw = rng.gen_range(0.0..total);
    weighted_index(&weights, draw)
}

pub struct UpgradeEngine {
    catalog: UpgradeCatalog,
    choices_per_level: usize,
    stacks: HashMap<UpgradeType, u32>,
    history: Vec<Arc<UpgradeEntry>>,
    pending: Vec<Arc<UpgradeEntry>>,
    listeners: Listeners<UpgradeEvent>,
}

impl UpgradeEngine {
    pub fn new(catalog: UpgradeCatalog) -> Self {
        Self {
            catalog,
            choices_per_level: UPGRADES_PER_LEVEL_UP,
            stacks: HashMap::new(),
            history: Vec::new(),
            pending: Vec::new(),
            listeners: Listeners::new(),
        }
    }

    pub fn with_choices_per_level(mut self, count: usize) -> Self {
        self.choices_per_level = count;
        self
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&UpgradeEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Stacks of `upgrade_type` applied this session.
    pub fn stacks(&self, upgrade_type: UpgradeType) -> u32 {
        self.stacks.get(&upgrade_type).copied().unwrap_or(0)
    }

    /// Every upgrade applied this session, in order.
    pub fn history(&self) -> &[Arc<UpgradeEntry>] {
        &self.history
    }

    /// Choices offered by the last level-up and not yet resolved.
    pub fn pending_choices(&self) -> &[Arc<UpgradeEntry>] {
        &self.pending
    }

    pub fn has_pending_choice(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Entries offerable at `level` given the current stacks.
    pub fn eligible(&self, level: u32) -> Vec<Arc<UpgradeEntry>> {
        self.catalog
            .entries()
            .iter()
            .filter(|e| e.level_requirement <= level)
            .filter(|e| self.stacks(e.upgrade_type) < e.stack_limit())
            .cloned()
            .collect()
    }

    /// Draw up to `count` eligible entries by rarity weight.
    ///
    /// A drawn entry stays in the pool, and may be offered again, unless it
    /// is non-stackable or its ledger count has reached `max_stacks - 1`.
    /// An exhausted pool yields fewer choices.
    pub fn generate_choices<R: Rng + ?Sized>(
        &self,
        level: u32,
        count: usize,
        rng: &mut R,
    ) -> Vec<Arc<UpgradeEntry>> {
        let mut pool = self.eligible(level);
        if pool.is_empty() {
            warn!("No eligible upgrades at level {}", level);
            return Vec::new();
        }
        let mut choices = Vec::with_capacity(count.min(pool.len()));
        while choices.len() < count {
            let Some(idx) = select_weighted(&pool, rng) else {
                break;
            };
            let entry = pool[idx].clone();
            if !entry.stackable
                || self.stacks(entry.upgrade_type) >= entry.max_stacks.saturating_sub(1)
            {
                pool.swap_remove(idx);
            }
            choices.push(entry);
        }
        choices
    }

    /// React to a level-up: offer choices and hold them until one is chosen.
    /// Returns the number of choices offered.
    pub fn handle_level_up<R: Rng + ?Sized>(&mut self, level: u32, rng: &mut R) -> usize {
        let choices = self.generate_choices(level, self.choices_per_level, rng);
        self.pending = choices.clone();
        let offered = choices.len();
        self.listeners.emit(&UpgradeEvent::ChoicesReady(choices));
        offered
    }

    /// Resolve the pending offer by index.
    pub fn choose(
        &mut self,
        index: usize,
        player: &mut dyn PlayerStats,
    ) -> Result<Arc<UpgradeEntry>, String> {
        let Some(entry) = self.pending.get(index).cloned() else {
            return Err(format!(
                "No upgrade choice at index {} ({} offered)",
                index,
                self.pending.len()
            ));
        };
        self.pending.clear();
        self.apply(&entry, player);
        Ok(entry)
    }

    /// Drop an unresolved offer.
    pub fn skip_choice(&mut self) {
        self.pending.clear();
    }

    /// Apply `entry` to the player and record it. Returns the new stack count.
    pub fn apply(&mut self, entry: &Arc<UpgradeEntry>, player: &mut dyn PlayerStats) -> u32 {
        let stacks = {
            let s = self.stacks.entry(entry.upgrade_type).or_insert(0);
            *s += 1;
            *s
        };
        self.history.push(entry.clone());

        let value = entry.effective_value(stacks);
        if let Some(stat) = entry.upgrade_type.stat() {
            let fraction = player.health_fraction();
            {
                let multiplier = player.upgradeable_stats().multipliers_mut().get_mut(stat);
                match entry.mode {
                    EffectMode::Multiplier => *multiplier *= value,
                    EffectMode::Additive => *multiplier += value,
                }
            }
            if entry.upgrade_type == UpgradeType::HealthBoost {
                let new_max = player.max_health();
                player.set_current_health(new_max * fraction);
            }
        }

        info!(
            "Applied upgrade {} (stack {}, value {:.3})",
            entry.name, stacks, value
        );
        self.listeners.emit(&UpgradeEvent::Applied {
            entry: entry.clone(),
            stacks,
        });
        stacks
    }

    /// Forget every session upgrade and restore all multipliers to 1.0.
    pub fn reset_session(&mut self, player: &mut dyn PlayerStats) {
        self.stacks.clear();
        self.history.clear();
        self.pending.clear();
        player.upgradeable_stats().reset_multipliers();
        let current = player.current_health();
        player.set_current_health(current);
    }
}
