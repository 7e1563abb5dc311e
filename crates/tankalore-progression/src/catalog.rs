use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tankalore_core::enums::{EffectMode, UpgradeRarity, UpgradeType};

/// One upgrade the player can be offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeEntry {
    pub name: String,
    pub description: String,
    pub upgrade_type: UpgradeType,
    pub mode: EffectMode,
    /// Multiplier (1.2 = +20%) or additive amount, per `mode`.
    pub value: f32,
    pub stackable: bool,
    pub max_stacks: u32,
    /// Each further stack is this fraction as effective as the last.
    pub stacking_efficiency: f32,
    pub level_requirement: u32,
    pub rarity: UpgradeRarity,
}

impl Default for UpgradeEntry {
    fn default() -> Self {
        Self {
            name: "Upgrade".into(),
            description: String::new(),
            upgrade_type: UpgradeType::HealthBoost,
            mode: EffectMode::Multiplier,
            value: 1.1,
            stackable: true,
            max_stacks: 5,
            stacking_efficiency: 0.8,
            level_requirement: 1,
            rarity: UpgradeRarity::Common,
        }
    }
}

impl UpgradeEntry {
    /// Effect of the `stack`-th application (1-based).
    ///
    /// Multipliers diminish toward 1.0: `1 + (value - 1) * eff^(stack - 1)`.
    /// Additive values shrink the same way: `value * eff^(stack - 1)`.
    pub fn effective_value(&self, stack: u32) -> f32 {
        let decay = self
            .stacking_efficiency
            .powi(stack.saturating_sub(1) as i32);
        match self.mode {
            EffectMode::Multiplier => 1.0 + (self.value - 1.0) * decay,
            EffectMode::Additive => self.value * decay,
        }
    }

    /// Stack ceiling: 1 for non-stackable entries.
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stacks
        } else {
            1
        }
    }
}

/// The full set of offerable upgrades, shared by reference.
#[derive(Debug, Clone, Default)]
pub struct UpgradeCatalog {
    entries: Vec<Arc<UpgradeEntry>>,
}

impl UpgradeCatalog {
    pub fn new(entries: Vec<UpgradeEntry>) -> Result<Self, String> {
        for entry in &entries {
            validate_entry(entry)?;
        }
        Ok(Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a JSON array of entries. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let entries: Vec<UpgradeEntry> =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse upgrade catalog: {e}"))?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[Arc<UpgradeEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Arc<UpgradeEntry>> {
        self.entries.iter().find(|e| e.name == name)
    }
}

fn validate_entry(entry: &UpgradeEntry) -> Result<(), String> {
    if !(entry.value.is_finite() && entry.value > 0.0) {
        return Err(format!("Upgrade '{}' has invalid value {}", entry.name, entry.value));
    }
    if !(entry.stacking_efficiency > 0.0 && entry.stacking_efficiency <= 1.0) {
        return Err(format!(
            "Upgrade '{}' stacking efficiency {} must lie in (0, 1]",
            entry.name, entry.stacking_efficiency
        ));
    }
    if entry.stackable && entry.max_stacks == 0 {
        return Err(format!("Upgrade '{}' is stackable with zero max stacks", entry.name));
    }
    Ok(())
}

fn entry(
    name: &str,
    description: &str,
    upgrade_type: UpgradeType,
    value: f32,
    rarity: UpgradeRarity,
    level_requirement: u32,
) -> UpgradeEntry {
    UpgradeEntry {
        name: name.into(),
        description: description.into(),
        upgrade_type,
        value,
        rarity,
        level_requirement,
        ..UpgradeEntry::default()
    }
}

fn unique(mut e: UpgradeEntry) -> UpgradeEntry {
    e.stackable = false;
    e.max_stacks = 1;
    e
}

/// Built-in catalog.
pub fn default_catalog() -> UpgradeCatalog {
    use UpgradeRarity::*;
    use UpgradeType::*;

    let entries = vec![
        entry("Reinforced Hull", "+20% max health", HealthBoost, 1.2, Common, 1),
        entry("Composite Plating", "+25% armor", ArmorBoost, 1.25, Common, 1),
        entry("Heavy Shells", "+20% firepower", FirepowerBoost, 1.2, Common, 1),
        entry("Tuned Engine", "+15% movement speed", SpeedBoost, 1.15, Common, 1),
        entry("Autoloader", "+20% fire rate", FireRateBoost, 1.2, Uncommon, 1),
        entry("Rifled Barrel", "+20% shell velocity", BulletSpeedBoost, 1.2, Uncommon, 2),
        entry("Rangefinder", "+15% range", RangeBoost, 1.15, Uncommon, 2),
        UpgradeEntry {
            mode: EffectMode::Additive,
            ..entry("Field Repairs", "Regenerate health over time", HealthRegen, 1.0, Rare, 3)
        },
        entry("Targeting Computer", "+10% critical chance", CriticalChance, 1.1, Rare, 3),
        entry("Lethal Precision", "+50% critical damage", CriticalDamage, 1.5, Rare, 4),
        unique(entry("Sabot Rounds", "Shells pierce one target", PiercingShots, 1.0, Epic, 5)),
        unique(entry("Twin Cannons", "Fire two shells per shot", DoubleShot, 1.0, Epic, 5)),
        unique(entry("Explosive Shells", "Shells explode on impact", ExplosiveBullets, 1.0, Epic, 8)),
        unique(entry("Triple Barrel", "Fire three shells per shot", TripleShot, 1.0, Legendary, 10)),
    ];
    UpgradeCatalog {
        entries: entries.into_iter().map(Arc::new).collect(),
    }
}
