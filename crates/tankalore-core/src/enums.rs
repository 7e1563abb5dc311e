//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Rank-and-file combatant behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatantState {
    /// Wandering around the spawn point.
    #[default]
    Patrol,
    /// Closing on the target.
    Pursue,
    /// Holding position and firing.
    Attack,
    /// Backing away after taking heavy damage.
    Retreat,
    /// Terminal. No further behavior.
    Dead,
}

/// Boss behavior state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    /// Spawned but not yet engaged.
    #[default]
    Idle,
    /// Closing to attack range.
    Approach,
    /// Stationary regular fire.
    Attack,
    /// Winding up a phase-specific special attack.
    SpecialAttack,
    /// Backing away from the target.
    Retreat,
    /// Orbiting the target while firing.
    Circle,
    /// Terminal. No further behavior.
    Dead,
}

/// Rank-and-file archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    #[default]
    Basic,
    Fast,
    Heavy,
    Sniper,
    Explosive,
}

/// Tag attached to projectiles so collision can ignore the shooter's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerTag {
    Player,
    Enemy,
}

impl OwnerTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Enemy => "Enemy",
        }
    }
}

/// Spawn tier a combatant was drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnTier {
    #[default]
    Regular,
    Boss,
}

/// Cosmetic flash signal forwarded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashKind {
    /// Short white flash on taking damage.
    Hit,
    /// Red pulsing on a boss phase change.
    PhaseShift,
}

/// Player stat scaled by a multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Health,
    Armor,
    Firepower,
    Speed,
    FireRate,
    BulletSpeed,
    Range,
}

/// Effect tag on an upgrade catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeType {
    HealthBoost,
    ArmorBoost,
    FirepowerBoost,
    SpeedBoost,
    FireRateBoost,
    BulletSpeedBoost,
    RangeBoost,
    HealthRegen,
    CriticalChance,
    CriticalDamage,
    ExplosiveBullets,
    PiercingShots,
    DoubleShot,
    TripleShot,
}

impl UpgradeType {
    /// The multiplier this upgrade drives, if any. Types without one are
    /// tracked in the ledger only.
    pub fn stat(&self) -> Option<StatKind> {
        match self {
            Self::HealthBoost => Some(StatKind::Health),
            Self::ArmorBoost => Some(StatKind::Armor),
            Self::FirepowerBoost => Some(StatKind::Firepower),
            Self::SpeedBoost => Some(StatKind::Speed),
            Self::FireRateBoost => Some(StatKind::FireRate),
            Self::BulletSpeedBoost => Some(StatKind::BulletSpeed),
            Self::RangeBoost => Some(StatKind::Range),
            _ => None,
        }
    }
}

/// Upgrade rarity tier. Drives selection weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl UpgradeRarity {
    pub fn weight(&self) -> f32 {
        match self {
            Self::Common => RARITY_WEIGHT_COMMON,
            Self::Uncommon => RARITY_WEIGHT_UNCOMMON,
            Self::Rare => RARITY_WEIGHT_RARE,
            Self::Epic => RARITY_WEIGHT_EPIC,
            Self::Legendary => RARITY_WEIGHT_LEGENDARY,
        }
    }
}

/// How an upgrade's value combines with its multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectMode {
    /// Multiplier is scaled by the effective value (1.2 = +20%).
    #[default]
    Multiplier,
    /// Effective value is added to the multiplier.
    Additive,
}

/// Meta-progression purchases that persist across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermanentUpgradeType {
    BaseHealth,
    BaseArmor,
    BaseDamage,
    BaseFireRate,
    BaseSpeed,
    XpMultiplier,
    CurrencyMultiplier,
    StartingLevel,
    BulletPenetration,
    CriticalChance,
    HealthRegeneration,
}

impl PermanentUpgradeType {
    pub const ALL: [PermanentUpgradeType; 11] = [
        Self::BaseHealth,
        Self::BaseArmor,
        Self::BaseDamage,
        Self::BaseFireRate,
        Self::BaseSpeed,
        Self::XpMultiplier,
        Self::CurrencyMultiplier,
        Self::StartingLevel,
        Self::BulletPenetration,
        Self::CriticalChance,
        Self::HealthRegeneration,
    ];

    /// Key under which the level is persisted.
    pub fn key(&self) -> String {
        format!("PermanentUpgrade_{:?}", self)
    }
}

/// Top-level session phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    /// Simulation frozen until the player picks an upgrade.
    ChoosingUpgrade,
    Paused,
    GameOver,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    PlayerDeath,
    TimeUp,
    Manual,
}
