//! Stat contracts shared by the player, combatants and the upgrade engine.
//!
//! Effective stats are always computed on read as `base * multiplier`;
//! nothing caches a derived value.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::StatKind;

/// Independent stat multipliers composed from applied upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierSet {
    pub health: f32,
    pub armor: f32,
    pub firepower: f32,
    pub speed: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub range: f32,
}

impl Default for MultiplierSet {
    fn default() -> Self {
        Self {
            health: 1.0,
            armor: 1.0,
            firepower: 1.0,
            speed: 1.0,
            fire_rate: 1.0,
            bullet_speed: 1.0,
            range: 1.0,
        }
    }
}

impl MultiplierSet {
    pub fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::Health => self.health,
            StatKind::Armor => self.armor,
            StatKind::Firepower => self.firepower,
            StatKind::Speed => self.speed,
            StatKind::FireRate => self.fire_rate,
            StatKind::BulletSpeed => self.bullet_speed,
            StatKind::Range => self.range,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut f32 {
        match stat {
            StatKind::Health => &mut self.health,
            StatKind::Armor => &mut self.armor,
            StatKind::Firepower => &mut self.firepower,
            StatKind::Speed => &mut self.speed,
            StatKind::FireRate => &mut self.fire_rate,
            StatKind::BulletSpeed => &mut self.bullet_speed,
            StatKind::Range => &mut self.range,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when every multiplier is exactly 1.0.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Health pool clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Current / max, 0 for an empty pool.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtract `amount` (negative amounts are ignored) and clamp at zero.
    pub fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }
}

/// Stats an upgrade engine may rescale.
pub trait UpgradeableStats {
    fn multipliers(&self) -> &MultiplierSet;

    fn multipliers_mut(&mut self) -> &mut MultiplierSet;

    /// Max health with the health multiplier applied.
    fn effective_max_health(&self) -> f32;

    fn reset_multipliers(&mut self) {
        self.multipliers_mut().reset();
    }
}

/// The player-side contract the upgrade engine reads and writes.
pub trait PlayerStats {
    /// Current / effective max health.
    fn health_fraction(&self) -> f32;

    fn max_health(&self) -> f32;

    fn current_health(&self) -> f32;

    /// Overwrite current health, clamped to `[0, max_health]`.
    fn set_current_health(&mut self, value: f32);

    fn heal(&mut self, amount: f32) {
        let value = self.current_health() + amount.max(0.0);
        self.set_current_health(value);
    }

    fn upgradeable_stats(&mut self) -> &mut dyn UpgradeableStats;
}

/// Base tank stats plus the session's multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankStats {
    pub name: String,
    pub max_health: f32,
    pub armor: f32,
    pub firepower: f32,
    pub movement_speed: f32,
    pub rotation_speed_deg: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub range: f32,
    pub multipliers: MultiplierSet,
}

impl Default for TankStats {
    fn default() -> Self {
        Self {
            name: "Tank".into(),
            max_health: TANK_MAX_HEALTH,
            armor: TANK_ARMOR,
            firepower: TANK_FIREPOWER,
            movement_speed: TANK_MOVEMENT_SPEED,
            rotation_speed_deg: TANK_ROTATION_SPEED_DEG,
            fire_rate: TANK_FIRE_RATE,
            bullet_speed: TANK_BULLET_SPEED,
            range: TANK_RANGE,
            multipliers: MultiplierSet::default(),
        }
    }
}

impl TankStats {
    pub fn effective_health(&self) -> f32 {
        self.max_health * self.multipliers.health
    }

    pub fn effective_armor(&self) -> f32 {
        self.armor * self.multipliers.armor
    }

    pub fn effective_firepower(&self) -> f32 {
        self.firepower * self.multipliers.firepower
    }

    pub fn effective_movement_speed(&self) -> f32 {
        self.movement_speed * self.multipliers.speed
    }

    pub fn effective_fire_rate(&self) -> f32 {
        self.fire_rate * self.multipliers.fire_rate
    }

    pub fn effective_bullet_speed(&self) -> f32 {
        self.bullet_speed * self.multipliers.bullet_speed
    }

    pub fn effective_range(&self) -> f32 {
        self.range * self.multipliers.range
    }
}

impl UpgradeableStats for TankStats {
    fn multipliers(&self) -> &MultiplierSet {
        &self.multipliers
    }

    fn multipliers_mut(&mut self) -> &mut MultiplierSet {
        &mut self.multipliers
    }

    fn effective_max_health(&self) -> f32 {
        self.effective_health()
    }
}
