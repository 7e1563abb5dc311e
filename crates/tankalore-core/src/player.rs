//! The player's tank as seen by the core: health, armor-mitigated damage
//! intake and rate-limited fire. Movement and input stay with the host.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::TANK_MIN_DAMAGE_FRACTION;
use crate::enums::OwnerTag;
use crate::events::ProjectileRequest;
use crate::stats::{PlayerStats, TankStats, UpgradeableStats};
use crate::types::interval_for_rate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub stats: TankStats,
    pub position: Vec2,
    /// Facing angle (degrees).
    pub facing_deg: f32,
    health: f32,
    next_fire_time: f32,
    dead: bool,
}

impl Tank {
    pub fn new(stats: TankStats) -> Self {
        let health = stats.effective_health();
        Self {
            stats,
            position: Vec2::ZERO,
            facing_deg: 0.0,
            health,
            next_fire_time: 0.0,
            dead: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Apply incoming damage after armor. At least a tenth of the raw damage
    /// always gets through. Returns `true` on the hit that kills the tank;
    /// later hits are ignored.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        let amount = amount.max(0.0);
        let mitigated = (amount - self.stats.effective_armor()).max(amount * TANK_MIN_DAMAGE_FRACTION);
        self.health = (self.health - mitigated).max(0.0);
        if self.health <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Fire toward `direction` if the fire-rate gate allows it.
    pub fn try_fire(&mut self, now: f32, direction: Vec2) -> Option<ProjectileRequest> {
        if self.dead || now < self.next_fire_time {
            return None;
        }
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        self.next_fire_time = now + interval_for_rate(self.stats.effective_fire_rate());
        Some(ProjectileRequest {
            origin: self.position,
            direction,
            damage: self.stats.effective_firepower(),
            speed: self.stats.effective_bullet_speed(),
            max_range: self.stats.effective_range(),
            owner: OwnerTag::Player,
        })
    }
}

impl PlayerStats for Tank {
    fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max > 0.0 {
            self.health / max
        } else {
            0.0
        }
    }

    fn max_health(&self) -> f32 {
        self.stats.effective_health()
    }

    fn current_health(&self) -> f32 {
        self.health
    }

    fn set_current_health(&mut self, value: f32) {
        self.health = value.clamp(0.0, self.max_health().max(0.0));
    }

    fn upgradeable_stats(&mut self) -> &mut dyn UpgradeableStats {
        &mut self.stats
    }
}
