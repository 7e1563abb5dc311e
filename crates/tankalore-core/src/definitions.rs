//! Immutable combatant configuration records.
//!
//! Definitions are loaded once per combatant type and shared by reference
//! (`Arc`) across every instance. Nothing mutates them at runtime.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::CombatantKind;
use crate::types::interval_for_rate;

/// Static stats for one combatant type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatantDefinition {
    pub name: String,
    pub kind: CombatantKind,
    pub max_health: f32,
    /// Damage per projectile.
    pub damage: f32,
    pub movement_speed: f32,
    /// Patrolling combatants notice the target inside this range.
    pub detection_range: f32,
    /// Pursuers give up beyond this range.
    pub aggro_range: f32,
    /// Combatants stop and fire inside this range. Also the projectile range.
    pub attack_range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub xp_reward: u32,
    pub currency_reward: u32,
    /// Health fraction at or below which an attacking combatant retreats.
    pub retreat_health_fraction: f32,
}

impl Default for CombatantDefinition {
    fn default() -> Self {
        Self {
            name: "Enemy".into(),
            kind: CombatantKind::Basic,
            max_health: 50.0,
            damage: 15.0,
            movement_speed: 3.0,
            detection_range: 8.0,
            aggro_range: 10.0,
            attack_range: 6.0,
            fire_rate: 0.5,
            projectile_speed: 8.0,
            xp_reward: 10,
            currency_reward: 5,
            retreat_health_fraction: 0.2,
        }
    }
}

impl CombatantDefinition {
    /// Seconds between shots at the base fire rate.
    pub fn fire_interval(&self) -> f32 {
        interval_for_rate(self.fire_rate)
    }
}

/// Offensive scaling for one boss phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseProfile {
    /// Health fraction at or below which this phase begins. Ignored for the
    /// first phase.
    pub threshold: f32,
    pub damage_factor: f32,
    pub fire_rate_factor: f32,
    pub move_speed_factor: f32,
}

/// Heavy strike used as the final-phase special.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeavyAttack {
    /// Damage relative to the boss's current damage.
    pub damage_factor: f32,
    /// Blast radius around the strike point.
    pub radius: f32,
}

/// Boss-only tuning layered over a `CombatantDefinition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub special_cooldown_secs: f32,
    /// Projectiles per regular volley (one per fire point).
    pub fire_points: u32,
    /// Phase table, phase 1 first. Thresholds of later phases must be
    /// strictly decreasing.
    pub phases: Vec<PhaseProfile>,
    pub spread_count: u32,
    pub spread_damage_factor: f32,
    pub burst_shots: u32,
    pub burst_interval_secs: f32,
    /// Final-phase strike. Falls back to a spread when absent.
    pub heavy_attack: Option<HeavyAttack>,
    pub xp_multiplier: u32,
    pub currency_multiplier: u32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            special_cooldown_secs: BOSS_SPECIAL_COOLDOWN_SECS,
            fire_points: 2,
            phases: vec![
                PhaseProfile {
                    threshold: 1.0,
                    damage_factor: 1.0,
                    fire_rate_factor: 1.0,
                    move_speed_factor: 1.0,
                },
                PhaseProfile {
                    threshold: 0.66,
                    damage_factor: 1.2,
                    fire_rate_factor: 1.3,
                    move_speed_factor: 1.1,
                },
                PhaseProfile {
                    threshold: 0.33,
                    damage_factor: 1.5,
                    fire_rate_factor: 1.6,
                    move_speed_factor: 1.25,
                },
            ],
            spread_count: BOSS_SPREAD_COUNT,
            spread_damage_factor: BOSS_SPREAD_DAMAGE_FACTOR,
            burst_shots: BOSS_BURST_SHOTS,
            burst_interval_secs: BOSS_BURST_INTERVAL_SECS,
            heavy_attack: None,
            xp_multiplier: BOSS_XP_MULTIPLIER,
            currency_multiplier: BOSS_CURRENCY_MULTIPLIER,
        }
    }
}

impl BossTuning {
    /// Reject tables the phase logic cannot interpret.
    pub fn validate(&self) -> Result<(), String> {
        if self.phases.is_empty() {
            return Err("Boss tuning needs at least one phase".into());
        }
        let mut previous = f32::INFINITY;
        for (i, phase) in self.phases.iter().enumerate().skip(1) {
            if !(phase.threshold > 0.0 && phase.threshold <= 1.0) {
                return Err(format!(
                    "Phase {} threshold {} must lie in (0, 1]",
                    i + 1,
                    phase.threshold
                ));
            }
            if phase.threshold >= previous {
                return Err(format!(
                    "Phase {} threshold {} must be below the previous threshold {}",
                    i + 1,
                    phase.threshold,
                    previous
                ));
            }
            previous = phase.threshold;
        }
        if self.spread_count == 0 {
            return Err("Spread count must be at least 1".into());
        }
        Ok(())
    }

    pub fn phase_count(&self) -> u32 {
        self.phases.len().max(1) as u32
    }

    /// Phase ordinal (1-based) a given health fraction maps to.
    pub fn phase_for_fraction(&self, health_fraction: f32) -> u32 {
        let crossed = self
            .phases
            .iter()
            .skip(1)
            .take_while(|p| health_fraction <= p.threshold)
            .count();
        1 + crossed as u32
    }

    /// Scaling row for a phase ordinal, clamped to the table.
    pub fn profile(&self, phase: u32) -> PhaseProfile {
        let idx = (phase.max(1) - 1) as usize;
        self.phases
            .get(idx)
            .or_else(|| self.phases.last())
            .copied()
            .unwrap_or(PhaseProfile {
                threshold: 1.0,
                damage_factor: 1.0,
                fire_rate_factor: 1.0,
                move_speed_factor: 1.0,
            })
    }
}

/// A boss type: its base stats plus boss tuning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BossDefinition {
    pub combatant: CombatantDefinition,
    #[serde(default)]
    pub tuning: BossTuning,
}
