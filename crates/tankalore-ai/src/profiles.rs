//! Built-in combatant roster.
//!
//! One definition per archetype plus the default boss. Hosts may load their
//! own definitions instead; these only fill in when none are supplied.

use tankalore_core::definitions::{BossDefinition, BossTuning, CombatantDefinition, HeavyAttack};
use tankalore_core::enums::CombatantKind;

/// Base definition for a rank-and-file archetype.
pub fn get_definition(kind: CombatantKind) -> CombatantDefinition {
    match kind {
        CombatantKind::Basic => CombatantDefinition {
            name: "Basic Enemy".into(),
            kind,
            ..CombatantDefinition::default()
        },
        CombatantKind::Fast => CombatantDefinition {
            name: "Fast Enemy".into(),
            kind,
            max_health: 30.0,
            damage: 10.0,
            movement_speed: 5.0,
            detection_range: 10.0,
            aggro_range: 12.0,
            attack_range: 4.0,
            fire_rate: 1.0,
            projectile_speed: 10.0,
            xp_reward: 12,
            currency_reward: 6,
            retreat_health_fraction: 0.3,
        },
        CombatantKind::Heavy => CombatantDefinition {
            name: "Heavy Enemy".into(),
            kind,
            max_health: 150.0,
            damage: 30.0,
            movement_speed: 1.5,
            detection_range: 7.0,
            aggro_range: 9.0,
            attack_range: 7.0,
            fire_rate: 0.3,
            projectile_speed: 6.0,
            xp_reward: 25,
            currency_reward: 12,
            retreat_health_fraction: 0.0,
        },
        CombatantKind::Sniper => CombatantDefinition {
            name: "Sniper Enemy".into(),
            kind,
            max_health: 35.0,
            damage: 35.0,
            movement_speed: 2.0,
            detection_range: 14.0,
            aggro_range: 16.0,
            attack_range: 12.0,
            fire_rate: 0.25,
            projectile_speed: 14.0,
            xp_reward: 15,
            currency_reward: 8,
            retreat_health_fraction: 0.4,
        },
        CombatantKind::Explosive => CombatantDefinition {
            name: "Explosive Enemy".into(),
            kind,
            max_health: 40.0,
            damage: 40.0,
            movement_speed: 4.0,
            detection_range: 9.0,
            aggro_range: 11.0,
            attack_range: 2.5,
            fire_rate: 0.5,
            projectile_speed: 5.0,
            xp_reward: 18,
            currency_reward: 9,
            retreat_health_fraction: 0.0,
        },
    }
}

/// Regular spawn pool: every archetype once.
pub fn default_roster() -> Vec<CombatantDefinition> {
    [
        CombatantKind::Basic,
        CombatantKind::Fast,
        CombatantKind::Heavy,
        CombatantKind::Sniper,
        CombatantKind::Explosive,
    ]
    .into_iter()
    .map(get_definition)
    .collect()
}

/// The stock boss: a heavy hull with the three-phase table and a heavy
/// strike in its final phase.
pub fn default_boss() -> BossDefinition {
    BossDefinition {
        combatant: CombatantDefinition {
            name: "Siege Tank".into(),
            kind: CombatantKind::Heavy,
            max_health: 1000.0,
            damage: 20.0,
            movement_speed: 2.0,
            detection_range: 30.0,
            aggro_range: 40.0,
            attack_range: 8.0,
            fire_rate: 1.0,
            projectile_speed: 9.0,
            xp_reward: 50,
            currency_reward: 40,
            retreat_health_fraction: 0.0,
        },
        tuning: BossTuning {
            heavy_attack: Some(HeavyAttack {
                damage_factor: 2.5,
                radius: 3.0,
            }),
            ..BossTuning::default()
        },
    }
}
