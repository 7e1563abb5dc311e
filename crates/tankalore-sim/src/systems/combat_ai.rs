//! Combat AI system: ticks every combatant's state machine.
//!
//! The FSMs themselves live in tankalore-ai; this system only feeds them the
//! clock and the target and collects what they emit.

use glam::Vec2;
use hecs::World;
use rand_chacha::ChaCha8Rng;

use tankalore_ai::boss::Boss;
use tankalore_ai::combatant::Combatant;
use tankalore_ai::enemy::Enemy;
use tankalore_core::events::CombatEvent;

pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    dt: f32,
    now: f32,
    target: Option<Vec2>,
    events: &mut Vec<CombatEvent>,
) {
    for (_entity, enemy) in world.query_mut::<&mut Enemy>() {
        enemy.update(dt, now, target, rng, events);
    }
    for (_entity, boss) in world.query_mut::<&mut Boss>() {
        boss.update(dt, now, target, rng, events);
    }
}
