//! Cleanup system: removes combatants whose death has already been reported.

use hecs::{Entity, World};

use tankalore_ai::boss::Boss;
use tankalore_ai::combatant::Combatant;
use tankalore_ai::enemy::Enemy;

/// Despawn dead combatants. Uses a caller-owned buffer to avoid per-tick
/// allocation. Returns the number removed.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) -> usize {
    despawn_buffer.clear();

    for (entity, enemy) in world.query_mut::<&Enemy>() {
        if enemy.is_dead() {
            despawn_buffer.push(entity);
        }
    }
    for (entity, boss) in world.query_mut::<&Boss>() {
        if boss.is_dead() {
            despawn_buffer.push(entity);
        }
    }

    let removed = despawn_buffer.len();
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    removed
}
