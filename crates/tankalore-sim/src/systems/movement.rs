//! Kinematic integration: position += velocity * dt for every combatant.

use hecs::World;

use tankalore_ai::boss::Boss;
use tankalore_ai::combatant::Combatant;
use tankalore_ai::enemy::Enemy;

pub fn run(world: &mut World, dt: f32) {
    for (_entity, enemy) in world.query_mut::<&mut Enemy>() {
        let core = enemy.core_mut();
        core.position += core.velocity * dt;
    }
    for (_entity, boss) in world.query_mut::<&mut Boss>() {
        let core = boss.core_mut();
        core.position += core.velocity * dt;
    }
}
