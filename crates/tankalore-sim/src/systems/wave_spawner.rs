//! Wave spawning system: asks the scheduler what is due and creates it.

use glam::Vec2;
use hecs::World;
use rand_chacha::ChaCha8Rng;

use tankalore_core::events::WaveEvent;

use crate::scheduler::WaveScheduler;
use crate::world_setup;

/// Spawn everything the scheduler releases this tick. Returns the number of
/// entities created.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    scheduler: &mut WaveScheduler,
    now: f32,
    target: Option<Vec2>,
    events: &mut Vec<WaveEvent>,
) -> usize {
    let requests = scheduler.update(now, target, rng, events);
    for request in &requests {
        world_setup::spawn_combatant(world, request);
    }
    requests.len()
}
