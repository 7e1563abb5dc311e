//! Entity factories and lookups for the arena world.
//!
//! A combatant entity is `(CombatantId, Enemy)` or `(CombatantId, Boss)`.
//! Position, velocity and facing live inside the AI struct's core.

use hecs::{Entity, World};

use tankalore_ai::boss::Boss;
use tankalore_ai::combatant::{Combatant, DamageOutcome};
use tankalore_ai::enemy::Enemy;
use tankalore_core::events::CombatEvent;
use tankalore_core::types::CombatantId;

use crate::scheduler::{Prefab, SpawnRequest};

/// Turn a scheduler request into an entity.
pub fn spawn_combatant(world: &mut World, request: &SpawnRequest) -> Entity {
    match &request.prefab {
        Prefab::Regular(definition) => world.spawn((
            request.id,
            Enemy::new(request.id, definition.clone(), request.position),
        )),
        Prefab::Boss { combatant, tuning } => world.spawn((
            request.id,
            Boss::with_shared(
                request.id,
                combatant.clone(),
                tuning.clone(),
                request.position,
            ),
        )),
    }
}

pub fn find_entity(world: &World, id: CombatantId) -> Option<Entity> {
    world
        .query::<&CombatantId>()
        .iter()
        .find(|(_, cid)| **cid == id)
        .map(|(entity, _)| entity)
}

/// Run `f` against whichever AI flavour the entity carries.
pub fn with_combatant<T>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut dyn Combatant) -> T,
) -> Option<T> {
    if let Ok(mut enemy) = world.get::<&mut Enemy>(entity) {
        return Some(f(&mut *enemy));
    }
    if let Ok(mut boss) = world.get::<&mut Boss>(entity) {
        return Some(f(&mut *boss));
    }
    None
}

/// Apply damage to the combatant with `id`. Unknown ids are ignored.
pub fn damage_combatant(
    world: &mut World,
    id: CombatantId,
    amount: f32,
    events: &mut Vec<CombatEvent>,
) -> DamageOutcome {
    let Some(entity) = find_entity(world, id) else {
        return DamageOutcome::Ignored;
    };
    with_combatant(world, entity, |c| c.take_damage(amount, events)).unwrap_or(DamageOutcome::Ignored)
}

