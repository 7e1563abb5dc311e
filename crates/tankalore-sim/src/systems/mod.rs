//! ECS systems that operate on the arena world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! Anything that outlives a tick lives in components or in the engine.

pub mod cleanup;
pub mod combat_ai;
pub mod movement;
pub mod snapshot;
pub mod wave_spawner;
