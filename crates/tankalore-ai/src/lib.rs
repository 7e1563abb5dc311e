//! Combatant AI for Tankalore.
//!
//! Rank-and-file and boss behavior state machines, the timed sequences they
//! run (bursts, flashes) and the built-in combatant roster.

pub mod boss;
pub mod combatant;
pub mod enemy;
pub mod profiles;
pub mod sequences;

pub use tankalore_core as core;

#[cfg(test)]
mod tests;
