//! Arena simulation for Tankalore.
//!
//! Owns the hecs world of combatants, schedules waves, wires combat output
//! into XP, currency and upgrades, and produces `GameStateSnapshot`s for the
//! host.

pub mod config;
pub mod engine;
pub mod scheduler;
pub mod session;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use tankalore_core as core;
