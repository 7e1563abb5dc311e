//! Core types and definitions for the Tankalore arena simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! combatant definitions, stat contracts, events, commands, snapshots and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod constants;
pub mod definitions;
pub mod enums;
pub mod events;
pub mod observer;
pub mod player;
pub mod state;
pub mod stats;
pub mod types;
