//! Progression for Tankalore.
//!
//! In-run progression (upgrade catalog, upgrade engine, XP, session
//! currency) and the meta-progression that persists between runs.

pub mod catalog;
pub mod meta;
pub mod save_load;
pub mod upgrade_engine;
pub mod wallet;
pub mod xp;

pub use tankalore_core as core;
