//! Tankalore headless runner.
//!
//! Wires the simulation, AI and progression crates into a threaded game loop
//! that a host (or the bundled CLI) drives through commands.

pub mod game_loop;
pub mod state;

pub use tankalore_core as core;
