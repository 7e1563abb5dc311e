//! State shared between the runner's main thread and the game loop thread.

use std::sync::{Arc, Mutex};

use tankalore_core::commands::PlayerCommand;
use tankalore_core::state::GameStateSnapshot;

/// Commands sent to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Latest snapshot, updated by the game loop after every tick.
pub type SharedSnapshot = Arc<Mutex<Option<GameStateSnapshot>>>;

pub fn new_shared_snapshot() -> SharedSnapshot {
    Arc::new(Mutex::new(None))
}

/// How the loop paces and drives itself.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Stop after this many ticks.
    pub max_ticks: Option<u64>,
    /// Sleep between ticks to run at wall-clock speed.
    pub realtime: bool,
    /// Start a session as soon as the engine exists.
    pub autostart: bool,
    /// Let the built-in pilot play.
    pub autopilot: bool,
    /// Stop as soon as the session is over.
    pub stop_on_game_over: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_ticks: None,
            realtime: true,
            autostart: false,
            autopilot: false,
            stop_on_game_over: true,
        }
    }
}
