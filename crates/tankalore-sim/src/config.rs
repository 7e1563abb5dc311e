//! Runtime configuration.
//!
//! Every record falls back to the tuning constants, so a JSON override file
//! only needs the fields it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use tankalore_core::stats::TankStats;
use tankalore_progression::xp::XpConfig;

use crate::scheduler::SpawnerConfig;
use crate::session::SessionConfig;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
        }
    }
}

/// Everything the engine can be tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub sim: SimConfig,
    pub spawner: SpawnerConfig,
    pub xp: XpConfig,
    pub session: SessionConfig,
    /// Base stats of the player's tank before permanent upgrades.
    pub tank: TankStats,
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse game config: {e}"))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read game config {}: {e}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize game config: {e}"))
    }
}
