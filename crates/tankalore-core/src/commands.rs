//! Commands sent from the host to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

/// All possible host actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Session control ---
    /// Start a fresh session from the main menu or game over.
    StartSession,
    Pause,
    Resume,
    /// End the running session (counts as a manual stop).
    EndSession,
    /// Clear the arena and start over.
    Restart,

    // --- Player ---
    /// Report the player's current position.
    SetPlayerPosition { x: f32, y: f32 },
    /// Fire the player's cannon toward a world point.
    FireAt { x: f32, y: f32 },
    /// Hit the player (e.g. an enemy projectile landed).
    DamagePlayer { amount: f32 },

    // --- Combatants ---
    /// A player projectile hit a combatant.
    DamageCombatant { id: u32, amount: f32 },

    // --- Upgrades ---
    /// Pick one of the offered upgrade choices by index.
    ChooseUpgrade { index: usize },
}
