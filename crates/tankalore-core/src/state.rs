//! Game state snapshot: the complete visible state handed to the host each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{AiState, GameEvent};
use crate::types::SimTime;

/// Complete game state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub wave: WaveView,
    pub combatants: Vec<CombatantView>,
    pub player: PlayerView,
    pub upgrade_choices: Vec<UpgradeChoiceView>,
    pub session: SessionView,
    pub events: Vec<GameEvent>,
}

/// Scheduler progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    pub wave_number: u32,
    pub spawned: u32,
    pub required: u32,
    pub alive: u32,
    pub in_progress: bool,
    pub boss_active: bool,
}

/// A living combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: u32,
    pub name: String,
    pub tier: SpawnTier,
    pub position: Vec2,
    pub facing_deg: f32,
    pub health_fraction: f32,
    pub state: AiState,
    /// Boss phase ordinal; 1 for rank-and-file.
    pub phase: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_required: u32,
    pub session_currency: u64,
    pub total_currency: u64,
    pub dead: bool,
}

/// One offered upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeChoiceView {
    pub name: String,
    pub description: String,
    pub upgrade_type: UpgradeType,
    pub rarity: UpgradeRarity,
    /// Stacks already applied this session.
    pub stacks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionView {
    pub elapsed_secs: f32,
    pub remaining_secs: f32,
    pub game_over_reason: Option<GameOverReason>,
    pub best_survival_secs: f32,
}
