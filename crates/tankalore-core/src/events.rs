//! Events emitted by combatants, the wave scheduler and the session for the
//! host (renderer, audio, UI) to consume.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::PROJECTILE_LIFETIME_EPSILON;
use crate::enums::*;
use crate::types::CombatantId;

/// A request to spawn a projectile. Collision must ignore bodies that
/// belong to `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileRequest {
    pub origin: Vec2,
    /// Unit travel direction.
    pub direction: Vec2,
    pub damage: f32,
    pub speed: f32,
    pub max_range: f32,
    pub owner: OwnerTag,
}

impl ProjectileRequest {
    /// Seconds before the projectile despawns: time to cover `max_range`
    /// plus a one-second margin.
    pub fn lifetime_secs(&self) -> f32 {
        if self.speed > 0.0 {
            self.max_range / self.speed + PROJECTILE_LIFETIME_EPSILON
        } else {
            PROJECTILE_LIFETIME_EPSILON
        }
    }
}

/// Reward-carrying death notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathNotice {
    pub id: CombatantId,
    pub tier: SpawnTier,
    pub xp_reward: u32,
    pub currency_reward: u32,
    pub position: Vec2,
}

/// Behavior state of either combatant flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Enemy(CombatantState),
    Boss(BossState),
}

/// Output of a combatant update or damage call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    ProjectileSpawned {
        source: CombatantId,
        request: ProjectileRequest,
    },
    /// Area strike centred on `center`.
    HeavyStrike {
        source: CombatantId,
        center: Vec2,
        damage: f32,
        radius: f32,
    },
    /// Renderer tint on (`on = true`) or off.
    Flash {
        source: CombatantId,
        kind: FlashKind,
        on: bool,
    },
    StateChanged {
        source: CombatantId,
        from: AiState,
        to: AiState,
    },
    PhaseChanged { source: CombatantId, phase: u32 },
    Died { notice: DeathNotice },
}

/// Scheduler notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveEvent {
    Started { wave: u32, required: u32 },
    Completed { wave: u32 },
    BossSpawned { wave: u32, id: CombatantId },
    BossDefeated { id: CombatantId },
}

/// Everything the engine reports in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    Combat { event: CombatEvent },
    Wave { event: WaveEvent },
    LevelUp { level: u32 },
    UpgradeChoicesReady { count: usize },
    UpgradeApplied { name: String, stacks: u32 },
    /// The player's cannon fired.
    PlayerFired { request: ProjectileRequest },
    PlayerDied,
    SessionEnded {
        reason: GameOverReason,
        survival_secs: f32,
        currency_banked: u64,
    },
}

impl From<CombatEvent> for GameEvent {
    fn from(event: CombatEvent) -> Self {
        Self::Combat { event }
    }
}

impl From<WaveEvent> for GameEvent {
    fn from(event: WaveEvent) -> Self {
        Self::Wave { event }
    }
}
