//! Snapshot system: reads the world and the engine's side state and builds a
//! complete `GameStateSnapshot`.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use tankalore_ai::boss::Boss;
use tankalore_ai::combatant::Combatant;
use tankalore_ai::enemy::Enemy;
use tankalore_core::enums::GamePhase;
use tankalore_core::events::GameEvent;
use tankalore_core::player::Tank;
use tankalore_core::state::*;
use tankalore_core::stats::PlayerStats;
use tankalore_core::types::SimTime;
use tankalore_progression::meta::MetaProgress;
use tankalore_progression::upgrade_engine::UpgradeEngine;
use tankalore_progression::wallet::Wallet;
use tankalore_progression::xp::XpTracker;

use crate::scheduler::WaveScheduler;
use crate::session::Session;

/// Build a complete GameStateSnapshot from the current engine state.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    scheduler: &WaveScheduler,
    player: &Tank,
    xp: &XpTracker,
    wallet: &Wallet,
    upgrades: &UpgradeEngine,
    session: &Session,
    meta: &MetaProgress,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        wave: scheduler.view(),
        combatants: build_combatants(world),
        player: build_player(player, xp, wallet),
        upgrade_choices: build_choices(upgrades),
        session: SessionView {
            elapsed_secs: session.elapsed_secs(),
            remaining_secs: session.remaining_secs(),
            game_over_reason: session.reason(),
            best_survival_secs: meta.best_survival_secs(),
        },
        events,
    }
}

fn view_of(combatant: &dyn Combatant) -> CombatantView {
    let core = combatant.core();
    CombatantView {
        id: core.id.0,
        name: core.definition.name.clone(),
        tier: core.tier,
        position: core.position,
        facing_deg: core.facing_deg,
        health_fraction: combatant.health_fraction(),
        state: combatant.ai_state(),
        phase: combatant.phase(),
    }
}

/// Living combatants sorted by id.
fn build_combatants(world: &World) -> Vec<CombatantView> {
    let mut views: Vec<CombatantView> = world
        .query::<&Enemy>()
        .iter()
        .map(|(_, enemy)| view_of(enemy))
        .collect();
    views.extend(
        world
            .query::<&Boss>()
            .iter()
            .map(|(_, boss)| view_of(boss)),
    );
    views.sort_by_key(|v| v.id);
    views
}

fn build_player(player: &Tank, xp: &XpTracker, wallet: &Wallet) -> PlayerView {
    PlayerView {
        position: player.position,
        health: player.current_health(),
        max_health: player.max_health(),
        level: xp.level(),
        xp: xp.xp(),
        xp_required: xp.required(),
        session_currency: wallet.session(),
        total_currency: wallet.total(),
        dead: player.is_dead(),
    }
}

fn build_choices(upgrades: &UpgradeEngine) -> Vec<UpgradeChoiceView> {
    upgrades
        .pending_choices()
        .iter()
        .map(|entry| UpgradeChoiceView {
            name: entry.name.clone(),
            description: entry.description.clone(),
            upgrade_type: entry.upgrade_type,
            rarity: entry.rarity,
            stacks: upgrades.stacks(entry.upgrade_type),
        })
        .collect()
}
