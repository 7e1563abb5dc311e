//! Game loop thread: runs the simulation engine at the tick rate and
//! publishes snapshots.
//!
//! The engine is created inside this thread because its observer lists and
//! storage backend are not `Send`. Commands arrive via an `mpsc` channel.
//! When the loop ends it hands back the persistent progress so the caller
//! can save it.

use std::sync::{mpsc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use glam::Vec2;
use log::{info, warn};

use tankalore_core::commands::PlayerCommand;
use tankalore_core::constants::TICK_RATE;
use tankalore_core::enums::{GameOverReason, GamePhase, OwnerTag};
use tankalore_core::events::{CombatEvent, GameEvent, WaveEvent};
use tankalore_core::state::GameStateSnapshot;
use tankalore_progression::meta::{MemoryStore, MetaProgress};
use tankalore_sim::config::GameConfig;
use tankalore_sim::scheduler::Roster;
use tankalore_sim::SimulationEngine;

use crate::state::{GameLoopCommand, LoopOptions, SharedSnapshot};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// The pilot engages combatants inside this distance.
const AUTOPILOT_ENGAGE_RANGE: f32 = 12.0;

/// An enemy shot counts as a hit when it is aimed within this many degrees
/// of the player.
const AUTOPILOT_HIT_CONE_DEG: f32 = 5.0;

/// What the loop reports when it exits.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub ticks: u64,
    pub waves_completed: u32,
    pub bosses_defeated: u32,
    pub game_over: Option<GameOverReason>,
    pub final_level: u32,
    pub survival_secs: f32,
    /// Persistent progress after the run, ready to save.
    pub store: MemoryStore,
}

/// Scripted player: aims at the nearest combatant, lands every shot that
/// actually fired, takes enemy shots aimed at it, and always picks the first
/// upgrade.
#[derive(Debug, Default)]
pub struct Autopilot {
    aimed: Option<u32>,
}

impl Autopilot {
    pub fn commands(&mut self, snapshot: &GameStateSnapshot) -> Vec<PlayerCommand> {
        match snapshot.phase {
            GamePhase::ChoosingUpgrade => {
                return vec![PlayerCommand::ChooseUpgrade { index: 0 }];
            }
            GamePhase::Active => {}
            _ => {
                self.aimed = None;
                return Vec::new();
            }
        }

        let player = snapshot.player.position;
        let mut commands = Vec::new();
        for event in &snapshot.events {
            match event {
                GameEvent::PlayerFired { request } => {
                    if let Some(id) = self.aimed.take() {
                        commands.push(PlayerCommand::DamageCombatant {
                            id,
                            amount: request.damage,
                        });
                    }
                }
                GameEvent::Combat {
                    event: CombatEvent::ProjectileSpawned { request, .. },
                } if request.owner == OwnerTag::Enemy => {
                    let to_player = player - request.origin;
                    let in_range = to_player.length() <= request.max_range;
                    let aimed_at = to_player.normalize_or_zero().dot(request.direction)
                        >= AUTOPILOT_HIT_CONE_DEG.to_radians().cos();
                    if in_range && aimed_at {
                        commands.push(PlayerCommand::DamagePlayer {
                            amount: request.damage,
                        });
                    }
                }
                _ => {}
            }
        }

        let nearest = snapshot
            .combatants
            .iter()
            .map(|c| (c, c.position.distance(player)))
            .filter(|(_, d)| *d <= AUTOPILOT_ENGAGE_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((target, _)) = nearest {
            let aim: Vec2 = target.position;
            commands.push(PlayerCommand::FireAt { x: aim.x, y: aim.y });
            self.aimed = Some(target.id);
        }
        commands
    }
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and a handle that yields the run report.
pub fn spawn_game_loop(
    config: GameConfig,
    store: MemoryStore,
    options: LoopOptions,
    latest_snapshot: SharedSnapshot,
) -> Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<RunReport>), String> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("tankalore-game-loop".into())
        .spawn(move || run_game_loop(config, store, options, cmd_rx, &latest_snapshot))
        .map_err(|e| format!("Failed to spawn game loop thread: {e}"))?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown, channel disconnect, the tick limit, or
/// (optionally) game over.
fn run_game_loop(
    config: GameConfig,
    store: MemoryStore,
    options: LoopOptions,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) -> RunReport {
    let mut engine = SimulationEngine::with_parts(
        config,
        Roster::builtin(),
        tankalore_progression::catalog::default_catalog(),
        MetaProgress::new(Box::new(store)),
    );
    if options.autostart {
        engine.queue_command(PlayerCommand::StartSession);
    }
    let mut pilot = Autopilot::default();
    let mut report = RunReport {
        ticks: 0,
        waves_completed: 0,
        bosses_defeated: 0,
        game_over: None,
        final_level: 1,
        survival_secs: 0.0,
        store: MemoryStore::new(),
    };
    let mut next_tick_time = Instant::now();

    'outer: loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) => break 'outer,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => break 'outer,
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();
        report.ticks += 1;
        record_progress(&mut report, &snapshot);

        if options.autopilot {
            engine.queue_commands(pilot.commands(&snapshot));
        }

        let finished = options.stop_on_game_over && snapshot.phase == GamePhase::GameOver;

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if finished || options.max_ticks.is_some_and(|max| report.ticks >= max) {
            break;
        }

        // 4. Sleep until next tick, adjusting for time_scale
        if options.realtime {
            let time_scale = engine.time_scale();
            let effective_tick_duration = if time_scale > 0.001 {
                TICK_DURATION.div_f64(time_scale)
            } else {
                TICK_DURATION
            };

            next_tick_time += effective_tick_duration;
            let now = Instant::now();
            if next_tick_time > now {
                std::thread::sleep(next_tick_time - now);
            } else if now - next_tick_time > effective_tick_duration * 2 {
                // Too far behind; reset to avoid a catch-up spiral
                next_tick_time = now;
            }
        }
    }

    if report.game_over.is_none() && engine.session().is_running() {
        warn!("Game loop stopped mid-session; run not recorded");
    }
    report.final_level = engine.xp().level();
    report.survival_secs = engine.session().elapsed_secs();
    report.store = engine.meta().export();
    report
}

fn record_progress(report: &mut RunReport, snapshot: &GameStateSnapshot) {
    for event in &snapshot.events {
        match event {
            GameEvent::Wave {
                event: WaveEvent::Completed { wave },
            } => {
                report.waves_completed += 1;
                info!(
                    "Wave {} cleared at {:.1}s (level {})",
                    wave, snapshot.session.elapsed_secs, snapshot.player.level
                );
            }
            GameEvent::Wave {
                event: WaveEvent::BossDefeated { .. },
            } => report.bosses_defeated += 1,
            GameEvent::SessionEnded { reason, .. } => report.game_over = Some(*reason),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tankalore_core::enums::{CombatantState, SpawnTier};
    use tankalore_core::events::{AiState, ProjectileRequest};
    use tankalore_core::state::CombatantView;
    use tankalore_core::types::CombatantId;
    use tankalore_sim::config::SimConfig;
    use tankalore_sim::session::SessionConfig;

    use crate::state::new_shared_snapshot;

    fn view(id: u32, position: Vec2) -> CombatantView {
        CombatantView {
            id,
            name: "Basic Enemy".into(),
            tier: SpawnTier::Regular,
            position,
            facing_deg: 0.0,
            health_fraction: 1.0,
            state: AiState::Enemy(CombatantState::Pursue),
            phase: 1,
        }
    }

    fn fast_options(max_ticks: u64) -> LoopOptions {
        LoopOptions {
            max_ticks: Some(max_ticks),
            realtime: false,
            autostart: true,
            autopilot: true,
            stop_on_game_over: true,
        }
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<GameLoopCommand>();

        tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::StartSession))
            .unwrap();
        tx.send(GameLoopCommand::PlayerCommand(PlayerCommand::Pause))
            .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            GameLoopCommand::PlayerCommand(PlayerCommand::StartSession)
        ));
        assert!(matches!(
            commands[1],
            GameLoopCommand::PlayerCommand(PlayerCommand::Pause)
        ));
        assert!(matches!(commands[2], GameLoopCommand::Shutdown));
    }

    #[test]
    fn test_tick_duration_constant() {
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }

    #[test]
    fn test_autopilot_aims_at_nearest_then_lands_the_shot() {
        let mut pilot = Autopilot::default();
        let mut snap = GameStateSnapshot {
            phase: GamePhase::Active,
            combatants: vec![view(1, Vec2::new(9.0, 0.0)), view(2, Vec2::new(0.0, 4.0))],
            ..GameStateSnapshot::default()
        };
        let commands = pilot.commands(&snap);
        assert!(matches!(
            commands.as_slice(),
            [PlayerCommand::FireAt { x, y }] if *x == 0.0 && *y == 4.0
        ));

        snap.events = vec![GameEvent::PlayerFired {
            request: ProjectileRequest {
                origin: Vec2::ZERO,
                direction: Vec2::Y,
                damage: 25.0,
                speed: 10.0,
                max_range: 10.0,
                owner: OwnerTag::Player,
            },
        }];
        let commands = pilot.commands(&snap);
        assert!(matches!(
            commands[0],
            PlayerCommand::DamageCombatant { id: 2, amount } if amount == 25.0
        ));
    }

    #[test]
    fn test_autopilot_takes_aimed_enemy_fire() {
        let mut pilot = Autopilot::default();
        let shot = |direction: Vec2| GameEvent::Combat {
            event: CombatEvent::ProjectileSpawned {
                source: CombatantId(3),
                request: ProjectileRequest {
                    origin: Vec2::new(5.0, 0.0),
                    direction,
                    damage: 15.0,
                    speed: 8.0,
                    max_range: 6.0,
                    owner: OwnerTag::Enemy,
                },
            },
        };
        let snap = GameStateSnapshot {
            phase: GamePhase::Active,
            events: vec![shot(Vec2::NEG_X), shot(Vec2::Y)],
            ..GameStateSnapshot::default()
        };
        let hits: Vec<_> = pilot
            .commands(&snap)
            .into_iter()
            .filter(|c| matches!(c, PlayerCommand::DamagePlayer { .. }))
            .collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_autopilot_picks_first_upgrade() {
        let mut pilot = Autopilot::default();
        let snap = GameStateSnapshot {
            phase: GamePhase::ChoosingUpgrade,
            ..GameStateSnapshot::default()
        };
        assert!(matches!(
            pilot.commands(&snap).as_slice(),
            [PlayerCommand::ChooseUpgrade { index: 0 }]
        ));
    }

    #[test]
    fn test_loop_stops_at_tick_limit() {
        let latest = new_shared_snapshot();
        let (tx, handle) = spawn_game_loop(
            GameConfig::default(),
            MemoryStore::new(),
            fast_options(300),
            latest.clone(),
        )
        .unwrap();
        let report = handle.join().unwrap();
        drop(tx);
        assert_eq!(report.ticks, 300);
        let snap = latest.lock().unwrap().clone().unwrap();
        assert_eq!(snap.phase, GamePhase::Active);
        assert_eq!(snap.wave.wave_number, 1);
    }

    #[test]
    fn test_loop_reports_finished_session() {
        let config = GameConfig {
            sim: SimConfig {
                seed: 3,
                ..SimConfig::default()
            },
            session: SessionConfig { duration_secs: 2.0 },
            ..GameConfig::default()
        };
        let latest = new_shared_snapshot();
        let (_tx, handle) =
            spawn_game_loop(config, MemoryStore::new(), fast_options(10_000), latest).unwrap();
        let report = handle.join().unwrap();
        assert_eq!(report.game_over, Some(GameOverReason::TimeUp));
        assert!(report.ticks < 10_000);
        assert!(!report.store.is_empty());
    }

    #[test]
    fn test_shutdown_command_stops_loop() {
        let options = LoopOptions {
            max_ticks: None,
            autostart: false,
            ..fast_options(0)
        };
        let (tx, handle) =
            spawn_game_loop(GameConfig::default(), MemoryStore::new(), options, new_shared_snapshot())
                .unwrap();
        tx.send(GameLoopCommand::Shutdown).unwrap();
        let report = handle.join().unwrap();
        assert!(report.game_over.is_none());
    }
}
