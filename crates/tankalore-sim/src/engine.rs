//! Simulation engine: the core of a run.
//!
//! `SimulationEngine` owns the hecs world of combatants together with the
//! scheduler, upgrade engine, XP, wallet, player tank and session. It
//! processes queued commands, runs every system and produces a
//! `GameStateSnapshot` per tick. Completely headless, so runs are
//! reproducible from a seed.

use std::collections::VecDeque;

use glam::Vec2;
use hecs::{Entity, World};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tankalore_core::commands::PlayerCommand;
use tankalore_core::enums::{GameOverReason, GamePhase, PermanentUpgradeType};
use tankalore_core::events::{CombatEvent, DeathNotice, GameEvent, WaveEvent};
use tankalore_core::player::Tank;
use tankalore_core::state::GameStateSnapshot;
use tankalore_core::types::{CombatantId, SimTime};
use tankalore_progression::catalog::{default_catalog, UpgradeCatalog};
use tankalore_progression::meta::MetaProgress;
use tankalore_progression::upgrade_engine::UpgradeEngine;
use tankalore_progression::wallet::Wallet;
use tankalore_progression::xp::XpTracker;

use crate::config::{GameConfig, SimConfig};
use crate::scheduler::{Roster, WaveScheduler};
use crate::session::Session;
use crate::systems;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all run state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,
    config: GameConfig,
    scheduler: WaveScheduler,
    upgrades: UpgradeEngine,
    xp: XpTracker,
    wallet: Wallet,
    meta: MetaProgress,
    player: Tank,
    session: Session,
    /// Levels reached but not yet offered, oldest first.
    pending_level_ups: VecDeque<u32>,
}

impl SimulationEngine {
    /// Create an engine with default tuning and the given seed settings.
    pub fn new(config: SimConfig) -> Self {
        Self::with_config(GameConfig {
            sim: config,
            ..GameConfig::default()
        })
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_parts(config, Roster::builtin(), default_catalog(), MetaProgress::default())
    }

    /// Full constructor: custom roster, upgrade catalog and persistent progress.
    pub fn with_parts(
        config: GameConfig,
        roster: Roster,
        catalog: UpgradeCatalog,
        meta: MetaProgress,
    ) -> Self {
        let wallet = Wallet::with_total(meta.total_currency());
        let player = Self::fresh_tank(&config, &meta);
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            time_scale: config.sim.time_scale,
            rng: ChaCha8Rng::seed_from_u64(config.sim.seed),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            scheduler: WaveScheduler::new(config.spawner.clone(), roster),
            upgrades: UpgradeEngine::new(catalog),
            xp: XpTracker::new(config.xp.clone()),
            session: Session::new(config.session.clone()),
            wallet,
            meta,
            player,
            config,
            pending_level_ups: VecDeque::new(),
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.scheduler,
            &self.player,
            &self.xp,
            &self.wallet,
            &self.upgrades,
            &self.session,
            &self.meta,
            events,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut WaveScheduler {
        &mut self.scheduler
    }

    pub fn upgrades(&self) -> &UpgradeEngine {
        &self.upgrades
    }

    pub fn upgrades_mut(&mut self) -> &mut UpgradeEngine {
        &mut self.upgrades
    }

    pub fn xp(&self) -> &XpTracker {
        &self.xp
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn meta(&self) -> &MetaProgress {
        &self.meta
    }

    pub fn player(&self) -> &Tank {
        &self.player
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of living combatant entities.
    pub fn combatant_count(&self) -> usize {
        self.world.query::<&CombatantId>().iter().count()
    }

    /// Ids of every combatant entity, ascending.
    pub fn combatant_ids(&self) -> Vec<CombatantId> {
        let mut ids: Vec<CombatantId> = self
            .world
            .query::<&CombatantId>()
            .iter()
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Buy a permanent upgrade between runs.
    pub fn purchase_permanent(&mut self, upgrade: PermanentUpgradeType) -> Result<u64, String> {
        if self.session_live() {
            return Err("Permanent upgrades can only be bought between runs".into());
        }
        self.meta.purchase(upgrade, &mut self.wallet)
    }

    fn fresh_tank(config: &GameConfig, meta: &MetaProgress) -> Tank {
        let mut stats = config.tank.clone();
        stats.multipliers = Default::default();
        meta.apply_to_tank(&mut stats);
        Tank::new(stats)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartSession => {
                if matches!(self.phase, GamePhase::MainMenu | GamePhase::GameOver) {
                    self.begin_session();
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::EndSession => {
                if self.session_live() {
                    self.end_session(GameOverReason::Manual);
                }
            }
            PlayerCommand::Restart => {
                if self.phase != GamePhase::MainMenu {
                    // Unbanked earnings of an abandoned run are forfeit.
                    self.wallet.reset_session();
                    self.begin_session();
                }
            }
            PlayerCommand::SetPlayerPosition { x, y } => {
                self.player.position = Vec2::new(x, y);
            }
            PlayerCommand::FireAt { x, y } => {
                if self.phase == GamePhase::Active {
                    let direction = Vec2::new(x, y) - self.player.position;
                    if let Some(request) = self.player.try_fire(self.time.elapsed_secs, direction) {
                        self.events.push(GameEvent::PlayerFired { request });
                    }
                }
            }
            PlayerCommand::DamagePlayer { amount } => {
                if self.phase == GamePhase::Active {
                    self.damage_player(amount);
                }
            }
            PlayerCommand::DamageCombatant { id, amount } => {
                if self.phase == GamePhase::Active {
                    let mut combat_events = Vec::new();
                    world_setup::damage_combatant(
                        &mut self.world,
                        CombatantId(id),
                        amount,
                        &mut combat_events,
                    );
                    self.handle_combat_events(combat_events);
                }
            }
            PlayerCommand::ChooseUpgrade { index } => {
                if self.phase == GamePhase::ChoosingUpgrade {
                    self.choose_upgrade(index);
                }
            }
        }
    }

    fn session_live(&self) -> bool {
        matches!(
            self.phase,
            GamePhase::Active | GamePhase::Paused | GamePhase::ChoosingUpgrade
        )
    }

    /// Clear the arena and start a fresh run.
    fn begin_session(&mut self) {
        self.world.clear();
        self.time = SimTime::default();
        self.events.clear();
        self.pending_level_ups.clear();

        self.player = Self::fresh_tank(&self.config, &self.meta);
        self.upgrades.reset_session(&mut self.player);
        self.xp.reset();
        self.xp.set_level(self.meta.starting_level());
        self.wallet.reset_session();
        self.scheduler.reset();
        self.scheduler.start(self.time.elapsed_secs);
        self.session.start();
        self.phase = GamePhase::Active;
        info!(
            "Session started at level {} (total currency {})",
            self.xp.level(),
            self.wallet.total()
        );
    }

    /// End the run once: stop spawning, bank currency, record the result.
    fn end_session(&mut self, reason: GameOverReason) {
        if !self.session.end(reason) {
            return;
        }
        self.scheduler.force_stop();
        self.upgrades.skip_choice();
        self.pending_level_ups.clear();

        let banked = self.wallet.end_session();
        self.meta.save_currency(&self.wallet);
        let survival_secs = self.session.elapsed_secs();
        if self.meta.record_run(survival_secs, self.scheduler.wave_number()) {
            info!("New best survival time: {:.1}s", survival_secs);
        }

        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::SessionEnded {
            reason,
            survival_secs,
            currency_banked: banked,
        });
    }

    fn damage_player(&mut self, amount: f32) {
        if self.player.take_damage(amount) {
            info!("Player destroyed");
            self.events.push(GameEvent::PlayerDied);
            self.end_session(GameOverReason::PlayerDeath);
        }
    }

    fn choose_upgrade(&mut self, index: usize) {
        match self.upgrades.choose(index, &mut self.player) {
            Ok(entry) => {
                self.events.push(GameEvent::UpgradeApplied {
                    name: entry.name.clone(),
                    stacks: self.upgrades.stacks(entry.upgrade_type),
                });
                self.phase = GamePhase::Active;
                self.offer_next_upgrade();
            }
            Err(e) => warn!("{}", e),
        }
    }

    /// Offer choices for the oldest unresolved level-up, pausing the run
    /// until one is picked. Levels with nothing to offer are skipped.
    fn offer_next_upgrade(&mut self) {
        if self.phase != GamePhase::Active || self.upgrades.has_pending_choice() {
            return;
        }
        while let Some(level) = self.pending_level_ups.pop_front() {
            let offered = self.upgrades.handle_level_up(level, &mut self.rng);
            if offered > 0 {
                self.events.push(GameEvent::UpgradeChoicesReady { count: offered });
                self.phase = GamePhase::ChoosingUpgrade;
                return;
            }
        }
    }

    fn reward(&mut self, notice: &DeathNotice) {
        if self.session.is_over() {
            return;
        }
        let xp = (notice.xp_reward as f32 * self.meta.xp_multiplier()).round() as u32;
        let currency =
            (notice.currency_reward as f32 * self.meta.currency_multiplier()).round() as u64;
        self.wallet.add(currency);
        for level in self.xp.add_xp(xp) {
            self.events.push(GameEvent::LevelUp { level });
            self.pending_level_ups.push_back(level);
        }
        debug!(
            "Combatant {} down: +{} xp, +{} currency",
            notice.id.0, xp, currency
        );
    }

    /// Route combatant output: rewards and scheduler bookkeeping on deaths,
    /// heavy strikes against the player, everything forwarded to the host.
    fn handle_combat_events(&mut self, combat_events: Vec<CombatEvent>) {
        let mut wave_events = Vec::new();
        for event in combat_events {
            match &event {
                CombatEvent::Died { notice } => {
                    self.scheduler.on_combatant_died(notice.id, &mut wave_events);
                    self.reward(notice);
                }
                CombatEvent::HeavyStrike {
                    center,
                    damage,
                    radius,
                    ..
                } => {
                    if self.session_live() && self.player.position.distance(*center) <= *radius {
                        self.damage_player(*damage);
                    }
                }
                _ => {}
            }
            self.events.push(event.into());
        }
        self.push_wave_events(wave_events);
        self.offer_next_upgrade();
    }

    fn push_wave_events(&mut self, wave_events: Vec<WaveEvent>) {
        self.events.extend(wave_events.into_iter().map(GameEvent::from));
    }

    fn target(&self) -> Option<Vec2> {
        if self.player.is_dead() {
            None
        } else {
            Some(self.player.position)
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();
        let now = self.time.elapsed_secs;

        // 1. Session clock
        if self.session.advance(dt) {
            self.end_session(GameOverReason::TimeUp);
            return;
        }

        let target = self.target();

        // 2. Wave spawning
        let mut wave_events = Vec::new();
        systems::wave_spawner::run(
            &mut self.world,
            &mut self.rng,
            &mut self.scheduler,
            now,
            target,
            &mut wave_events,
        );
        self.push_wave_events(wave_events);

        // 3. Combatant state machines
        let mut combat_events = Vec::new();
        systems::combat_ai::run(
            &mut self.world,
            &mut self.rng,
            dt,
            now,
            target,
            &mut combat_events,
        );
        self.handle_combat_events(combat_events);

        // 4. Movement integration
        systems::movement::run(&mut self.world, dt);

        // 5. Cleanup
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Spawn a combatant outside the scheduler (tests only). It is not
    /// tracked, so its death never touches the alive count.
    #[cfg(test)]
    pub(crate) fn spawn_untracked(
        &mut self,
        id: u32,
        definition: tankalore_core::definitions::CombatantDefinition,
        position: Vec2,
    ) {
        let request = crate::scheduler::SpawnRequest {
            id: CombatantId(id),
            prefab: crate::scheduler::Prefab::Regular(std::sync::Arc::new(definition)),
            position,
        };
        world_setup::spawn_combatant(&mut self.world, &request);
    }
}
