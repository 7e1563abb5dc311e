//! Wave scheduler: decides when waves start, when each unit spawns, when a
//! boss joins, and when a wave is complete.
//!
//! The scheduler owns the alive count. Every combatant it hands out is
//! tracked by id, and a death notification untracks it exactly once.
//! It never touches the world; the engine turns `SpawnRequest`s into
//! entities.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use tankalore_core::constants::*;
use tankalore_core::definitions::{BossDefinition, BossTuning, CombatantDefinition};
use tankalore_core::enums::SpawnTier;
use tankalore_core::events::WaveEvent;
use tankalore_core::observer::{Listeners, SubscriptionId};
use tankalore_core::state::WaveView;
use tankalore_core::types::{point_on_circle, CombatantId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub base_enemies: u32,
    pub scaling: f32,
    pub enemy_cap: u32,
    pub first_wave_delay_secs: f32,
    pub inter_wave_delay_secs: f32,
    pub spawn_interval_secs: f32,
    /// Every Nth wave brings a boss. 0 disables bosses.
    pub boss_wave_interval: u32,
    pub boss_spawn_delay_secs: f32,
    /// Ring radius around the target when no fixed spawn points are set.
    pub spawn_radius: f32,
    pub boss_spawn_radius_factor: f32,
    /// Fixed spawn locations. Empty means "ring around the target".
    pub spawn_points: Vec<Vec2>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            base_enemies: WAVE_BASE_ENEMIES,
            scaling: WAVE_SCALING,
            enemy_cap: WAVE_ENEMY_CAP,
            first_wave_delay_secs: FIRST_WAVE_DELAY_SECS,
            inter_wave_delay_secs: INTER_WAVE_DELAY_SECS,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            boss_wave_interval: BOSS_WAVE_INTERVAL,
            boss_spawn_delay_secs: BOSS_SPAWN_DELAY_SECS,
            spawn_radius: SPAWN_RADIUS,
            boss_spawn_radius_factor: BOSS_SPAWN_RADIUS_FACTOR,
            spawn_points: Vec::new(),
        }
    }
}

impl SpawnerConfig {
    /// Units required by wave `wave` (1-based):
    /// `min(round(base * scaling^(wave - 1)), cap)`.
    pub fn required_for_wave(&self, wave: u32) -> u32 {
        let exponent = wave.saturating_sub(1).min(i32::MAX as u32) as i32;
        let raw = (self.base_enemies as f32 * self.scaling.powi(exponent)).round();
        if raw.is_finite() {
            (raw as u32).min(self.enemy_cap)
        } else {
            self.enemy_cap
        }
    }

    pub fn is_boss_wave(&self, wave: u32) -> bool {
        self.boss_wave_interval > 0 && wave > 0 && wave % self.boss_wave_interval == 0
    }
}

/// What to build for one spawn.
#[derive(Debug, Clone)]
pub enum Prefab {
    Regular(Arc<CombatantDefinition>),
    Boss {
        combatant: Arc<CombatantDefinition>,
        tuning: Arc<BossTuning>,
    },
}

impl Prefab {
    pub fn tier(&self) -> SpawnTier {
        match self {
            Self::Regular(_) => SpawnTier::Regular,
            Self::Boss { .. } => SpawnTier::Boss,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Regular(def) => &def.name,
            Self::Boss { combatant, .. } => &combatant.name,
        }
    }
}

/// Prefab pools per tier.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub regular: Vec<Arc<CombatantDefinition>>,
    pub bosses: Vec<(Arc<CombatantDefinition>, Arc<BossTuning>)>,
}

impl Roster {
    /// Bosses with invalid phase tuning are left out.
    pub fn new(regular: Vec<CombatantDefinition>, bosses: Vec<BossDefinition>) -> Self {
        Self {
            regular: regular.into_iter().map(Arc::new).collect(),
            bosses: bosses
                .into_iter()
                .filter(|b| match b.tuning.validate() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Skipping boss {}: {}", b.combatant.name, e);
                        false
                    }
                })
                .map(|b| (Arc::new(b.combatant), Arc::new(b.tuning)))
                .collect(),
        }
    }

    /// The built-in archetypes and the stock boss.
    pub fn builtin() -> Self {
        Self::new(
            tankalore_ai::profiles::default_roster(),
            vec![tankalore_ai::profiles::default_boss()],
        )
    }

    fn pick<R: Rng + ?Sized>(&self, tier: SpawnTier, rng: &mut R) -> Option<Prefab> {
        match tier {
            SpawnTier::Regular => {
                if self.regular.is_empty() {
                    return None;
                }
                let idx = rng.gen_range(0..self.regular.len());
                Some(Prefab::Regular(self.regular[idx].clone()))
            }
            SpawnTier::Boss => {
                if self.bosses.is_empty() {
                    return None;
                }
                let idx = rng.gen_range(0..self.bosses.len());
                let (combatant, tuning) = &self.bosses[idx];
                Some(Prefab::Boss {
                    combatant: combatant.clone(),
                    tuning: tuning.clone(),
                })
            }
        }
    }
}

/// One combatant the engine should create.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub id: CombatantId,
    pub prefab: Prefab,
    pub position: Vec2,
}

pub struct WaveScheduler {
    config: SpawnerConfig,
    roster: Roster,
    wave_number: u32,
    required: u32,
    spawned: u32,
    alive: u32,
    in_progress: bool,
    stopped: bool,
    next_wave_time: f32,
    next_spawn_time: f32,
    /// When the pending boss of the current wave is due.
    boss_due: Option<f32>,
    active_boss: Option<CombatantId>,
    tracked: HashMap<CombatantId, SpawnTier>,
    next_id: u32,
    warned_no_position: bool,
    listeners: Listeners<WaveEvent>,
}

impl WaveScheduler {
    pub fn new(config: SpawnerConfig, roster: Roster) -> Self {
        if roster.regular.is_empty() {
            warn!("Wave scheduler has no regular prefabs; waves will be empty");
        }
        let next_wave_time = config.first_wave_delay_secs;
        Self {
            config,
            roster,
            wave_number: 0,
            required: 0,
            spawned: 0,
            alive: 0,
            in_progress: false,
            stopped: true,
            next_wave_time,
            next_spawn_time: 0.0,
            boss_due: None,
            active_boss: None,
            tracked: HashMap::new(),
            next_id: 1,
            warned_no_position: false,
            listeners: Listeners::new(),
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&WaveEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn alive(&self) -> u32 {
        self.alive
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn boss_active(&self) -> bool {
        self.active_boss.is_some()
    }

    pub fn boss_pending(&self) -> bool {
        self.boss_due.is_some()
    }

    pub fn is_tracked(&self, id: CombatantId) -> bool {
        self.tracked.contains_key(&id)
    }

    pub fn view(&self) -> WaveView {
        WaveView {
            wave_number: self.wave_number,
            spawned: self.spawned,
            required: self.required,
            alive: self.alive,
            in_progress: self.in_progress,
            boss_active: self.boss_active(),
        }
    }

    /// Begin scheduling. The first wave starts after the configured delay.
    pub fn start(&mut self, now: f32) {
        self.stopped = false;
        self.next_wave_time = now + self.config.first_wave_delay_secs;
        info!(
            "Wave scheduler started; first wave at {:.1}s",
            self.next_wave_time
        );
    }

    /// Halt scheduling and clear the wave and boss flags. Living combatants
    /// stay tracked so their deaths still count.
    pub fn force_stop(&mut self) {
        if !self.stopped {
            info!("Wave scheduler stopped at wave {}", self.wave_number);
        }
        self.stopped = true;
        self.in_progress = false;
        self.boss_due = None;
        self.active_boss = None;
    }

    /// Forget everything, including tracked combatants.
    pub fn reset(&mut self) {
        self.wave_number = 0;
        self.required = 0;
        self.spawned = 0;
        self.alive = 0;
        self.in_progress = false;
        self.stopped = true;
        self.next_wave_time = self.config.first_wave_delay_secs;
        self.next_spawn_time = 0.0;
        self.boss_due = None;
        self.active_boss = None;
        self.tracked.clear();
        self.next_id = 1;
        self.warned_no_position = false;
    }

    /// Advance the schedule. Returns the combatants to create this tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        target: Option<Vec2>,
        rng: &mut R,
        events: &mut Vec<WaveEvent>,
    ) -> Vec<SpawnRequest> {
        let mut spawns = Vec::new();
        if self.stopped {
            return spawns;
        }

        if !self.in_progress {
            if self.alive == 0 && now >= self.next_wave_time {
                self.start_wave(now, events);
            } else {
                return spawns;
            }
        }

        if self.spawned < self.required && now >= self.next_spawn_time {
            if self.roster.regular.is_empty() {
                self.spawned = self.required;
            } else if let Some(request) = self.make_request(SpawnTier::Regular, target, rng) {
                self.track(&request);
                self.spawned += 1;
                self.next_spawn_time += self.config.spawn_interval_secs;
                spawns.push(request);
            }
        }

        if let Some(due) = self.boss_due {
            if now >= due {
                if let Some(request) = self.make_request(SpawnTier::Boss, target, rng) {
                    self.track(&request);
                    self.boss_due = None;
                    self.active_boss = Some(request.id);
                    info!(
                        "Boss {} ({}) spawned in wave {}",
                        request.id.0,
                        request.prefab.name(),
                        self.wave_number
                    );
                    self.emit(
                        WaveEvent::BossSpawned {
                            wave: self.wave_number,
                            id: request.id,
                        },
                        events,
                    );
                    spawns.push(request);
                }
            }
        }

        if self.spawned >= self.required && self.alive == 0 && self.boss_due.is_none() {
            self.complete_wave(now, events);
        }

        spawns
    }

    /// Untrack a dead combatant. Unknown or already-untracked ids are
    /// ignored. Returns `true` if the notice was counted.
    pub fn on_combatant_died(&mut self, id: CombatantId, events: &mut Vec<WaveEvent>) -> bool {
        let Some(tier) = self.tracked.remove(&id) else {
            debug!("Ignoring death notice for untracked combatant {}", id.0);
            return false;
        };
        self.alive = self.alive.saturating_sub(1);
        if tier == SpawnTier::Boss && self.active_boss == Some(id) {
            self.active_boss = None;
            info!("Boss {} defeated", id.0);
            self.emit(WaveEvent::BossDefeated { id }, events);
        }
        true
    }

    fn start_wave(&mut self, now: f32, events: &mut Vec<WaveEvent>) {
        self.wave_number += 1;
        self.required = self.config.required_for_wave(self.wave_number);
        self.spawned = 0;
        self.in_progress = true;
        self.next_spawn_time = now;

        if self.config.is_boss_wave(self.wave_number) {
            if self.active_boss.is_some() || self.boss_due.is_some() {
                debug!(
                    "Wave {} qualifies for a boss but one is already active",
                    self.wave_number
                );
            } else if self.roster.bosses.is_empty() {
                warn!("Wave {} qualifies for a boss but none are configured", self.wave_number);
            } else {
                self.boss_due = Some(now + self.config.boss_spawn_delay_secs);
            }
        }

        info!(
            "Wave {} started: {} enemies{}",
            self.wave_number,
            self.required,
            if self.boss_due.is_some() { " + boss" } else { "" }
        );
        self.emit(
            WaveEvent::Started {
                wave: self.wave_number,
                required: self.required,
            },
            events,
        );
    }

    fn complete_wave(&mut self, now: f32, events: &mut Vec<WaveEvent>) {
        self.in_progress = false;
        self.next_wave_time = now + self.config.inter_wave_delay_secs;
        info!(
            "Wave {} complete; next wave at {:.1}s",
            self.wave_number, self.next_wave_time
        );
        self.emit(
            WaveEvent::Completed {
                wave: self.wave_number,
            },
            events,
        );
    }

    fn make_request<R: Rng + ?Sized>(
        &mut self,
        tier: SpawnTier,
        target: Option<Vec2>,
        rng: &mut R,
    ) -> Option<SpawnRequest> {
        let radius_factor = match tier {
            SpawnTier::Regular => 1.0,
            SpawnTier::Boss => self.config.boss_spawn_radius_factor,
        };
        let Some(position) = self.spawn_position(target, radius_factor, rng) else {
            if !self.warned_no_position {
                warn!("No spawn position available: no spawn points and no target");
                self.warned_no_position = true;
            }
            return None;
        };
        self.warned_no_position = false;
        let prefab = self.roster.pick(tier, rng)?;
        let id = CombatantId(self.next_id);
        self.next_id += 1;
        Some(SpawnRequest {
            id,
            prefab,
            position,
        })
    }

    fn spawn_position<R: Rng + ?Sized>(
        &self,
        target: Option<Vec2>,
        radius_factor: f32,
        rng: &mut R,
    ) -> Option<Vec2> {
        if !self.config.spawn_points.is_empty() {
            let idx = rng.gen_range(0..self.config.spawn_points.len());
            return Some(self.config.spawn_points[idx]);
        }
        let center = target?;
        let angle = rng.gen_range(0.0..TAU);
        Some(point_on_circle(
            center,
            angle,
            self.config.spawn_radius * radius_factor,
        ))
    }

    fn track(&mut self, request: &SpawnRequest) {
        self.tracked.insert(request.id, request.prefab.tier());
        self.alive += 1;
    }

    fn emit(&mut self, event: WaveEvent, events: &mut Vec<WaveEvent>) {
        self.listeners.emit(&event);
        events.push(event);
    }
}
