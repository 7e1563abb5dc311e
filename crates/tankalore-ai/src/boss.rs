//! Boss behavior state machine with health-driven phases.
//!
//! Phases only advance. Each tick runs: flash sequences, phase check,
//! transition, behavior, then any pending burst shots.

use std::sync::Arc;

use glam::Vec2;
use log::{debug, info};
use rand::{Rng, RngCore};

use tankalore_core::constants::*;
use tankalore_core::definitions::{BossDefinition, BossTuning, CombatantDefinition, PhaseProfile};
use tankalore_core::enums::{BossState, FlashKind, SpawnTier};
use tankalore_core::events::{AiState, CombatEvent};
use tankalore_core::types::{facing_direction, interval_for_rate, CombatantId};

use crate::combatant::{Combatant, CombatantCore, DamageOutcome};
use crate::sequences::{BurstSequence, PulseSequence};

/// Input to the boss transition table.
pub struct BossContext {
    pub state: BossState,
    pub distance_to_target: f32,
    pub elapsed_in_state_secs: f32,
    pub now: f32,
    pub next_special_time: f32,
    pub attack_range: f32,
    /// A special sequence is still running.
    pub special_pending: bool,
    /// Outcome of the reposition coin flip, used only on the Attack timeout.
    pub prefer_circle: bool,
}

/// Next state for the given situation, or `None` to stay. Idle is left only
/// when the boss first sees a target, which `Boss::update` handles.
pub fn evaluate_transition(ctx: &BossContext) -> Option<BossState> {
    let t = ctx.elapsed_in_state_secs;
    match ctx.state {
        BossState::Approach
            if ctx.distance_to_target <= ctx.attack_range * BOSS_APPROACH_RANGE_FACTOR =>
        {
            Some(BossState::Attack)
        }
        BossState::Attack if !ctx.special_pending && ctx.now >= ctx.next_special_time => {
            Some(BossState::SpecialAttack)
        }
        BossState::Attack if t > BOSS_ATTACK_TIMEOUT_SECS => Some(if ctx.prefer_circle {
            BossState::Circle
        } else {
            BossState::Retreat
        }),
        BossState::SpecialAttack if t > BOSS_WIND_UP_SECS => Some(BossState::Retreat),
        BossState::Retreat if t > BOSS_RETREAT_SECS => Some(BossState::Circle),
        BossState::Circle if t > BOSS_CIRCLE_SECS => Some(BossState::Approach),
        _ => None,
    }
}

/// Phase-specific special attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAttack {
    Spread,
    Burst,
    HeavyStrike,
}

impl SpecialAttack {
    /// Phase 1 spreads, phase 2 bursts, phase 3 and beyond strike.
    pub fn for_phase(phase: u32) -> Self {
        match phase {
            0 | 1 => Self::Spread,
            2 => Self::Burst,
            _ => Self::HeavyStrike,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Boss {
    core: CombatantCore,
    tuning: Arc<BossTuning>,
    state: BossState,
    phase: u32,
    engaged: bool,
    next_special_time: f32,
    burst: Option<BurstSequence>,
    phase_flash: Option<PulseSequence>,
}

impl Boss {
    pub fn new(id: CombatantId, definition: &BossDefinition, position: Vec2) -> Self {
        Self::with_shared(
            id,
            Arc::new(definition.combatant.clone()),
            Arc::new(definition.tuning.clone()),
            position,
        )
    }

    /// Build from already-shared records so many bosses can reuse them.
    pub fn with_shared(
        id: CombatantId,
        combatant: Arc<CombatantDefinition>,
        tuning: Arc<BossTuning>,
        position: Vec2,
    ) -> Self {
        Self {
            core: CombatantCore::new(id, combatant, SpawnTier::Boss, position),
            tuning,
            state: BossState::Idle,
            phase: 1,
            engaged: false,
            next_special_time: f32::INFINITY,
            burst: None,
            phase_flash: None,
        }
    }

    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn current_phase(&self) -> u32 {
        self.phase
    }

    pub fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    pub fn next_special_time(&self) -> f32 {
        self.next_special_time
    }

    pub fn burst_in_progress(&self) -> bool {
        self.burst.is_some()
    }

    pub fn phase_flash_active(&self) -> bool {
        self.phase_flash.is_some()
    }

    fn profile(&self) -> PhaseProfile {
        self.tuning.profile(self.phase)
    }

    pub fn current_damage(&self) -> f32 {
        self.core.definition.damage * self.profile().damage_factor
    }

    pub fn current_fire_rate(&self) -> f32 {
        self.core.definition.fire_rate * self.profile().fire_rate_factor
    }

    pub fn current_move_speed(&self) -> f32 {
        self.core.definition.movement_speed * self.profile().move_speed_factor
    }

    fn change_state(&mut self, next: BossState, events: &mut Vec<CombatEvent>) {
        if next == self.state {
            return;
        }
        debug!(
            "Boss {} ({}): {:?} -> {:?}",
            self.core.id.0, self.core.definition.name, self.state, next
        );
        events.push(CombatEvent::StateChanged {
            source: self.core.id,
            from: AiState::Boss(self.state),
            to: AiState::Boss(next),
        });
        self.state = next;
        self.core.reset_state_timer();
    }

    /// Advance to the phase the current health maps to. Never regresses.
    fn check_phase(&mut self, events: &mut Vec<CombatEvent>) {
        let computed = self.tuning.phase_for_fraction(self.core.health_fraction());
        if computed <= self.phase {
            return;
        }
        self.phase = computed;
        info!(
            "Boss {} entered phase {} at {:.0}% health",
            self.core.id.0,
            self.phase,
            self.core.health_fraction() * 100.0
        );
        events.push(CombatEvent::PhaseChanged {
            source: self.core.id,
            phase: self.phase,
        });
        self.phase_flash = Some(PulseSequence::new(
            BOSS_PHASE_FLASH_PULSES,
            BOSS_PHASE_FLASH_HALF_SECS,
        ));
        self.tick_phase_flash(0.0, events);
    }

    fn tick_phase_flash(&mut self, dt: f32, events: &mut Vec<CombatEvent>) {
        let id = self.core.id;
        if let Some(flash) = self.phase_flash.as_mut() {
            flash.advance(dt, |on| {
                events.push(CombatEvent::Flash {
                    source: id,
                    kind: FlashKind::PhaseShift,
                    on,
                })
            });
            if flash.is_finished() {
                self.phase_flash = None;
            }
        }
    }

    fn try_regular_fire(&mut self, now: f32, events: &mut Vec<CombatEvent>) {
        let interval = interval_for_rate(self.current_fire_rate());
        if interval.is_finite() && self.core.can_fire(now) {
            self.core
                .fire_volley(self.tuning.fire_points, self.current_damage(), events);
            self.core.rearm_fire(now, interval);
        }
    }

    fn spread(&self, events: &mut Vec<CombatEvent>) {
        let count = self.tuning.spread_count.max(1);
        let step = 360.0 / count as f32;
        let damage = self.current_damage() * self.tuning.spread_damage_factor;
        for i in 0..count {
            let direction = facing_direction(i as f32 * step);
            let origin = self.core.position + direction * BOSS_SPREAD_SPAWN_OFFSET;
            self.core.emit_projectile(origin, direction, damage, events);
        }
    }

    fn perform_special(&mut self, now: f32, target: Vec2, events: &mut Vec<CombatEvent>) {
        let special = SpecialAttack::for_phase(self.phase);
        debug!("Boss {} special: {:?}", self.core.id.0, special);
        match special {
            SpecialAttack::Spread => self.spread(events),
            SpecialAttack::Burst => {
                self.burst = Some(BurstSequence::new(
                    self.tuning.burst_shots,
                    self.tuning.burst_interval_secs,
                    now,
                ));
                self.tick_burst(now, target, events);
            }
            SpecialAttack::HeavyStrike => match self.tuning.heavy_attack {
                Some(heavy) => events.push(CombatEvent::HeavyStrike {
                    source: self.core.id,
                    center: target,
                    damage: self.current_damage() * heavy.damage_factor,
                    radius: heavy.radius,
                }),
                None => self.spread(events),
            },
        }
    }

    /// Fire any burst shots due at `now`, each aimed at the target.
    fn tick_burst(&mut self, now: f32, target: Vec2, events: &mut Vec<CombatEvent>) {
        let Some(burst) = self.burst.as_mut() else {
            return;
        };
        let due = burst.take_due(now);
        let finished = burst.is_finished();
        if due > 0 {
            self.core.face(target);
            let damage = self.current_damage();
            for _ in 0..due {
                self.core.fire_volley(self.tuning.fire_points, damage, events);
            }
        }
        if finished {
            self.burst = None;
        }
    }

    fn behave(&mut self, dt: f32, now: f32, target: Vec2, events: &mut Vec<CombatEvent>) {
        match self.state {
            BossState::Idle | BossState::Dead => self.core.stop(),
            BossState::Approach => {
                let range = self.core.definition.attack_range * BOSS_APPROACH_RANGE_FACTOR;
                if self.core.distance_to(target) > range {
                    let speed = self.current_move_speed();
                    self.core.move_towards(target, speed);
                } else {
                    self.core.stop();
                }
                self.core.look_towards(target, dt);
            }
            BossState::Attack => {
                self.core.stop();
                self.core.look_towards(target, dt);
                self.try_regular_fire(now, events);
            }
            BossState::SpecialAttack => {
                // Wind-up: hold still, no regular fire.
                self.core.stop();
            }
            BossState::Retreat => {
                let away = (self.core.position - target).normalize_or_zero();
                let waypoint = self.core.position + away * BOSS_RETREAT_STEP_DISTANCE;
                let speed = self.current_move_speed();
                self.core.move_towards(waypoint, speed);
                self.core.look_towards(target, dt);
            }
            BossState::Circle => {
                let toward = (target - self.core.position).normalize_or_zero();
                let orbit = target + toward.perp() * self.core.definition.attack_range;
                let speed = self.current_move_speed();
                self.core.move_towards(orbit, speed);
                self.core.look_towards(target, dt);
                self.try_regular_fire(now, events);
            }
        }
    }
}

impl Combatant for Boss {
    fn id(&self) -> CombatantId {
        self.core.id
    }

    fn core(&self) -> &CombatantCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CombatantCore {
        &mut self.core
    }

    fn ai_state(&self) -> AiState {
        AiState::Boss(self.state)
    }

    fn phase(&self) -> u32 {
        self.phase
    }

    fn update(
        &mut self,
        dt: f32,
        now: f32,
        target: Option<Vec2>,
        rng: &mut dyn RngCore,
        events: &mut Vec<CombatEvent>,
    ) {
        if self.core.is_dead() {
            return;
        }
        self.core.tick_flash(dt, events);
        self.tick_phase_flash(dt, events);

        let Some(target) = target else {
            self.core.stop();
            if self.burst.take().is_some() {
                debug!("Boss {} lost its target, burst abandoned", self.core.id.0);
            }
            return;
        };

        self.check_phase(events);

        if !self.engaged {
            self.engaged = true;
            self.next_special_time = now + self.tuning.special_cooldown_secs;
            self.change_state(BossState::Approach, events);
        } else {
            self.core.state_timer += dt;
            let attack_timed_out = self.state == BossState::Attack
                && self.core.state_timer > BOSS_ATTACK_TIMEOUT_SECS;
            let ctx = BossContext {
                state: self.state,
                distance_to_target: self.core.distance_to(target),
                elapsed_in_state_secs: self.core.state_timer,
                now,
                next_special_time: self.next_special_time,
                attack_range: self.core.definition.attack_range,
                special_pending: self.burst.is_some(),
                prefer_circle: attack_timed_out && rng.gen_bool(0.5),
            };
            if let Some(next) = evaluate_transition(&ctx) {
                let leaving_wind_up = self.state == BossState::SpecialAttack;
                self.change_state(next, events);
                if leaving_wind_up {
                    self.perform_special(now, target, events);
                    self.next_special_time = now + self.tuning.special_cooldown_secs;
                }
            }
        }

        self.behave(dt, now, target, events);
        self.tick_burst(now, target, events);
    }

    fn take_damage(&mut self, amount: f32, events: &mut Vec<CombatEvent>) -> DamageOutcome {
        let outcome = self.core.apply_damage(amount, events);
        if outcome == DamageOutcome::Killed {
            self.burst = None;
            self.phase_flash = None;
            self.change_state(BossState::Dead, events);
            info!("Boss {} destroyed", self.core.id.0);
            events.push(CombatEvent::Died {
                notice: self
                    .core
                    .death_notice(self.tuning.xp_multiplier, self.tuning.currency_multiplier),
            });
        }
        outcome
    }
}
