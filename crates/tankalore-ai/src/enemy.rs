//! Rank-and-file behavior state machine.
//!
//! `evaluate_transition` is a pure function over distance, health and the
//! state timer. `Enemy` owns the runtime state and runs one tick as:
//! timer, transition, behavior.

use std::sync::Arc;

use glam::Vec2;
use log::debug;
use rand::{Rng, RngCore};

use tankalore_core::constants::*;
use tankalore_core::definitions::CombatantDefinition;
use tankalore_core::enums::{CombatantState, SpawnTier};
use tankalore_core::events::{AiState, CombatEvent};
use tankalore_core::types::{point_on_circle, CombatantId};

use crate::combatant::{Combatant, CombatantCore, DamageOutcome};

/// Input to the transition table for one combatant.
pub struct EnemyContext<'a> {
    pub state: CombatantState,
    pub distance_to_target: f32,
    pub health_fraction: f32,
    pub elapsed_in_state_secs: f32,
    pub definition: &'a CombatantDefinition,
}

/// Next state for the given situation, or `None` to stay.
pub fn evaluate_transition(ctx: &EnemyContext) -> Option<CombatantState> {
    let def = ctx.definition;
    let d = ctx.distance_to_target;
    match ctx.state {
        CombatantState::Patrol if d <= def.detection_range => Some(CombatantState::Pursue),
        CombatantState::Pursue if d > def.aggro_range => Some(CombatantState::Patrol),
        CombatantState::Pursue if d <= def.attack_range => Some(CombatantState::Attack),
        CombatantState::Attack if d > def.attack_range => Some(CombatantState::Pursue),
        CombatantState::Attack if ctx.health_fraction <= def.retreat_health_fraction => {
            Some(CombatantState::Retreat)
        }
        CombatantState::Retreat if ctx.elapsed_in_state_secs > RETREAT_DURATION_SECS => {
            Some(CombatantState::Pursue)
        }
        _ => None,
    }
}

/// Patrol bookkeeping: the annulus centre and the current waypoint.
#[derive(Debug, Clone)]
struct PatrolRoute {
    anchor: Vec2,
    waypoint: Vec2,
    retarget_at: f32,
}

impl PatrolRoute {
    fn retarget(&mut self, now: f32, rng: &mut dyn RngCore) {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = rng.gen_range(PATROL_RADIUS_MIN..PATROL_RADIUS_MAX);
        self.waypoint = point_on_circle(self.anchor, angle, radius);
        self.retarget_at = now + PATROL_RETARGET_SECS;
    }
}

/// A rank-and-file combatant.
#[derive(Debug, Clone)]
pub struct Enemy {
    core: CombatantCore,
    state: CombatantState,
    patrol: PatrolRoute,
}

impl Enemy {
    /// Spawn at `position`. The first patrol waypoint is picked on the
    /// first update.
    pub fn new(id: CombatantId, definition: Arc<CombatantDefinition>, position: Vec2) -> Self {
        Self {
            core: CombatantCore::new(id, definition, SpawnTier::Regular, position),
            state: CombatantState::Patrol,
            patrol: PatrolRoute {
                anchor: position,
                waypoint: position,
                retarget_at: f32::NEG_INFINITY,
            },
        }
    }

    pub fn state(&self) -> CombatantState {
        self.state
    }

    pub fn patrol_waypoint(&self) -> Vec2 {
        self.patrol.waypoint
    }

    fn change_state(&mut self, next: CombatantState, events: &mut Vec<CombatEvent>) {
        if next == self.state {
            return;
        }
        debug!(
            "Combatant {} ({}): {:?} -> {:?}",
            self.core.id.0, self.core.definition.name, self.state, next
        );
        events.push(CombatEvent::StateChanged {
            source: self.core.id,
            from: AiState::Enemy(self.state),
            to: AiState::Enemy(next),
        });
        self.state = next;
        self.core.reset_state_timer();
    }

    fn patrol(&mut self, dt: f32, now: f32, target: Vec2, rng: &mut dyn RngCore) {
        let arrived = self.core.distance_to(self.patrol.waypoint) < PATROL_ARRIVAL_RADIUS;
        if arrived || now >= self.patrol.retarget_at {
            self.patrol.retarget(now, rng);
        }
        let speed = self.core.definition.movement_speed;
        self.core.move_towards(self.patrol.waypoint, speed);
        if self.core.state_timer > PATROL_LOOK_AROUND_SECS {
            self.core.look_towards(target, dt);
        }
    }

    fn pursue(&mut self, dt: f32, target: Vec2) {
        let speed = self.core.definition.movement_speed;
        self.core.move_towards(target, speed);
        self.core.look_towards(target, dt);
    }

    fn attack(&mut self, dt: f32, now: f32, target: Vec2, events: &mut Vec<CombatEvent>) {
        self.core.stop();
        self.core.look_towards(target, dt);
        let interval = self.core.definition.fire_interval();
        if interval.is_finite() && self.core.can_fire(now) {
            let damage = self.core.definition.damage;
            self.core.fire_volley(1, damage, events);
            self.core.rearm_fire(now, interval);
        }
    }

    fn retreat(&mut self, dt: f32, target: Vec2) {
        let away = (self.core.position - target).normalize_or_zero();
        let waypoint = self.core.position + away * RETREAT_STEP_DISTANCE;
        let speed = self.core.definition.movement_speed;
        self.core.move_towards(waypoint, speed);
        self.core.look_towards(target, dt);
    }
}

impl Combatant for Enemy {
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
        AiState::Enemy(self.state)
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

        let Some(target) = target else {
            self.core.stop();
            return;
        };

        self.core.state_timer += dt;

        let ctx = EnemyContext {
            state: self.state,
            distance_to_target: self.core.distance_to(target),
            health_fraction: self.core.health_fraction(),
            elapsed_in_state_secs: self.core.state_timer,
            definition: &self.core.definition,
        };
        if let Some(next) = evaluate_transition(&ctx) {
            self.change_state(next, events);
        }

        match self.state {
            CombatantState::Patrol => self.patrol(dt, now, target, rng),
            CombatantState::Pursue => self.pursue(dt, target),
            CombatantState::Attack => self.attack(dt, now, target, events),
            CombatantState::Retreat => self.retreat(dt, target),
            CombatantState::Dead => self.core.stop(),
        }
    }

    fn take_damage(&mut self, amount: f32, events: &mut Vec<CombatEvent>) -> DamageOutcome {
        let outcome = self.core.apply_damage(amount, events);
        match outcome {
            DamageOutcome::Killed => {
                self.change_state(CombatantState::Dead, events);
                events.push(CombatEvent::Died {
                    notice: self.core.death_notice(1, 1),
                });
            }
            DamageOutcome::Survived if self.state == CombatantState::Patrol => {
                self.change_state(CombatantState::Pursue, events);
            }
            _ => {}
        }
        outcome
    }
}
