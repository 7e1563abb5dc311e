//! State shared by every combatant: health, pose, fire gate and hit flash.
//!
//! The behavior machines in `enemy` and `boss` wrap a `CombatantCore` and
//! drive it. The core only writes a desired velocity and facing; the host
//! integrates position.

use std::sync::Arc;

use glam::Vec2;
use rand::RngCore;

use tankalore_core::constants::*;
use tankalore_core::definitions::CombatantDefinition;
use tankalore_core::enums::{FlashKind, OwnerTag, SpawnTier};
use tankalore_core::events::{AiState, CombatEvent, DeathNotice, ProjectileRequest};
use tankalore_core::stats::Health;
use tankalore_core::types::{facing_direction, facing_toward, rotate_towards, CombatantId};

/// Result of a `take_damage` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead; nothing happened.
    Ignored,
    Survived,
    /// This hit was the killing blow.
    Killed,
}

/// The common surface the host uses for both enemy kinds.
pub trait Combatant {
    fn id(&self) -> CombatantId;

    fn core(&self) -> &CombatantCore;

    fn core_mut(&mut self) -> &mut CombatantCore;

    fn ai_state(&self) -> AiState;

    /// Boss phase ordinal; rank-and-file are always phase 1.
    fn phase(&self) -> u32 {
        1
    }

    /// Advance one tick against an optional target position.
    fn update(
        &mut self,
        dt: f32,
        now: f32,
        target: Option<Vec2>,
        rng: &mut dyn RngCore,
        events: &mut Vec<CombatEvent>,
    );

    fn take_damage(&mut self, amount: f32, events: &mut Vec<CombatEvent>) -> DamageOutcome;

    fn is_dead(&self) -> bool {
        self.core().is_dead()
    }

    fn health_fraction(&self) -> f32 {
        self.core().health_fraction()
    }
}

#[derive(Debug, Clone)]
pub struct CombatantCore {
    pub id: CombatantId,
    pub definition: Arc<CombatantDefinition>,
    pub tier: SpawnTier,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing angle (degrees, 0 = +Y).
    pub facing_deg: f32,
    /// Seconds since the last state change.
    pub state_timer: f32,
    health: Health,
    next_fire_time: f32,
    hit_flash_remaining: Option<f32>,
    dead: bool,
}

impl CombatantCore {
    pub fn new(
        id: CombatantId,
        definition: Arc<CombatantDefinition>,
        tier: SpawnTier,
        position: Vec2,
    ) -> Self {
        let health = Health::new(definition.max_health);
        Self {
            id,
            definition,
            tier,
            position,
            velocity: Vec2::ZERO,
            facing_deg: 0.0,
            state_timer: 0.0,
            health,
            next_fire_time: 0.0,
            hit_flash_remaining: None,
            dead: false,
        }
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn current_health(&self) -> f32 {
        self.health.current
    }

    pub fn health_fraction(&self) -> f32 {
        self.health.fraction()
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Heal without ever reviving.
    pub fn heal(&mut self, amount: f32) {
        if !self.dead {
            self.health.heal(amount);
        }
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Subtract health, start the hit flash and latch death.
    pub fn apply_damage(&mut self, amount: f32, events: &mut Vec<CombatEvent>) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        self.health.apply_damage(amount);
        if self.hit_flash_remaining.is_none() {
            events.push(CombatEvent::Flash {
                source: self.id,
                kind: FlashKind::Hit,
                on: true,
            });
        }
        self.hit_flash_remaining = Some(HIT_FLASH_SECS);

        if self.health.is_depleted() {
            self.dead = true;
            self.velocity = Vec2::ZERO;
            self.hit_flash_remaining = None;
            return DamageOutcome::Killed;
        }
        DamageOutcome::Survived
    }

    /// Build the death notice with the given reward multipliers.
    pub fn death_notice(&self, xp_multiplier: u32, currency_multiplier: u32) -> DeathNotice {
        DeathNotice {
            id: self.id,
            tier: self.tier,
            xp_reward: self.definition.xp_reward.saturating_mul(xp_multiplier),
            currency_reward: self
                .definition
                .currency_reward
                .saturating_mul(currency_multiplier),
            position: self.position,
        }
    }

    /// Count down the hit flash and switch it off when it expires.
    pub fn tick_flash(&mut self, dt: f32, events: &mut Vec<CombatEvent>) {
        if let Some(remaining) = self.hit_flash_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.hit_flash_remaining = None;
                events.push(CombatEvent::Flash {
                    source: self.id,
                    kind: FlashKind::Hit,
                    on: false,
                });
            }
        }
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Head straight for `point` at `speed`.
    pub fn move_towards(&mut self, point: Vec2, speed: f32) {
        self.velocity = (point - self.position).normalize_or_zero() * speed.max(0.0);
    }

    /// Turn toward `point` at the fixed turn rate.
    pub fn look_towards(&mut self, point: Vec2, dt: f32) {
        if let Some(target_deg) = facing_toward(self.position, point) {
            self.facing_deg =
                rotate_towards(self.facing_deg, target_deg, COMBATANT_TURN_RATE_DEG * dt);
        }
    }

    /// Snap the facing onto `point`.
    pub fn face(&mut self, point: Vec2) {
        if let Some(target_deg) = facing_toward(self.position, point) {
            self.facing_deg = target_deg;
        }
    }

    pub fn facing(&self) -> Vec2 {
        facing_direction(self.facing_deg)
    }

    /// Whether the fire gate is open at `now`.
    pub fn can_fire(&self, now: f32) -> bool {
        now >= self.next_fire_time
    }

    /// Close the fire gate for `interval` seconds. An infinite interval never
    /// reopens it.
    pub fn rearm_fire(&mut self, now: f32, interval: f32) {
        self.next_fire_time = now + interval;
    }

    /// Emit one projectile from `origin` along `direction`.
    pub fn emit_projectile(
        &self,
        origin: Vec2,
        direction: Vec2,
        damage: f32,
        events: &mut Vec<CombatEvent>,
    ) {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        events.push(CombatEvent::ProjectileSpawned {
            source: self.id,
            request: ProjectileRequest {
                origin,
                direction,
                damage,
                speed: self.definition.projectile_speed,
                max_range: self.definition.attack_range,
                owner: OwnerTag::Enemy,
            },
        });
    }

    /// Muzzle positions for `count` fire points spread across the facing.
    pub fn fire_points(&self, count: u32) -> Vec<Vec2> {
        let forward = self.facing();
        let lateral = forward.perp();
        let muzzle = self.position + forward * FIRE_POINT_FORWARD_OFFSET;
        let count = count.max(1);
        let span = (count - 1) as f32 * FIRE_POINT_SPACING;
        (0..count)
            .map(|i| muzzle + lateral * (i as f32 * FIRE_POINT_SPACING - span / 2.0))
            .collect()
    }

    /// Fire one shot from every fire point along the current facing.
    pub fn fire_volley(&self, fire_points: u32, damage: f32, events: &mut Vec<CombatEvent>) {
        let direction = self.facing();
        for origin in self.fire_points(fire_points) {
            self.emit_projectile(origin, direction, damage, events);
        }
    }

    /// Reset the state timer on a transition.
    pub fn reset_state_timer(&mut self) {
        self.state_timer = 0.0;
    }
}
