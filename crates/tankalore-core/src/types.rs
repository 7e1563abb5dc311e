//! Fundamental geometric and simulation types.
//!
//! Positions are `glam::Vec2` in world units, x = right, y = up.
//! Facing angles follow the sprite convention: 0° points along +Y and
//! angles grow counter-clockwise.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of a spawned combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f32,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f32 {
        crate::constants::DT
    }

    /// Advance by one tick. Elapsed time is derived from the tick count so it
    /// never accumulates rounding drift.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = (self.tick as f64 * self.dt() as f64) as f32;
    }
}

/// Seconds between actions at the given rate. A non-positive or non-finite
/// rate never acts.
pub fn interval_for_rate(rate: f32) -> f32 {
    if rate > 0.0 && rate.is_finite() {
        1.0 / rate
    } else {
        f32::INFINITY
    }
}

/// Facing angle (degrees) that points from `from` toward `to`, or `None`
/// when the points coincide.
pub fn facing_toward(from: Vec2, to: Vec2) -> Option<f32> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    Some(dir.y.atan2(dir.x).to_degrees() - 90.0)
}

/// Unit direction for a facing angle (degrees).
pub fn facing_direction(facing_deg: f32) -> Vec2 {
    Vec2::from_angle((facing_deg + 90.0).to_radians())
}

/// Rotate `current` toward `target` by at most `max_step` degrees along the
/// shortest arc. Result is normalised to `(-180, 180]`.
pub fn rotate_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = wrap_degrees(target - current);
    let step = delta.clamp(-max_step.abs(), max_step.abs());
    wrap_degrees(current + step)
}

/// Normalise an angle to `(-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Point at `angle_rad` on a circle of `radius` around `center`.
pub fn point_on_circle(center: Vec2, angle_rad: f32, radius: f32) -> Vec2 {
    center + Vec2::from_angle(angle_rad) * radius
}
