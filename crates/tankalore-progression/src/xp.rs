use log::info;
use serde::{Deserialize, Serialize};

use tankalore_core::constants::*;

/// XP curve tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpConfig {
    pub base_required: u32,
    pub scaling: f32,
    pub max_level: u32,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            base_required: XP_BASE_REQUIRED,
            scaling: XP_SCALING,
            max_level: XP_MAX_LEVEL,
        }
    }
}

impl XpConfig {
    /// XP needed to advance past `level`: `round(base * scaling^(level - 1))`.
    pub fn required_for(&self, level: u32) -> u32 {
        let exponent = level.saturating_sub(1) as i32;
        (self.base_required as f32 * self.scaling.powi(exponent)).round() as u32
    }
}

/// Level and XP within one session.
#[derive(Debug, Clone)]
pub struct XpTracker {
    config: XpConfig,
    level: u32,
    xp: u32,
}

impl XpTracker {
    pub fn new(config: XpConfig) -> Self {
        Self {
            config,
            level: 1,
            xp: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn required(&self) -> u32 {
        self.config.required_for(self.level)
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.config.max_level
    }

    /// Progress toward the next level in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let required = self.required();
        if required == 0 {
            return 0.0;
        }
        (self.xp as f32 / required as f32).min(1.0)
    }

    /// Add XP and return every level reached, in order. Surplus carries over.
    /// XP gained at max level is discarded.
    pub fn add_xp(&mut self, amount: u32) -> Vec<u32> {
        let mut reached = Vec::new();
        if self.is_max_level() {
            return reached;
        }
        self.xp = self.xp.saturating_add(amount);
        while !self.is_max_level() {
            let required = self.required().max(1);
            if self.xp < required {
                break;
            }
            self.xp -= required;
            self.level += 1;
            info!("Level up: now level {}", self.level);
            reached.push(self.level);
        }
        reached
    }

    /// Start a session at `level` with no XP (meta-progression head start).
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(1, self.config.max_level.max(1));
        self.xp = 0;
    }

    pub fn reset(&mut self) {
        self.level = 1;
        self.xp = 0;
    }
}
