//! Session clock and the one-shot game-over latch.

use log::info;
use serde::{Deserialize, Serialize};

use tankalore_core::constants::SESSION_DURATION_SECS;
use tankalore_core::enums::GameOverReason;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Run length before the session ends on its own (seconds).
    pub duration_secs: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: SESSION_DURATION_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    elapsed_secs: f32,
    running: bool,
    ended: Option<GameOverReason>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            elapsed_secs: 0.0,
            running: false,
            ended: None,
        }
    }

    pub fn start(&mut self) {
        self.elapsed_secs = 0.0;
        self.running = true;
        self.ended = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_over(&self) -> bool {
        self.ended.is_some()
    }

    pub fn reason(&self) -> Option<GameOverReason> {
        self.ended
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> f32 {
        (self.config.duration_secs - self.elapsed_secs).max(0.0)
    }

    /// Advance the clock. Returns `true` once the time limit is reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_secs += dt;
        self.elapsed_secs >= self.config.duration_secs
    }

    /// Latch the game-over reason. Only the first call wins.
    pub fn end(&mut self, reason: GameOverReason) -> bool {
        if self.ended.is_some() {
            return false;
        }
        self.running = false;
        self.ended = Some(reason);
        info!(
            "Session ended ({:?}) after {:.1}s",
            reason, self.elapsed_secs
        );
        true
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
        self.running = false;
        self.ended = None;
    }
}
