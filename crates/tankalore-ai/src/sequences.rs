//! Explicit timer state for multi-tick effects.
//!
//! Each sequence is advanced once per tick by its owner. Dropping the owner
//! drops the sequence with no further output.

/// A finite on/off pulse train. Edge `k` fires at `k * half_period`;
/// even edges switch on, odd edges switch off.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseSequence {
    pulses: u32,
    half_period: f32,
    elapsed: f32,
    edges_emitted: u32,
}

impl PulseSequence {
    pub fn new(pulses: u32, half_period: f32) -> Self {
        Self {
            pulses,
            half_period: half_period.max(0.0),
            elapsed: 0.0,
            edges_emitted: 0,
        }
    }

    fn total_edges(&self) -> u32 {
        self.pulses * 2
    }

    pub fn is_finished(&self) -> bool {
        self.edges_emitted >= self.total_edges()
    }

    /// Advance by `dt` and report every edge crossed, in order.
    pub fn advance(&mut self, dt: f32, mut on_edge: impl FnMut(bool)) {
        self.elapsed += dt.max(0.0);
        while !self.is_finished() && self.edges_emitted as f32 * self.half_period <= self.elapsed {
            on_edge(self.edges_emitted % 2 == 0);
            self.edges_emitted += 1;
        }
    }
}

/// A run of shots spaced by a fixed interval, the first one immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstSequence {
    shots_remaining: u32,
    interval: f32,
    next_shot_time: f32,
}

impl BurstSequence {
    pub fn new(shots: u32, interval: f32, now: f32) -> Self {
        Self {
            shots_remaining: shots,
            interval: interval.max(0.0),
            next_shot_time: now,
        }
    }

    pub fn shots_remaining(&self) -> u32 {
        self.shots_remaining
    }

    pub fn is_finished(&self) -> bool {
        self.shots_remaining == 0
    }

    /// Number of shots due at `now`. Consumes them.
    pub fn take_due(&mut self, now: f32) -> u32 {
        let mut due = 0;
        while self.shots_remaining > 0 && now >= self.next_shot_time {
            self.shots_remaining -= 1;
            self.next_shot_time += self.interval;
            due += 1;
            if self.interval == 0.0 {
                // Zero spacing releases the whole burst at once.
                due += self.shots_remaining;
                self.shots_remaining = 0;
            }
        }
        due
    }
}
