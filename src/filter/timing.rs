//! Report timing: monotonic stopwatch and the smoothed report interval

use std::time::{Duration, Instant};

pub const SEED_INTERVAL_MS: f32 = 5.0;

/// Gaps at or above this are stalls (pen lifted) and are not averaged
pub const STALL_THRESHOLD_MS: f32 = 150.0;

pub const SMOOTHING_FACTOR: f32 = 0.1;

/// Monotonic clock restarted on every positional report
pub trait Stopwatch: Send {
    // time since the previous restart, or since start
    fn restart(&mut self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct MonotonicStopwatch {
    started: Instant,
}

impl MonotonicStopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for MonotonicStopwatch {
    fn default() -> Self {
        Self::start()
    }
}

impl Stopwatch for MonotonicStopwatch {
    fn restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.started);
        self.started = now;
        elapsed
    }
}

/// Exponentially smoothed time between consumed reports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportIntervalAverage {
    average_ms: f32,
}

impl ReportIntervalAverage {
    pub fn new(seed_ms: f32) -> Self {
        Self {
            average_ms: seed_ms,
        }
    }

    /// Returns `false` when the gap was a stall and got ignored
    pub fn fold(&mut self, delta: Duration) -> bool {
        let delta_ms = delta.as_secs_f32() * 1000.0;
        if delta_ms < STALL_THRESHOLD_MS {
            self.average_ms += (delta_ms - self.average_ms) * SMOOTHING_FACTOR;
            true
        } else {
            false
        }
    }

    pub fn average_ms(&self) -> f32 {
        self.average_ms
    }
}

impl Default for ReportIntervalAverage {
    fn default() -> Self {
        Self::new(SEED_INTERVAL_MS)
    }
}
