//! Origin-based elapsed-time tracking.
//!
//! Position is always derived fresh from a fixed origin instant, never
//! accumulated tick by tick, so polling cadence cannot introduce drift.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Clock {
    /// Instant at which position zero would have started.
    origin: Instant,
    /// Captured position while paused; `None` while running.
    frozen: Option<Duration>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            frozen: None,
        }
    }

    /// Re-derive the origin so the next `sample` reads `position`.
    pub fn reset(&mut self, position: Duration) {
        self.origin = Instant::now().checked_sub(position).unwrap_or_else(Instant::now);
        self.frozen = None;
    }

    /// Freeze the clock at `position` (pause).
    pub fn freeze(&mut self, position: Duration) {
        self.frozen = Some(position);
    }

    /// Resume from a frozen position, re-deriving the origin.
    pub fn resume(&mut self) {
        if let Some(p) = self.frozen.take() {
            self.origin = Instant::now().checked_sub(p).unwrap_or_else(Instant::now);
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Current position, clamped to `[0, limit]` when a limit is known.
    pub fn sample(&self, limit: Option<Duration>) -> Duration {
        let raw = self.frozen.unwrap_or_else(|| self.origin.elapsed());
        match limit {
            Some(l) => raw.min(l),
            None => raw,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
