use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Shared view of the rotation interval.
///
/// Read on every arm and written only when an operator changes the cut time,
/// so the value is a single atomic: readers always see a consistent snapshot
/// without taking a lock on the timer path.
#[derive(Debug)]
pub struct RotationSchedule {
    minutes: AtomicU64,
}

impl RotationSchedule {
    /// Creates a schedule with the given interval in minutes.
    pub fn new(minutes: u64) -> Self {
        Self {
            minutes: AtomicU64::new(minutes),
        }
    }

    /// Current interval in minutes.
    pub fn minutes(&self) -> u64 {
        self.minutes.load(Ordering::Acquire)
    }

    /// Replaces the interval. Callers validate that `minutes` is non-zero.
    pub fn set_minutes(&self, minutes: u64) {
        self.minutes.store(minutes, Ordering::Release);
    }

    /// Current interval as a [`Duration`].
    ///
    /// Saturates at `u64::MAX` seconds so an absurdly large configured
    /// interval never wraps into a short or zero duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.minutes().saturating_mul(60))
    }
}
