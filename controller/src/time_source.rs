//! Time injection (spec §4.7, §9): the session driver never calls a global
//! clock directly. Ported from the source tree's
//! `FakeIncrementingMonotonicTimeSource` test double.

use std::time::{Duration, Instant};

/// A monotonic clock, abstracted so tests can supply a deterministic one.
pub trait TimeSource: Send + Sync {
    /// Elapsed time since some arbitrary fixed point in the past. Only
    /// differences between calls are meaningful.
    fn now(&self) -> Duration;
}

/// Wall-clock time source backed by `std::time::Instant`.
pub struct SystemTimeSource {
    epoch: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Deterministic test double: ticks forward one second on every call,
/// starting from one second past its own epoch.
#[derive(Default)]
pub struct FakeIncrementingTimeSource {
    ticks: std::sync::atomic::AtomicU64,
}

impl FakeIncrementingTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for FakeIncrementingTimeSource {
    fn now(&self) -> Duration {
        let tick = self.ticks.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        Duration::from_secs(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_time_source_ticks_one_second_per_call() {
        let source = FakeIncrementingTimeSource::new();
        assert_eq!(source.now(), Duration::from_secs(1));
        assert_eq!(source.now(), Duration::from_secs(2));
        assert_eq!(source.now(), Duration::from_secs(3));
    }
}
