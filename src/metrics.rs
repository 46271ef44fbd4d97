//! Optional scheduler metrics, compiled in with the `metrics` feature.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal counters updated by workers and fibers.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Tasks that ran to completion (including panicked ones).
    pub tasks_executed: AtomicU64,
    /// `wait_for_counter` calls that parked a fiber.
    pub waits_parked: AtomicU64,
    /// Parked fibers resumed after their counter met its target.
    pub waiters_resumed: AtomicU64,
    /// Fibers currently out of the pool.
    pub fibers_in_flight: AtomicU64,
    /// High-water mark of `fibers_in_flight`.
    pub peak_fibers_in_flight: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Metrics::default()
    }

    pub(crate) fn note_fiber_acquired(&self) {
        let in_flight = self.fibers_in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_fibers_in_flight
            .fetch_max(in_flight, Ordering::Relaxed);
    }

    pub(crate) fn note_fiber_released(&self) {
        self.fibers_in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of all metric values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            waits_parked: self.waits_parked.load(Ordering::Relaxed),
            waiters_resumed: self.waiters_resumed.load(Ordering::Relaxed),
            fibers_in_flight: self.fibers_in_flight.load(Ordering::Relaxed),
            peak_fibers_in_flight: self.peak_fibers_in_flight.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of scheduler metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub tasks_executed: u64,
    pub waits_parked: u64,
    pub waiters_resumed: u64,
    pub fibers_in_flight: u64,
    pub peak_fibers_in_flight: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiber_peak_tracking() {
        let metrics = Metrics::new();
        metrics.note_fiber_acquired();
        metrics.note_fiber_acquired();
        metrics.note_fiber_released();
        metrics.note_fiber_acquired();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fibers_in_flight, 2);
        assert_eq!(snapshot.peak_fibers_in_flight, 2);
    }
}
