//! Timing helpers for the simulation passes.
//!
//! [`ProfilerScope`] logs its lifetime at `debug` level when dropped and
//! [`StepTimer`] accumulates per-step wall time for the end-of-run summary.
use std::time::Instant;
use tracing::debug;

/// A profiling scope that measures elapsed time using RAII.
///
/// The elapsed time is emitted as a `debug!` event when the scope is dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        debug!(scope = self.name, elapsed_ms = self.elapsed_ms(), "scope finished");
    }
}

/// Accumulates wall time of repeated steps.
#[derive(Debug, Clone, Default)]
pub struct StepTimer {
    count: usize,
    total_ms: f64,
    slowest_ms: f64,
}

impl StepTimer {
    /// Creates an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one step of `time_ms` milliseconds.
    pub fn record(&mut self, time_ms: f64) {
        self.count += 1;
        self.total_ms += time_ms;
        self.slowest_ms = self.slowest_ms.max(time_ms);
    }

    /// Number of recorded steps
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sum of all recorded steps (ms)
    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    /// Mean step time (ms), zero when nothing was recorded
    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }

    /// Longest recorded step (ms)
    pub fn slowest_ms(&self) -> f64 {
        self.slowest_ms
    }
}
