//! Engine configuration.

use std::time::Duration;

/// Tuning knobs for the work loop and commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Yield once the slice has less than this much time left.
    pub yield_threshold: Duration,
    /// Hard cap on fibers processed per slice, on top of the time budget.
    pub max_units_per_slice: Option<usize>,
    /// Free unreachable fiber generations after every commit.
    pub sweep_stale_fibers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yield_threshold: Duration::from_millis(1),
            max_units_per_slice: None,
            sweep_stale_fibers: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_yield_threshold(mut self, threshold: Duration) -> Self {
        self.yield_threshold = threshold;
        self
    }

    pub fn with_max_units_per_slice(mut self, max: usize) -> Self {
        self.max_units_per_slice = Some(max.max(1));
        self
    }

    pub fn with_sweep_stale_fibers(mut self, sweep: bool) -> Self {
        self.sweep_stale_fibers = sweep;
        self
    }
}
