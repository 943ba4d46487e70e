//! Shared run-state record.
//!
//! `RunState` is owned by the controller and passed by `&mut` to whichever
//! component needs it, so every mutation has a single owner at a time.

use crate::model::{AlgorithmId, SpeedLevel};
use std::collections::HashMap;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Identifies one armed step timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub(crate) u64);

/// Where the controller's state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Sorted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub comparisons: u64,
    pub swaps: u64,
}

#[derive(Debug)]
pub struct RunState {
    pub array: Vec<u32>,
    pub size: usize,
    pub speed: SpeedLevel,
    pub algorithm: Option<AlgorithmId>,
    pub counters: Counters,
    pub started_at: Option<Instant>,
    phase: RunPhase,
    pub(crate) outstanding_timers: HashMap<TimerHandle, AbortHandle>,
}

impl RunState {
    pub fn new(size: usize, speed: SpeedLevel, algorithm: Option<AlgorithmId>) -> Self {
        Self {
            array: Vec::new(),
            size,
            speed,
            algorithm,
            counters: Counters::default(),
            started_at: None,
            phase: RunPhase::Idle,
            outstanding_timers: HashMap::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// The cooperative cancellation token: checked at every suspension point.
    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    #[cfg(test)]
    pub fn outstanding_timers(&self) -> usize {
        self.outstanding_timers.len()
    }

    /// Install a freshly generated array and return to Idle with zeroed counters.
    pub fn replace_array(&mut self, array: Vec<u32>) {
        self.size = array.len();
        self.array = array;
        self.counters = Counters::default();
        self.started_at = None;
        self.phase = RunPhase::Idle;
    }

    pub(crate) fn begin_run(&mut self, now: Instant) {
        self.counters = Counters::default();
        self.started_at = Some(now);
        self.phase = RunPhase::Running;
    }

    pub(crate) fn record(&mut self, counters: Counters) {
        debug_assert!(counters.comparisons >= self.counters.comparisons);
        debug_assert!(counters.swaps >= self.counters.swaps);
        self.counters = counters;
    }

    pub(crate) fn end_run(&mut self, phase: RunPhase) {
        debug_assert!(phase != RunPhase::Running);
        self.phase = phase;
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        self.started_at
            .map(|t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX))
    }
}
