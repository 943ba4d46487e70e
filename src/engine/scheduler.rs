//! Speed-governed step timers.
//!
//! Every suspension arms one timer task that sleeps for the current step delay
//! and then posts a [`Wakeup`] back to the controller. The handle is recorded in
//! `RunState`; a wake-up whose handle is no longer recorded is stale and must be
//! dropped by the receiver without any effect.

use crate::engine::state::{RunState, TimerHandle};
use crate::model::SpeedLevel;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Inter-step delay in milliseconds, indexed by `speed - 1`.
const STEP_DELAYS_MS: [u64; 10] = [500, 400, 300, 200, 100, 50, 25, 10, 5, 1];

/// Identifies one run so wake-ups can never leak into a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub(crate) u64);

/// Posted by a timer task once its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub handle: TimerHandle,
    pub run: RunId,
}

pub fn step_delay(speed: SpeedLevel) -> Duration {
    Duration::from_millis(STEP_DELAYS_MS[usize::from(speed.get() - 1)])
}

pub struct StepScheduler {
    next_handle: u64,
    wake_tx: UnboundedSender<Wakeup>,
}

impl StepScheduler {
    pub fn new(wake_tx: UnboundedSender<Wakeup>) -> Self {
        Self {
            next_handle: 0,
            wake_tx,
        }
    }

    pub fn delay(&self, state: &RunState) -> Duration {
        step_delay(state.speed)
    }

    /// Arm a timer for `run` after the current delay and register its handle.
    pub fn schedule(&mut self, state: &mut RunState, run: RunId) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let delay = self.delay(state);
        let tx = self.wake_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The controller may already be gone on shutdown.
            let _ = tx.send(Wakeup { handle, run });
        });
        let _ = state
            .outstanding_timers
            .insert(handle, task.abort_handle());
        tracing::trace!(handle = handle.0, ?delay, "armed step timer");
        handle
    }

    /// Suspend the active step sequence of `run`.
    ///
    /// The continuation resumes only when the returned handle's wake-up is
    /// accepted by [`StepScheduler::resume`]; after [`StepScheduler::cancel_all`]
    /// it never is.
    pub fn suspend(&mut self, state: &mut RunState, run: RunId) -> TimerHandle {
        debug_assert!(
            state.outstanding_timers.is_empty(),
            "only one suspension may be pending at a time"
        );
        self.schedule(state, run)
    }

    /// Retire the handle of a delivered wake-up.
    ///
    /// Returns `false` when the handle was cancelled (or already retired), in
    /// which case the wake-up must be ignored.
    pub fn resume(&mut self, state: &mut RunState, wake: Wakeup) -> bool {
        state.outstanding_timers.remove(&wake.handle).is_some()
    }

    /// Abort and forget every outstanding timer.
    pub fn cancel_all(&mut self, state: &mut RunState) {
        let count = state.outstanding_timers.len();
        for (_, task) in state.outstanding_timers.drain() {
            task.abort();
        }
        if count > 0 {
            tracing::debug!(count, "cancelled outstanding step timers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    fn state_with_speed(level: u8) -> RunState {
        RunState::new(0, SpeedLevel::new(level).unwrap(), None)
    }

    #[test]
    fn delay_table_matches_speed_levels() {
        let expected = [500, 400, 300, 200, 100, 50, 25, 10, 5, 1];
        for (i, ms) in expected.iter().enumerate() {
            let level = SpeedLevel::new(i as u8 + 1).unwrap();
            assert_eq!(step_delay(level), Duration::from_millis(*ms));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn suspension_resolves_after_current_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = StepScheduler::new(tx);
        let mut state = state_with_speed(1);

        let started = Instant::now();
        let handle = scheduler.suspend(&mut state, RunId(1));
        assert_eq!(state.outstanding_timers(), 1);

        let wake = rx.recv().await.unwrap();
        assert_eq!(wake.handle, handle);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert!(scheduler.resume(&mut state, wake));
        assert_eq!(state.outstanding_timers(), 0);
        // A second delivery of the same handle is stale.
        assert!(!scheduler.resume(&mut state, wake));
    }

    #[tokio::test(start_paused = true)]
    async fn fastest_speed_uses_one_millisecond() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = StepScheduler::new(tx);
        let mut state = state_with_speed(10);

        let started = Instant::now();
        let _ = scheduler.suspend(&mut state, RunId(1));
        let _ = rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timers_never_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = StepScheduler::new(tx);
        let mut state = state_with_speed(5);

        let first = scheduler.schedule(&mut state, RunId(1));
        let second = scheduler.schedule(&mut state, RunId(1));
        assert_ne!(first, second);
        scheduler.cancel_all(&mut state);
        assert_eq!(state.outstanding_timers(), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        // Even a wake-up that slipped out before the abort is rejected.
        let late = Wakeup {
            handle: first,
            run: RunId(1),
        };
        assert!(!scheduler.resume(&mut state, late));
    }
}
