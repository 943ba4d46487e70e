//! Run lifecycle controller.
//!
//! Owns generate/start/cancel/finish orchestration and the
//! Idle -> Running -> Sorted state machine, and emits events for presentation
//! layers. Algorithm steps and timer wake-ups are both handled on the
//! controller task, so the run-state never needs a lock.

use crate::engine::{
    sequence_for, Progress, RunId, RunPhase, RunState, StepScheduler, StepSequence,
    TimerHandle, Wakeup, Workspace,
};
use crate::error::EngineError;
use crate::model::{AlgorithmId, InfoEvent, RunConfig, RunSummary, SpeedLevel, Status, VizEvent};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

/// Commands emitted by UI layers to control the engine.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    /// Regenerate the array; `None` keeps the current size.
    Generate { size: Option<usize> },
    SetSpeed(u8),
    Select(AlgorithmId),
    Start,
    Cancel,
    Quit,
}

/// The one step sequence allowed to be active.
struct ActiveRun {
    id: RunId,
    algorithm: AlgorithmId,
    input: Vec<u32>,
    sequence: Box<dyn StepSequence<u32>>,
    workspace: Workspace<u32>,
    pending: Option<TimerHandle>,
}

pub(crate) struct RunController {
    cfg: RunConfig,
    state: RunState,
    scheduler: StepScheduler,
    active: Option<ActiveRun>,
    next_run: u64,
    rng: StdRng,
    event_tx: UnboundedSender<VizEvent>,
}

// Presentation layers may hang up first; events are then simply dropped.
fn emit(tx: &UnboundedSender<VizEvent>, ev: VizEvent) {
    let _ = tx.send(ev);
}

impl RunController {
    pub(crate) fn new(
        cfg: RunConfig,
        event_tx: UnboundedSender<VizEvent>,
        wake_tx: UnboundedSender<Wakeup>,
    ) -> Result<Self, EngineError> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            state: RunState::new(cfg.size, cfg.speed, cfg.algorithm),
            scheduler: StepScheduler::new(wake_tx),
            active: None,
            next_run: 0,
            rng,
            event_tx,
            cfg,
        })
    }

    pub(crate) fn state(&self) -> &RunState {
        &self.state
    }

    /// Replace the array with `size` fresh values in `[min_value, max_value]`.
    ///
    /// An active run is cancelled first.
    pub(crate) fn generate_array(&mut self, size: usize) {
        let (min, max) = (self.cfg.min_value, self.cfg.max_value);
        let values: Vec<u32> = (0..size).map(|_| self.rng.gen_range(min..=max)).collect();
        self.load_array(values);
        emit(&self.event_tx, VizEvent::Info(InfoEvent::Generated { size }));
    }

    /// Install `values` as the current array, cancelling any active run.
    pub(crate) fn load_array(&mut self, values: Vec<u32>) {
        self.cancel_run();
        self.state.replace_array(values);
        tracing::debug!(size = self.state.size, "array replaced");
        emit(
            &self.event_tx,
            VizEvent::Render {
                values: self.state.array.clone(),
                highlight: Vec::new(),
            },
        );
        emit(
            &self.event_tx,
            VizEvent::Stats {
                comparisons: 0,
                swaps: 0,
                elapsed_ms: None,
            },
        );
        emit(&self.event_tx, VizEvent::Status(Status::Ready));
    }

    /// Change the step delay; takes effect from the next suspension.
    pub(crate) fn set_speed(&mut self, level: u8) -> Result<(), EngineError> {
        let speed = SpeedLevel::new(level)?;
        self.state.speed = speed;
        emit(
            &self.event_tx,
            VizEvent::Info(InfoEvent::SpeedChanged { speed }),
        );
        Ok(())
    }

    /// Choose the algorithm for the next run; an active run is unaffected.
    pub(crate) fn select_algorithm(&mut self, algorithm: AlgorithmId) {
        self.state.algorithm = Some(algorithm);
        emit(
            &self.event_tx,
            VizEvent::Info(InfoEvent::AlgorithmSelected { algorithm }),
        );
    }

    /// Enter Running with a fresh working copy. Returns `false` (and does
    /// nothing) when a run is already active or no algorithm is selected.
    pub(crate) fn start_run(&mut self) -> bool {
        if self.state.is_running() {
            tracing::debug!("start ignored: already running");
            return false;
        }
        let Some(algorithm) = self.state.algorithm else {
            tracing::debug!("start ignored: no algorithm selected");
            return false;
        };

        let id = RunId(self.next_run);
        self.next_run += 1;
        self.state.begin_run(Instant::now());

        let input = self.state.array.clone();
        let workspace = Workspace::new(input.clone());
        let sequence = sequence_for::<u32>(algorithm, workspace.len());
        self.active = Some(ActiveRun {
            id,
            algorithm,
            input,
            sequence,
            workspace,
            pending: None,
        });
        tracing::info!(run = id.0, %algorithm, size = self.state.size, "run started");

        emit(&self.event_tx, VizEvent::Status(Status::Sorting));
        emit(
            &self.event_tx,
            VizEvent::Stats {
                comparisons: 0,
                swaps: 0,
                elapsed_ms: self.state.elapsed_ms(),
            },
        );
        self.advance();
        true
    }

    /// Return to Idle, leaving the array in whatever order the run reached.
    /// Has no effect unless a run is active.
    pub(crate) fn cancel_run(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.end_run(RunPhase::Idle);
        self.scheduler.cancel_all(&mut self.state);
        if let Some(run) = self.active.take() {
            tracing::info!(
                run = run.id.0,
                comparisons = self.state.counters.comparisons,
                swaps = self.state.counters.swaps,
                "run cancelled"
            );
            self.state.array = run.workspace.into_values();
        }
        emit(&self.event_tx, VizEvent::Status(Status::Ready));
        emit(&self.event_tx, VizEvent::Info(InfoEvent::Cancelled));
    }

    /// Resume the active run if `wake` is the suspension it is waiting on.
    pub(crate) fn on_wakeup(&mut self, wake: Wakeup) {
        if !self.scheduler.resume(&mut self.state, wake) {
            tracing::debug!(handle = ?wake.handle, "dropped stale wake-up");
            return;
        }
        let Some(run) = self.active.as_mut() else {
            return;
        };
        if run.id != wake.run || run.pending != Some(wake.handle) {
            return;
        }
        run.pending = None;
        self.advance();
    }

    /// Perform one step of the active run, then render and suspend.
    fn advance(&mut self) {
        // The cancellation token is checked before every resumption.
        if !self.state.is_running() {
            return;
        }
        let Some(run) = self.active.as_mut() else {
            return;
        };

        match run.sequence.step(&mut run.workspace) {
            Progress::Done => self.finish(),
            Progress::Yielded => {
                self.state.record(run.workspace.counters());
                emit(
                    &self.event_tx,
                    VizEvent::Render {
                        values: run.workspace.values().to_vec(),
                        highlight: run.workspace.focus().to_vec(),
                    },
                );
                emit(
                    &self.event_tx,
                    VizEvent::Stats {
                        comparisons: self.state.counters.comparisons,
                        swaps: self.state.counters.swaps,
                        elapsed_ms: self.state.elapsed_ms(),
                    },
                );
                run.pending = Some(self.scheduler.suspend(&mut self.state, run.id));
            }
        }
    }

    /// Natural completion: commit the working copy and report the result.
    fn finish(&mut self) {
        let Some(run) = self.active.take() else {
            return;
        };
        debug_assert!(self.state.is_running());
        self.state.end_run(RunPhase::Sorted);
        let steps = run.workspace.primitives();
        self.state.array = run.workspace.into_values();

        let elapsed = self
            .state
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or_default();
        let counters = self.state.counters;
        tracing::info!(
            run = run.id.0,
            algorithm = %run.algorithm,
            comparisons = counters.comparisons,
            swaps = counters.swaps,
            steps,
            ?elapsed,
            "run finished"
        );

        emit(
            &self.event_tx,
            VizEvent::Render {
                values: self.state.array.clone(),
                highlight: Vec::new(),
            },
        );
        emit(
            &self.event_tx,
            VizEvent::Stats {
                comparisons: counters.comparisons,
                swaps: counters.swaps,
                elapsed_ms: self.state.elapsed_ms(),
            },
        );
        emit(&self.event_tx, VizEvent::Status(Status::Sorted));

        let summary = RunSummary {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            algorithm: run.algorithm,
            size: self.state.size,
            speed: self.state.speed,
            input: run.input,
            output: self.state.array.clone(),
            comparisons: counters.comparisons,
            swaps: counters.swaps,
            elapsed,
        };
        emit(
            &self.event_tx,
            VizEvent::RunCompleted {
                summary: Box::new(summary),
            },
        );
    }

    fn handle(&mut self, cmd: UiCommand) {
        match cmd {
            UiCommand::Generate { size } => {
                let size = size.unwrap_or(self.state.size);
                self.generate_array(size);
            }
            UiCommand::SetSpeed(level) => {
                if let Err(e) = self.set_speed(level) {
                    tracing::warn!(error = %e, "speed change rejected");
                    emit(
                        &self.event_tx,
                        VizEvent::Info(InfoEvent::Rejected {
                            reason: e.to_string(),
                        }),
                    );
                }
            }
            UiCommand::Select(algorithm) => self.select_algorithm(algorithm),
            UiCommand::Start => {
                let _ = self.start_run();
            }
            UiCommand::Cancel => self.cancel_run(),
            // Handled by the event loop.
            UiCommand::Quit => {}
        }
    }
}

/// Drive the engine from UI commands and timer wake-ups until `Quit` (or until
/// every command sender is dropped).
pub(crate) async fn run_controller(
    cfg: RunConfig,
    event_tx: UnboundedSender<VizEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel::<Wakeup>();
    let size = cfg.size;
    let start_on_launch = cfg.start_on_launch;
    let mut controller = RunController::new(cfg, event_tx, wake_tx)?;

    controller.generate_array(size);
    if start_on_launch {
        let _ = controller.start_run();
    }

    loop {
        tokio::select! {
            // Commands first, so a cancel is observed before the next step.
            biased;
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => {
                        controller.cancel_run();
                        break;
                    }
                    Some(cmd) => controller.handle(cmd),
                }
            }
            Some(wake) = wake_rx.recv() => controller.on_wakeup(wake),
        }
    }

    tracing::debug!(phase = ?controller.state().phase(), "controller stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Harness {
        controller: RunController,
        events: UnboundedReceiver<VizEvent>,
        wakes: UnboundedReceiver<Wakeup>,
    }

    fn harness(algorithm: Option<AlgorithmId>, speed: u8) -> Harness {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (wake_tx, wakes) = mpsc::unbounded_channel();
        let cfg = RunConfig {
            algorithm,
            speed: SpeedLevel::new(speed).unwrap(),
            seed: Some(7),
            ..Default::default()
        };
        Harness {
            controller: RunController::new(cfg, event_tx, wake_tx).unwrap(),
            events,
            wakes,
        }
    }

    impl Harness {
        fn drain(&mut self) -> Vec<VizEvent> {
            let mut out = Vec::new();
            while let Ok(ev) = self.events.try_recv() {
                out.push(ev);
            }
            out
        }

        /// Deliver wake-ups until the run leaves Running; returns wake instants.
        async fn run_to_completion(&mut self) -> Vec<Instant> {
            let mut instants = Vec::new();
            while self.controller.state().is_running() {
                let wake = self.wakes.recv().await.unwrap();
                instants.push(Instant::now());
                self.controller.on_wakeup(wake);
            }
            instants
        }

        async fn step_once(&mut self) {
            let wake = self.wakes.recv().await.unwrap();
            self.controller.on_wakeup(wake);
        }
    }

    fn stats(events: &[VizEvent]) -> Vec<(u64, u64)> {
        events
            .iter()
            .filter_map(|ev| match ev {
                VizEvent::Stats {
                    comparisons, swaps, ..
                } => Some((*comparisons, *swaps)),
                _ => None,
            })
            .collect()
    }

    fn draws(events: &[VizEvent]) -> usize {
        events
            .iter()
            .filter(|ev| matches!(ev, VizEvent::Render { .. } | VizEvent::Stats { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn bubble_run_reaches_sorted_with_expected_counters() {
        let mut h = harness(Some(AlgorithmId::Bubble), 10);
        h.controller.load_array(vec![5, 3, 8, 1]);
        let _ = h.drain();

        assert!(h.controller.start_run());
        let _ = h.run_to_completion().await;

        let state = h.controller.state();
        assert_eq!(state.phase(), RunPhase::Sorted);
        assert_eq!(state.array, vec![1, 3, 5, 8]);
        assert_eq!(state.counters.comparisons, 6);
        assert_eq!(state.counters.swaps, 4);
        assert_eq!(state.outstanding_timers(), 0);

        let events = h.drain();
        let n = events.len();
        assert!(matches!(&events[n - 4], VizEvent::Render { highlight, .. } if highlight.is_empty()));
        assert!(matches!(&events[n - 3], VizEvent::Stats { comparisons: 6, swaps: 4, .. }));
        assert!(matches!(&events[n - 2], VizEvent::Status(Status::Sorted)));
        match &events[n - 1] {
            VizEvent::RunCompleted { summary } => {
                assert_eq!(summary.input, vec![5, 3, 8, 1]);
                assert_eq!(summary.output, vec![1, 3, 5, 8]);
                assert_eq!(summary.algorithm, AlgorithmId::Bubble);
            }
            other => panic!("expected RunCompleted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counters_are_monotonic_and_reset_on_each_start() {
        let mut h = harness(Some(AlgorithmId::Selection), 10);
        h.controller.load_array(vec![9, 4, 7, 1, 3, 8]);
        let _ = h.drain();

        for _ in 0..2 {
            assert!(h.controller.start_run());
            let _ = h.run_to_completion().await;
            let seen = stats(&h.drain());
            assert_eq!(seen[0], (0, 0));
            assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 <= w[1].1));
        }
        // The second run started from the committed, already sorted array.
        assert_eq!(h.controller.state().counters.swaps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn step_delay_follows_speed_level() {
        for (speed, ms) in [(1u8, 500u64), (10, 1)] {
            let mut h = harness(Some(AlgorithmId::Insertion), speed);
            h.controller.load_array(vec![3, 2, 1]);
            let started = Instant::now();
            assert!(h.controller.start_run());
            let instants = h.run_to_completion().await;

            let mut prev = started;
            for at in instants {
                assert_eq!(at - prev, Duration::from_millis(ms));
                prev = at;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_silences_pending_timers_and_keeps_partial_order() {
        let mut h = harness(Some(AlgorithmId::Bubble), 5);
        h.controller.load_array(vec![5, 3, 8, 1]);
        assert!(h.controller.start_run());
        // First step compared 5 and 3; the next one swaps them.
        h.step_once().await;
        assert_eq!(h.controller.state().counters.swaps, 1);
        let _ = h.drain();

        let (stale_run, stale_handle) = {
            let run = h.controller.active.as_ref().unwrap();
            (run.id, run.pending.unwrap())
        };
        h.controller.cancel_run();
        assert_eq!(h.controller.state().phase(), RunPhase::Idle);
        assert_eq!(h.controller.state().outstanding_timers(), 0);
        assert_eq!(h.controller.state().array, vec![3, 5, 8, 1]);

        h.controller.generate_array(4);
        let regenerated = h.controller.state().array.clone();
        let _ = h.drain();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.wakes.try_recv().is_err());
        // A wake-up already in flight at cancellation time is inert too.
        h.controller.on_wakeup(Wakeup {
            handle: stale_handle,
            run: stale_run,
        });

        assert_eq!(h.controller.state().array, regenerated);
        assert_eq!(h.controller.state().counters.swaps, 0);
        assert_eq!(draws(&h.drain()), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_when_idle_is_a_no_op() {
        let mut h = harness(Some(AlgorithmId::Heap), 5);
        h.controller.load_array(vec![2, 1]);
        let _ = h.drain();

        h.controller.cancel_run();
        h.controller.cancel_run();
        assert!(h.drain().is_empty());
        assert_eq!(h.controller.state().phase(), RunPhase::Idle);
        assert_eq!(h.controller.state().array, vec![2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_algorithm_and_idle_engine() {
        let mut h = harness(None, 5);
        h.controller.load_array(vec![3, 1, 2]);
        let _ = h.drain();

        assert!(!h.controller.start_run());
        assert!(h.drain().is_empty());
        assert_eq!(h.controller.state().phase(), RunPhase::Idle);

        h.controller.select_algorithm(AlgorithmId::Quick);
        assert!(h.controller.start_run());
        let first = h.controller.active.as_ref().unwrap().id;
        let _ = h.drain();

        assert!(!h.controller.start_run());
        assert!(h.drain().is_empty());
        assert_eq!(h.controller.active.as_ref().unwrap().id, first);
        assert_eq!(h.controller.state().outstanding_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn generate_while_running_cancels_the_run() {
        let mut h = harness(Some(AlgorithmId::Merge), 5);
        h.controller.generate_array(12);
        assert!(h.controller.start_run());
        h.step_once().await;
        let _ = h.drain();

        h.controller.generate_array(30);
        let state = h.controller.state();
        assert_eq!(state.phase(), RunPhase::Idle);
        assert_eq!(state.size, 30);
        assert!(state.array.iter().all(|v| (5..=100).contains(v)));
        assert_eq!(state.outstanding_timers(), 0);

        let events = h.drain();
        assert!(events
            .iter()
            .any(|ev| matches!(ev, VizEvent::Status(Status::Ready))));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_speed_is_reported_not_clamped() {
        let mut h = harness(Some(AlgorithmId::Bubble), 3);
        let err = h.controller.set_speed(11).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { field: "speed", .. }));
        assert_eq!(h.controller.state().speed.get(), 3);

        h.controller.handle(UiCommand::SetSpeed(0));
        assert!(h
            .drain()
            .iter()
            .any(|ev| matches!(ev, VizEvent::Info(InfoEvent::Rejected { .. }))));
    }

    #[tokio::test(start_paused = true)]
    async fn every_algorithm_sorts_through_the_controller() {
        for algorithm in AlgorithmId::ALL {
            let mut h = harness(Some(algorithm), 10);
            h.controller.generate_array(25);
            let mut expected = h.controller.state().array.clone();
            expected.sort_unstable();

            assert!(h.controller.start_run());
            let _ = h.run_to_completion().await;
            assert_eq!(h.controller.state().array, expected, "{algorithm}");
            assert_eq!(h.controller.state().phase(), RunPhase::Sorted);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn event_loop_runs_until_quit() {
        let (event_tx, mut events) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cfg = RunConfig {
            size: 8,
            algorithm: Some(AlgorithmId::Heap),
            speed: SpeedLevel::new(10).unwrap(),
            seed: Some(1),
            start_on_launch: true,
            ..Default::default()
        };
        let handle = tokio::spawn(run_controller(cfg, event_tx, cmd_rx));

        let summary = loop {
            match events.recv().await {
                Some(VizEvent::RunCompleted { summary }) => break summary,
                Some(_) => {}
                None => panic!("controller exited early"),
            }
        };
        let mut sorted = summary.input.clone();
        sorted.sort_unstable();
        assert_eq!(summary.output, sorted);

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
    }
}
