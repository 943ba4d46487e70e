//! The cooperative animation engine.
//!
//! `state` holds the shared run record, `scheduler` turns the speed level into
//! step timers, and `algorithms` provides the sorts as step sequences over a
//! private `workspace`. The orchestrator drives all of them from one task.

pub mod algorithms;
pub mod scheduler;
pub mod state;
pub mod workspace;

pub use algorithms::{sequence_for, StepSequence};
pub use scheduler::{step_delay, RunId, StepScheduler, Wakeup};
pub use state::{RunPhase, RunState, TimerHandle};
pub use workspace::{Progress, Workspace};
