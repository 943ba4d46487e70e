//! Application-level orchestration.
//!
//! This module owns the run lifecycle (generate/start/cancel/finish) and the
//! event loop that interleaves UI commands with step timers. UI/CLI layers talk
//! to it only through `UiCommand` and `VizEvent` channels.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
