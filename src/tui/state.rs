use crate::model::{AlgorithmId, InfoEvent, RunSummary, SpeedLevel, Status, VizEvent};
use ratatui::style::Color;
use std::time::Duration;

pub const MIN_SIZE: usize = 5;
pub const MAX_SIZE: usize = 150;
pub const SIZE_STEP: usize = 5;

/// Bar palette; `t` toggles between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub bar: Color,
    pub highlight: Color,
    pub sorted: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Theme {
    pub const DARK: Theme = Theme {
        name: "dark",
        bar: Color::Cyan,
        highlight: Color::LightRed,
        sorted: Color::LightGreen,
        accent: Color::Yellow,
        muted: Color::Gray,
    };

    pub const LIGHT: Theme = Theme {
        name: "light",
        bar: Color::Blue,
        highlight: Color::Red,
        sorted: Color::Green,
        accent: Color::Magenta,
        muted: Color::DarkGray,
    };

    pub fn toggled(self) -> Theme {
        if self == Theme::DARK {
            Theme::LIGHT
        } else {
            Theme::DARK
        }
    }
}

pub struct UiState {
    pub tab: usize,
    pub theme: Theme,
    pub info: String,

    // Mirrors of what the controller was last asked for.
    pub size: usize,
    pub speed: SpeedLevel,
    pub algorithm: Option<AlgorithmId>,

    // Last render/update received from the engine.
    pub values: Vec<u32>,
    pub highlight: Vec<usize>,
    pub comparisons: u64,
    pub swaps: u64,
    pub elapsed_ms: Option<u64>,
    pub status: Status,

    pub last_summary: Option<RunSummary>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            theme: Theme::DARK,
            info: String::new(),
            size: 20,
            speed: SpeedLevel::DEFAULT,
            algorithm: None,
            values: Vec::new(),
            highlight: Vec::new(),
            comparisons: 0,
            swaps: 0,
            elapsed_ms: None,
            status: Status::Ready,
            last_summary: None,
        }
    }
}

impl UiState {
    /// One-line recap of the last completed run, shown under the live stats.
    pub fn last_run_line(&self) -> Option<String> {
        let summary = self.last_summary.as_ref()?;
        let elapsed = Duration::from_millis(summary.elapsed.as_millis() as u64);
        Some(format!(
            "Last: {} on {} values at speed {} took {}",
            summary.algorithm.label(),
            summary.size,
            summary.speed.get(),
            humantime::format_duration(elapsed)
        ))
    }

    pub fn is_sorting(&self) -> bool {
        self.status == Status::Sorting
    }

    /// Size one step up or down, clamped to the slider range.
    pub fn resized(&self, grow: bool) -> usize {
        let next = if grow {
            self.size.saturating_add(SIZE_STEP)
        } else {
            self.size.saturating_sub(SIZE_STEP)
        };
        next.clamp(MIN_SIZE, MAX_SIZE)
    }

    pub fn apply_event(&mut self, ev: VizEvent) {
        match ev {
            VizEvent::Render { values, highlight } => {
                self.values = values;
                self.highlight = highlight;
            }
            VizEvent::Stats {
                comparisons,
                swaps,
                elapsed_ms,
            } => {
                self.comparisons = comparisons;
                self.swaps = swaps;
                self.elapsed_ms = elapsed_ms;
            }
            VizEvent::Status(status) => {
                self.status = status;
                if status == Status::Sorting {
                    self.last_summary = None;
                }
            }
            VizEvent::Info(info) => {
                if let InfoEvent::Generated { size } = info {
                    self.size = size;
                }
                self.info = info.to_message();
            }
            VizEvent::RunCompleted { summary } => {
                self.info = format!(
                    "{} finished: {} comparisons, {} swaps",
                    summary.algorithm.label(),
                    summary.comparisons,
                    summary.swaps
                );
                self.last_summary = Some(*summary);
            }
        }
    }
}
