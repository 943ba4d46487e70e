use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub size: usize,
    pub speed: SpeedLevel,
    pub algorithm: Option<AlgorithmId>,
    pub min_value: u32,
    pub max_value: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub start_on_launch: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            size: 20,
            speed: SpeedLevel::DEFAULT,
            algorithm: None,
            min_value: 5,
            max_value: 100,
            seed: None,
            start_on_launch: false,
        }
    }
}

impl RunConfig {
    /// Reject value ranges the array generator cannot honour.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_value == 0 {
            return Err(EngineError::invalid(
                "min_value",
                "array values must be positive",
            ));
        }
        if self.min_value > self.max_value {
            return Err(EngineError::invalid(
                "min_value",
                format!("{} exceeds max_value {}", self.min_value, self.max_value),
            ));
        }
        Ok(())
    }
}

/// Animation speed, 1 (slowest) through 10 (fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: SpeedLevel = SpeedLevel(5);

    pub fn new(level: u8) -> Result<Self, EngineError> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(SpeedLevel(level))
        } else {
            Err(EngineError::invalid(
                "speed",
                format!(
                    "level {} is outside [{}, {}]",
                    level,
                    Self::MIN,
                    Self::MAX
                ),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One level faster, saturating at the top of the range.
    pub fn faster(self) -> Self {
        SpeedLevel(self.0.saturating_add(1).min(Self::MAX))
    }

    /// One level slower, saturating at the bottom of the range.
    pub fn slower(self) -> Self {
        SpeedLevel(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = EngineError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        SpeedLevel::new(level)
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> u8 {
        level.0
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmId {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
    Heap,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 6] = [
        AlgorithmId::Bubble,
        AlgorithmId::Selection,
        AlgorithmId::Insertion,
        AlgorithmId::Merge,
        AlgorithmId::Quick,
        AlgorithmId::Heap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmId::Bubble => "bubble",
            AlgorithmId::Selection => "selection",
            AlgorithmId::Insertion => "insertion",
            AlgorithmId::Merge => "merge",
            AlgorithmId::Quick => "quick",
            AlgorithmId::Heap => "heap",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlgorithmId::Bubble => "Bubble Sort",
            AlgorithmId::Selection => "Selection Sort",
            AlgorithmId::Insertion => "Insertion Sort",
            AlgorithmId::Merge => "Merge Sort",
            AlgorithmId::Quick => "Quick Sort",
            AlgorithmId::Heap => "Heap Sort",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ready,
    Sorting,
    Sorted,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Ready => "Ready",
            Status::Sorting => "Sorting...",
            Status::Sorted => "Sorted!",
        }
    }
}

/// Everything the engine tells a presentation layer, in issuance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VizEvent {
    Render {
        values: Vec<u32>,
        highlight: Vec<usize>,
    },
    Stats {
        comparisons: u64,
        swaps: u64,
        elapsed_ms: Option<u64>,
    },
    Status(Status),
    Info(InfoEvent),
    RunCompleted {
        // Boxed so the per-step variants stay small.
        summary: Box<RunSummary>,
    },
}

/// Structured notices emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Generated { size: usize },
    SpeedChanged { speed: SpeedLevel },
    AlgorithmSelected { algorithm: AlgorithmId },
    Cancelled,
    Rejected { reason: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Generated { size } => format!("Generated new array of {} values", size),
            InfoEvent::SpeedChanged { speed } => format!("Speed set to {}", speed.get()),
            InfoEvent::AlgorithmSelected { algorithm } => {
                format!("Selected {}", algorithm.label())
            }
            InfoEvent::Cancelled => "Sort cancelled".to_string(),
            InfoEvent::Rejected { reason } => format!("Rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default)]
    pub timestamp_utc: String,
    pub algorithm: AlgorithmId,
    pub size: usize,
    pub speed: SpeedLevel,
    pub input: Vec<u32>,
    pub output: Vec<u32>,
    pub comparisons: u64,
    pub swaps: u64,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_level_rejects_out_of_range() {
        assert!(SpeedLevel::new(0).is_err());
        assert!(SpeedLevel::new(11).is_err());
        assert_eq!(SpeedLevel::new(1).unwrap().get(), 1);
        assert_eq!(SpeedLevel::new(10).unwrap().get(), 10);
    }

    #[test]
    fn speed_level_steps_saturate() {
        let top = SpeedLevel::new(10).unwrap();
        assert_eq!(top.faster(), top);
        let bottom = SpeedLevel::new(1).unwrap();
        assert_eq!(bottom.slower(), bottom);
        assert_eq!(SpeedLevel::DEFAULT.faster().get(), 6);
    }

    #[test]
    fn speed_level_deserialization_is_validated() {
        let ok: SpeedLevel = serde_json::from_str("7").unwrap();
        assert_eq!(ok.get(), 7);
        assert!(serde_json::from_str::<SpeedLevel>("42").is_err());
    }

    #[test]
    fn config_rejects_inverted_range() {
        let cfg = RunConfig {
            min_value: 50,
            max_value: 10,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidConfiguration { field: "min_value", .. })
        ));
        assert!(RunConfig::default().validate().is_ok());
    }
}
