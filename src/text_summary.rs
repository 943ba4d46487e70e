//! Text summary builder for CLI output.
//!
//! Formats a completed run as human-readable lines for text mode.

use crate::model::RunSummary;
use std::time::Duration;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Longest array rendered inline before the listing is abbreviated.
const MAX_INLINE_VALUES: usize = 40;

fn format_values(values: &[u32]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(MAX_INLINE_VALUES)
        .map(|v| v.to_string())
        .collect();
    if values.len() > MAX_INLINE_VALUES {
        format!("[{}, … +{} more]", shown.join(", "), values.len() - MAX_INLINE_VALUES)
    } else {
        format!("[{}]", shown.join(", "))
    }
}

/// Build a text summary from a finished run.
pub(crate) fn build_text_summary(summary: &RunSummary) -> TextSummary {
    // Millisecond precision; the step delays are whole milliseconds.
    let elapsed = Duration::from_millis(
        u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
    );
    let lines = vec![
        format!("Algorithm: {}", summary.algorithm.label()),
        format!(
            "Array size: {} (speed {})",
            summary.size,
            summary.speed.get()
        ),
        format!("Input:  {}", format_values(&summary.input)),
        format!("Output: {}", format_values(&summary.output)),
        format!("Comparisons: {}", summary.comparisons),
        format!("Swaps: {}", summary.swaps),
        format!("Elapsed: {}", humantime::format_duration(elapsed)),
    ];
    TextSummary { lines }
}
