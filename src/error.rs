//! Engine error types.
//!
//! The animation engine has no recoverable runtime faults: inputs are generated
//! internally and cancellation is a normal transition. What remains is caller
//! misconfiguration, which is reported instead of being silently corrected.

use std::fmt;

/// Errors signalled by the engine to its callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A configuration value outside its accepted domain
    InvalidConfiguration { field: &'static str, reason: String },
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfiguration { field, reason } => {
                write!(f, "invalid configuration for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for EngineError {}
