//! Error types for the collaborator boundary.
//!
//! Split by collaborator: [`ClockError`] is a configuration-level failure
//! surfaced to whoever asked for a clock; [`SinkError`] is produced by
//! telemetry sinks and always swallowed by the engine.

use std::error::Error;
use std::fmt;

/// Errors from a clock source when registering a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClockError {
    /// The requested refresh rate is above what the clock can deliver.
    UnsupportedRate {
        /// Rate that was asked for, in Hz.
        requested: u32,
        /// Highest rate the clock supports, in Hz.
        max: u32,
    },
    /// The clock's delivery thread could not be started.
    SpawnFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The clock cannot accept subscriptions at all.
    Unavailable {
        /// Description of why the clock is unavailable.
        reason: String,
    },
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRate { requested, max } => {
                write!(f, "requested {requested} Hz exceeds clock maximum of {max} Hz")
            }
            Self::SpawnFailed { reason } => write!(f, "clock thread spawn failed: {reason}"),
            Self::Unavailable { reason } => write!(f, "clock unavailable: {reason}"),
        }
    }
}

impl Error for ClockError {}

/// Errors from a telemetry sink.
///
/// The engine treats reporting as fire-and-forget: these never reach the
/// caller of a tick handler and never alter counter state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkError {
    /// The sink could not be created.
    Unavailable {
        /// Name of the sink that was requested.
        name: String,
    },
    /// The sink refused an increment.
    Rejected {
        /// Description of the rejection.
        reason: String,
    },
    /// The sink has been closed.
    Closed,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { name } => write!(f, "telemetry sink '{name}' unavailable"),
            Self::Rejected { reason } => write!(f, "increment rejected: {reason}"),
            Self::Closed => write!(f, "telemetry sink closed"),
        }
    }
}

impl Error for SinkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_rate_message_names_both_rates() {
        let err = ClockError::UnsupportedRate {
            requested: 240,
            max: 120,
        };
        assert_eq!(
            err.to_string(),
            "requested 240 Hz exceeds clock maximum of 120 Hz"
        );
    }

    #[test]
    fn sink_errors_display() {
        assert_eq!(SinkError::Closed.to_string(), "telemetry sink closed");
        assert_eq!(
            SinkError::Unavailable {
                name: "tracker_1".into()
            }
            .to_string(),
            "telemetry sink 'tracker_1' unavailable"
        );
    }
}
