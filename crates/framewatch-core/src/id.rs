//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a tracking unit within a manager.
///
/// `TrackerId(n)` is the n-th unit in creation order (0-based). Telemetry
/// names use the 1-based [`ordinal`](TrackerId::ordinal) so that runs
/// with the same unit count produce the same sink names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerId(pub u32);

impl TrackerId {
    /// 1-based position of this unit.
    pub fn ordinal(self) -> u64 {
        u64::from(self.0) + 1
    }

    /// Deterministic telemetry sink name, e.g. `tracker_1`.
    pub fn sink_name(self) -> String {
        format!("tracker_{}", self.ordinal())
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.ordinal())
    }
}

impl From<u32> for TrackerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
