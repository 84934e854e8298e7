//! Frame verdicts and the counter names they increment.

use std::fmt;

use smallvec::{smallvec, SmallVec};

/// Classification of one tick-to-tick interval.
///
/// `Frozen` implies `Slow`: a frozen interval also exceeded the plain budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameVerdict {
    /// The interval fit within its budget.
    Normal,
    /// The interval exceeded its budget.
    Slow,
    /// The interval exceeded `freeze_multiplier × budget`.
    Frozen,
}

impl FrameVerdict {
    /// True for `Slow` and `Frozen`.
    pub fn is_slow(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// True only for `Frozen`.
    pub fn is_frozen(self) -> bool {
        matches!(self, Self::Frozen)
    }

    /// Counters this verdict increments, in reporting order.
    ///
    /// ```
    /// use framewatch_core::{FrameCounter, FrameVerdict};
    ///
    /// assert_eq!(FrameVerdict::Normal.counters().as_slice(), &[FrameCounter::Total]);
    /// assert_eq!(FrameVerdict::Frozen.counters().len(), 3);
    /// ```
    pub fn counters(self) -> SmallVec<[FrameCounter; 3]> {
        match self {
            Self::Normal => smallvec![FrameCounter::Total],
            Self::Slow => smallvec![FrameCounter::Total, FrameCounter::Slow],
            Self::Frozen => smallvec![
                FrameCounter::Total,
                FrameCounter::Slow,
                FrameCounter::Frozen
            ],
        }
    }
}

impl fmt::Display for FrameVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Slow => write!(f, "slow"),
            Self::Frozen => write!(f, "frozen"),
        }
    }
}

/// A named counter reported to telemetry sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameCounter {
    /// Every classified interval.
    Total,
    /// Intervals that exceeded their budget.
    Slow,
    /// Intervals that exceeded the freeze threshold.
    Frozen,
}

impl FrameCounter {
    /// All counters, in reporting order.
    pub const ALL: [FrameCounter; 3] = [Self::Total, Self::Slow, Self::Frozen];

    /// Name used on the telemetry wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Slow => "slow",
            Self::Frozen => "frozen",
        }
    }
}

impl fmt::Display for FrameCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_implies_slow() {
        assert!(FrameVerdict::Frozen.is_slow());
        assert!(FrameVerdict::Slow.is_slow());
        assert!(!FrameVerdict::Normal.is_slow());
        assert!(!FrameVerdict::Slow.is_frozen());
    }

    #[test]
    fn counters_always_start_with_total() {
        for verdict in [FrameVerdict::Normal, FrameVerdict::Slow, FrameVerdict::Frozen] {
            assert_eq!(verdict.counters()[0], FrameCounter::Total);
        }
        assert_eq!(
            FrameVerdict::Slow.counters().as_slice(),
            &[FrameCounter::Total, FrameCounter::Slow]
        );
    }

    #[test]
    fn wire_names() {
        let names: Vec<_> = FrameCounter::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["total", "slow", "frozen"]);
    }
}
