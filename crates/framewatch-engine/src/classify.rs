//! Interval classification against a budget.

use framewatch_core::FrameVerdict;

/// Freeze threshold multiplier used unless configured otherwise.
///
/// At 60 Hz this puts the freeze line at roughly 0.7 s, about 42 missed
/// refreshes, so only drastic stalls count as frozen.
pub const DEFAULT_FREEZE_MULTIPLIER: f64 = 42.0;

/// Classify one interval.
///
/// `Frozen` if `elapsed > freeze_multiplier * budget`, else `Slow` if
/// `elapsed > budget`, else `Normal`. Non-positive (or NaN) elapsed
/// times are `Normal`.
///
/// Returns `None` when `budget` is not positive and finite: the
/// verdict is undefined and the caller must skip the tick.
///
/// ```
/// use framewatch_core::FrameVerdict;
/// use framewatch_engine::classify;
///
/// let budget = 1.0 / 60.0;
/// assert_eq!(classify(0.010, budget, 42.0), Some(FrameVerdict::Normal));
/// assert_eq!(classify(0.020, budget, 42.0), Some(FrameVerdict::Slow));
/// assert_eq!(classify(0.750, budget, 42.0), Some(FrameVerdict::Frozen));
/// assert_eq!(classify(0.020, 0.0, 42.0), None);
/// ```
pub fn classify(elapsed: f64, budget: f64, freeze_multiplier: f64) -> Option<FrameVerdict> {
    if !(budget.is_finite() && budget > 0.0) {
        return None;
    }
    let verdict = if elapsed > freeze_multiplier * budget {
        FrameVerdict::Frozen
    } else if elapsed > budget {
        FrameVerdict::Slow
    } else {
        FrameVerdict::Normal
    };
    Some(verdict)
}

/// A classifier with a fixed freeze multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClassifier {
    freeze_multiplier: f64,
}

impl Default for FrameClassifier {
    fn default() -> Self {
        Self {
            freeze_multiplier: DEFAULT_FREEZE_MULTIPLIER,
        }
    }
}

impl FrameClassifier {
    /// A classifier with a custom multiplier.
    ///
    /// Returns `None` unless the multiplier is finite and at least 1,
    /// which keeps `Frozen` a subset of `Slow`.
    pub fn with_freeze_multiplier(freeze_multiplier: f64) -> Option<Self> {
        (freeze_multiplier.is_finite() && freeze_multiplier >= 1.0)
            .then_some(Self { freeze_multiplier })
    }

    /// The configured multiplier.
    pub fn freeze_multiplier(&self) -> f64 {
        self.freeze_multiplier
    }

    /// Elapsed time above which an interval is frozen.
    pub fn freeze_threshold(&self, budget: f64) -> f64 {
        self.freeze_multiplier * budget
    }

    /// Classify `elapsed` against `budget`; see [`classify`].
    pub fn classify(&self, elapsed: f64, budget: f64) -> Option<FrameVerdict> {
        classify(elapsed, budget, self.freeze_multiplier)
    }
}
