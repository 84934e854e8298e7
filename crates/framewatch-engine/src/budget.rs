//! Per-tick budget derivation.
//!
//! The budget is the allowed duration of one tick-to-tick interval. The
//! clock's own estimate (`deadline - timestamp`) wins when it is usable;
//! otherwise the nominal period of the target rate stands in.

use framewatch_core::{TargetRate, Tick};

/// Derives the allowed duration for a tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetCalculator;

impl BudgetCalculator {
    /// Budget in seconds for `tick`.
    ///
    /// Returns `deadline - timestamp` when the deadline is after the
    /// timestamp, else `1 / target`. Always positive and finite.
    ///
    /// ```
    /// use framewatch_core::{TargetRate, Tick};
    /// use framewatch_engine::BudgetCalculator;
    ///
    /// let b = BudgetCalculator::budget(&Tick::new(1.0, 1.008), TargetRate::HZ_60);
    /// assert!((b - 0.008).abs() < 1e-9);
    ///
    /// let b = BudgetCalculator::budget(&Tick::new(1.0, 0.99), TargetRate::HZ_60);
    /// assert!((b - 1.0 / 60.0).abs() < 1e-12);
    /// ```
    pub fn budget(tick: &Tick, target: TargetRate) -> f64 {
        tick.interval_estimate()
            .unwrap_or_else(|| target.period_secs())
    }

    /// Budget a tracker classifies against, or `None` to skip the tick.
    ///
    /// A tick that reports a deadline is judged against that deadline
    /// alone: a deadline at or before the timestamp (or a non-finite
    /// one) means the budget is unknown for this tick and classification
    /// must be skipped. A tick without any deadline falls back to the
    /// nominal period of `target`.
    pub fn tick_budget(tick: &Tick, target: TargetRate) -> Option<f64> {
        match tick.deadline {
            Some(_) => tick.interval_estimate(),
            None => Some(target.period_secs()),
        }
    }
}
