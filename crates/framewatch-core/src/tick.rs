//! The [`Tick`] event delivered by a clock source once per refresh.

/// One invocation of a rendering clock's callback.
///
/// Both timestamps are in seconds on the clock's own monotonic timebase.
/// `deadline` is the time by which the clock expects the next refresh;
/// it may be missing, or not after `timestamp`, which means the budget
/// for this tick is unknown.
///
/// # Examples
///
/// ```
/// use framewatch_core::Tick;
///
/// let tick = Tick::new(1.0, 1.0 + 1.0 / 60.0);
/// assert!(tick.interval_estimate().is_some());
///
/// let stale = Tick::new(1.0, 0.9);
/// assert!(stale.interval_estimate().is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Monotonic time of this refresh, in seconds.
    pub timestamp: f64,
    /// Monotonic time by which the next refresh should ideally occur.
    pub deadline: Option<f64>,
}

impl Tick {
    /// A tick carrying both a timestamp and a deadline.
    pub fn new(timestamp: f64, deadline: f64) -> Self {
        Self {
            timestamp,
            deadline: Some(deadline),
        }
    }

    /// A tick whose clock did not report a deadline.
    pub fn without_deadline(timestamp: f64) -> Self {
        Self {
            timestamp,
            deadline: None,
        }
    }

    /// The clock's own estimate of the ideal interval, `deadline - timestamp`.
    ///
    /// Returns `None` when the deadline is missing, not strictly after
    /// the timestamp, or either value is not finite.
    pub fn interval_estimate(&self) -> Option<f64> {
        let deadline = self.deadline?;
        let estimate = deadline - self.timestamp;
        (estimate.is_finite() && estimate > 0.0).then_some(estimate)
    }
}
