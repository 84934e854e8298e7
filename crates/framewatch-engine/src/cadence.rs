//! Rolling frames-per-second measurement.
//!
//! [`CadenceCounter`] is the pure state machine: feed it ticks, read
//! back the last whole-second rate. [`CadenceMonitor`] pairs one with a
//! clock subscription and host lifecycle handling.

use std::sync::{Arc, Mutex};

use framewatch_core::{ClockError, ClockHandle, ClockSource, LifecycleListener, RateRequest, Tick};

use crate::sync::lock;

/// Length of one measurement window, in seconds.
const WINDOW_SECS: f64 = 1.0;

// ── CadenceCounter ───────────────────────────────────────────────

/// Counts ticks per window and publishes a rounded rate when each
/// window closes.
///
/// ```
/// use framewatch_core::Tick;
/// use framewatch_engine::CadenceCounter;
///
/// let mut counter = CadenceCounter::new();
/// for k in 0..=60 {
///     counter.on_tick(Tick::without_deadline(k as f64 / 60.0));
/// }
/// assert_eq!(counter.current_rate(), 60);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CadenceCounter {
    window_frame_count: u32,
    window_start: Option<f64>,
    current_rate: u32,
}

impl CadenceCounter {
    /// An unprimed counter reporting zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one tick.
    ///
    /// The first tick only opens a window. A window closes on the first
    /// tick at least one second after it opened.
    pub fn on_tick(&mut self, tick: Tick) {
        let Some(start) = self.window_start else {
            self.window_start = Some(tick.timestamp);
            return;
        };
        self.window_frame_count = self.window_frame_count.saturating_add(1);
        let span = tick.timestamp - start;
        if span >= WINDOW_SECS {
            self.current_rate = (f64::from(self.window_frame_count) / span).round() as u32;
            self.window_frame_count = 0;
            self.window_start = Some(tick.timestamp);
        }
    }

    /// Drop the open window; the next tick opens a new one.
    ///
    /// The published rate is kept.
    pub fn reprime(&mut self) {
        self.window_frame_count = 0;
        self.window_start = None;
    }

    /// Reset every field, including the published rate.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Rate published by the last closed window, in frames per second.
    pub fn current_rate(&self) -> u32 {
        self.current_rate
    }

    /// Ticks counted in the open window.
    pub fn window_frame_count(&self) -> u32 {
        self.window_frame_count
    }

    /// Whether a window is open.
    pub fn is_primed(&self) -> bool {
        self.window_start.is_some()
    }
}

// ── CadenceMonitor ───────────────────────────────────────────────

/// A [`CadenceCounter`] with its own clock subscription.
#[derive(Default)]
pub struct CadenceMonitor {
    counter: Arc<Mutex<CadenceCounter>>,
    clock: Option<Box<dyn ClockHandle>>,
}

impl CadenceMonitor {
    /// A stopped monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `clock` and start measuring.
    ///
    /// A running subscription is retired first. On failure the monitor
    /// is left stopped.
    pub fn start(
        &mut self,
        clock: &dyn ClockSource,
        request: RateRequest,
    ) -> Result<(), ClockError> {
        self.stop();
        let counter = Arc::clone(&self.counter);
        let handle = clock.register(
            request,
            Box::new(move |tick| lock(&counter).on_tick(tick)),
        )?;
        self.clock = Some(handle);
        tracing::debug!(rate_hz = request.target.hz(), "cadence monitor started");
        Ok(())
    }

    /// Retire the subscription and reset the counter.
    pub fn stop(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
            tracing::debug!("cadence monitor stopped");
        }
        lock(&self.counter).stop();
    }

    /// Suspend tick delivery.
    pub fn pause(&mut self) {
        if let Some(clock) = &self.clock {
            clock.set_paused(true);
        }
    }

    /// Resume tick delivery, opening a fresh window.
    pub fn resume(&mut self) {
        if let Some(clock) = &self.clock {
            lock(&self.counter).reprime();
            clock.set_paused(false);
        }
    }

    /// Rate published by the last closed window.
    pub fn current_rate(&self) -> u32 {
        lock(&self.counter).current_rate()
    }

    /// Whether a subscription is live.
    pub fn is_running(&self) -> bool {
        self.clock.is_some()
    }

    /// Whether the subscription is live and paused.
    pub fn is_paused(&self) -> bool {
        self.clock.as_ref().is_some_and(|c| c.is_paused())
    }
}

impl LifecycleListener for CadenceMonitor {
    fn on_background(&mut self) {
        self.pause();
    }

    fn on_foreground(&mut self) {
        self.resume();
    }
}

impl Drop for CadenceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CadenceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CadenceMonitor")
            .field("counter", &*lock(&self.counter))
            .field("running", &self.clock.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: f64) -> Tick {
        Tick::without_deadline(ts)
    }

    #[test]
    fn first_tick_primes() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(3.0));
        assert!(c.is_primed());
        assert_eq!(c.window_frame_count(), 0);
        assert_eq!(c.current_rate(), 0);
    }

    #[test]
    fn sixty_hz_window() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(0.0));
        for k in 1..=60 {
            c.on_tick(at(k as f64 / 60.0));
        }
        assert_eq!(c.current_rate(), 60);
        assert_eq!(c.window_frame_count(), 0);
    }

    #[test]
    fn rate_holds_until_next_window_closes() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(0.0));
        for k in 1..=60 {
            c.on_tick(at(k as f64 / 60.0));
        }
        for k in 1..=10 {
            c.on_tick(at(1.0 + k as f64 / 30.0));
        }
        assert_eq!(c.current_rate(), 60);
        assert_eq!(c.window_frame_count(), 10);
    }

    #[test]
    fn long_gap_closes_window_with_low_rate() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(0.0));
        c.on_tick(at(4.0));
        // One frame over four seconds rounds to zero.
        assert_eq!(c.current_rate(), 0);
        assert_eq!(c.window_frame_count(), 0);
    }

    #[test]
    fn stop_resets_everything() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(0.0));
        for k in 1..=120 {
            c.on_tick(at(k as f64 / 120.0));
        }
        assert_eq!(c.current_rate(), 120);
        c.stop();
        assert_eq!(c, CadenceCounter::default());
    }

    #[test]
    fn reprime_keeps_published_rate() {
        let mut c = CadenceCounter::new();
        c.on_tick(at(0.0));
        for k in 1..=60 {
            c.on_tick(at(k as f64 / 60.0));
        }
        c.on_tick(at(1.5));
        c.reprime();
        assert!(!c.is_primed());
        assert_eq!(c.current_rate(), 60);
        assert_eq!(c.window_frame_count(), 0);
    }

    #[test]
    fn stopped_monitor_reports_zero() {
        let mut m = CadenceMonitor::new();
        m.pause();
        m.resume();
        assert!(!m.is_running());
        assert!(!m.is_paused());
        assert_eq!(m.current_rate(), 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn steady_rate_is_recovered(hz in 1u32..=240) {
                let mut c = CadenceCounter::new();
                for k in 0..=hz {
                    c.on_tick(at(f64::from(k) / f64::from(hz)));
                }
                prop_assert_eq!(c.current_rate(), hz);
            }
        }
    }
}
