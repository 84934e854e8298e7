//! Thread-backed software clock.
//!
//! [`ThreadClock`] stands in for a display link on hosts without one.
//! Every registration gets its own named thread that sleeps until the
//! next scheduled refresh, then invokes the callback with
//! `deadline = timestamp + period`. Control messages (pause, resume,
//! cancel) arrive over a crossbeam channel, so the thread wakes for them
//! immediately instead of at the next refresh.
//!
//! Timestamps are the *scheduled* refresh times, in seconds since the
//! clock was created, so every subscription of one clock shares a
//! timebase. If the callback overruns, the missed refreshes are skipped
//! and the next tick carries the real gap.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use framewatch_core::{
    ClockError, ClockHandle, ClockSource, RateRequest, TargetRate, Tick, TickCallback,
};

// ── ThreadClockConfig ────────────────────────────────────────────

/// Configuration for [`ThreadClock`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadClockConfig {
    /// Highest rate a subscription may run at. Default: 120 Hz.
    pub max_rate: TargetRate,
    /// Prefix for delivery thread names. Default: `framewatch-clock`.
    pub name_prefix: String,
}

impl Default for ThreadClockConfig {
    fn default() -> Self {
        Self {
            max_rate: TargetRate::HZ_120,
            name_prefix: "framewatch-clock".to_owned(),
        }
    }
}

// ── ThreadClock ──────────────────────────────────────────────────

/// A [`ClockSource`] that paces ticks with one thread per subscription.
#[derive(Debug)]
pub struct ThreadClock {
    config: ThreadClockConfig,
    epoch: Instant,
    next_id: AtomicU64,
}

impl ThreadClock {
    /// A clock whose timebase starts now.
    pub fn new(config: ThreadClockConfig) -> Self {
        Self {
            config,
            epoch: Instant::now(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Refresh rate a request would run at, in Hz.
    ///
    /// A flexible request above the clock's maximum is throttled to the
    /// maximum when its range allows it.
    fn effective_rate(&self, request: RateRequest) -> Result<u32, ClockError> {
        let range = request.frame_rate_range();
        let max = self.config.max_rate.hz();
        if range.minimum > max {
            return Err(ClockError::UnsupportedRate {
                requested: request.target.hz(),
                max,
            });
        }
        Ok(range.preferred.min(max))
    }
}

impl Default for ThreadClock {
    fn default() -> Self {
        Self::new(ThreadClockConfig::default())
    }
}

impl ClockSource for ThreadClock {
    fn register(
        &self,
        request: RateRequest,
        callback: TickCallback,
    ) -> Result<Box<dyn ClockHandle>, ClockError> {
        let hz = self.effective_rate(request)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (control_tx, control_rx) = crossbeam_channel::unbounded();

        let delivery = Delivery {
            callback,
            control_rx,
            epoch: self.epoch,
            period: Duration::from_secs_f64(1.0 / f64::from(hz)),
            paused: false,
        };
        let thread = thread::Builder::new()
            .name(format!("{}-{id}", self.config.name_prefix))
            .spawn(move || delivery.run())
            .map_err(|e| ClockError::SpawnFailed {
                reason: e.to_string(),
            })?;

        tracing::debug!(subscription = id, rate_hz = hz, "clock subscription started");
        Ok(Box::new(ThreadClockHandle {
            id,
            control: control_tx,
            paused: AtomicBool::new(false),
            thread: Some(thread),
        }))
    }
}

// ── Delivery thread ──────────────────────────────────────────────

enum Control {
    Pause,
    Resume,
    Cancel,
}

/// State owned by one delivery thread.
struct Delivery {
    callback: TickCallback,
    control_rx: Receiver<Control>,
    epoch: Instant,
    period: Duration,
    paused: bool,
}

impl Delivery {
    /// Run until cancelled or until the handle disappears.
    fn run(mut self) {
        let mut next = Instant::now() + self.period;
        loop {
            if !self.wait_until(next) {
                return;
            }
            if !self.paused {
                let timestamp = next.duration_since(self.epoch).as_secs_f64();
                let deadline = timestamp + self.period.as_secs_f64();
                (self.callback)(Tick::new(timestamp, deadline));
            }
            next = self.next_refresh(next);
        }
    }

    /// Block until `at`, applying control messages as they arrive.
    ///
    /// Returns `false` when delivery must end.
    fn wait_until(&mut self, at: Instant) -> bool {
        loop {
            let now = Instant::now();
            if now >= at {
                break;
            }
            match self.control_rx.recv_timeout(at - now) {
                Ok(control) => {
                    if !self.apply(control) {
                        return false;
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        // Cancel sent from inside the callback lands here.
        while let Ok(control) = self.control_rx.try_recv() {
            if !self.apply(control) {
                return false;
            }
        }
        true
    }

    fn apply(&mut self, control: Control) -> bool {
        match control {
            Control::Pause => self.paused = true,
            Control::Resume => self.paused = false,
            Control::Cancel => return false,
        }
        true
    }

    /// First refresh after `now` on the grid started at `previous`.
    fn next_refresh(&self, previous: Instant) -> Instant {
        let next = previous + self.period;
        let now = Instant::now();
        if next > now {
            return next;
        }
        let behind = now.duration_since(next).as_nanos();
        let skipped = behind / self.period.as_nanos().max(1) + 1;
        let skipped = u32::try_from(skipped).unwrap_or(u32::MAX);
        next + self.period.saturating_mul(skipped)
    }
}

// ── ThreadClockHandle ────────────────────────────────────────────

/// Handle to one [`ThreadClock`] subscription.
struct ThreadClockHandle {
    id: u64,
    control: Sender<Control>,
    paused: AtomicBool,
    thread: Option<JoinHandle<()>>,
}

impl ClockHandle for ThreadClockHandle {
    fn set_paused(&self, paused: bool) {
        if self.thread.is_none() || self.paused.swap(paused, Ordering::AcqRel) == paused {
            return;
        }
        let control = if paused {
            Control::Pause
        } else {
            Control::Resume
        };
        // The thread only exits after Cancel, which also clears `thread`.
        let _ = self.control.send(control);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn cancel(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.control.send(Control::Cancel);
        if thread.thread().id() == thread::current().id() {
            // Called from the callback: the loop sees Cancel before the
            // next delivery. Joining here would deadlock.
            tracing::debug!(subscription = self.id, "clock subscription cancelled from callback");
            return;
        }
        if thread.join().is_err() {
            tracing::warn!(subscription = self.id, "clock callback panicked");
        }
        tracing::debug!(subscription = self.id, "clock subscription cancelled");
    }
}

impl Drop for ThreadClockHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<Tick>>>, TickCallback) {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        (ticks, Box::new(move |tick| sink.lock().unwrap().push(tick)))
    }

    fn wait_for(ticks: &Mutex<Vec<Tick>>, n: usize) -> bool {
        let give_up = Instant::now() + Duration::from_secs(5);
        while Instant::now() < give_up {
            if ticks.lock().unwrap().len() >= n {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn rejects_rate_above_maximum() {
        let clock = ThreadClock::default();
        let (_, cb) = recorder();
        let target = TargetRate::new(240).unwrap();
        let err = clock.register(RateRequest::strict(target), cb).err();
        assert_eq!(
            err,
            Some(ClockError::UnsupportedRate {
                requested: 240,
                max: 120
            })
        );
    }

    #[test]
    fn flexible_request_is_throttled() {
        let clock = ThreadClock::default();
        let target = TargetRate::new(240).unwrap();
        assert_eq!(clock.effective_rate(RateRequest::flexible(target)), Ok(120));
    }

    #[test]
    fn delivers_ordered_ticks_with_deadlines() {
        let clock = ThreadClock::default();
        let (ticks, cb) = recorder();
        let mut handle = clock
            .register(RateRequest::strict(TargetRate::HZ_120), cb)
            .unwrap();
        assert!(wait_for(&ticks, 5));
        handle.cancel();

        let ticks = ticks.lock().unwrap();
        for pair in ticks.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
        for t in ticks.iter() {
            let interval = t.interval_estimate().unwrap();
            assert!((interval - 1.0 / 120.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cancel_is_synchronous_and_idempotent() {
        let clock = ThreadClock::default();
        let (ticks, cb) = recorder();
        let mut handle = clock
            .register(RateRequest::strict(TargetRate::HZ_120), cb)
            .unwrap();
        assert!(wait_for(&ticks, 1));
        handle.cancel();
        handle.cancel();
        let seen = ticks.lock().unwrap().len();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.lock().unwrap().len(), seen);
    }

    #[test]
    fn pause_suppresses_delivery() {
        let clock = ThreadClock::default();
        let (ticks, cb) = recorder();
        let handle = clock
            .register(RateRequest::strict(TargetRate::HZ_120), cb)
            .unwrap();
        assert!(wait_for(&ticks, 1));
        handle.set_paused(true);
        assert!(handle.is_paused());
        // Let an in-flight tick land before sampling.
        thread::sleep(Duration::from_millis(30));
        let seen = ticks.lock().unwrap().len();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(ticks.lock().unwrap().len(), seen);

        handle.set_paused(false);
        assert!(wait_for(&ticks, seen + 1));
    }

    #[test]
    fn cancel_from_callback_stops_delivery() {
        let clock = ThreadClock::default();
        let slot: Arc<Mutex<Option<Box<dyn ClockHandle>>>> = Arc::new(Mutex::new(None));
        let count = Arc::new(AtomicU64::new(0));

        let cb_slot = Arc::clone(&slot);
        let cb_count = Arc::clone(&count);
        let handle = clock
            .register(
                RateRequest::strict(TargetRate::HZ_120),
                Box::new(move |_| {
                    cb_count.fetch_add(1, Ordering::SeqCst);
                    if let Some(mut h) = cb_slot.lock().unwrap().take() {
                        h.cancel();
                    }
                }),
            )
            .unwrap();
        *slot.lock().unwrap() = Some(handle);

        let give_up = Instant::now() + Duration::from_secs(5);
        while slot.lock().unwrap().is_some() && Instant::now() < give_up {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(50));
        let seen = count.load(Ordering::SeqCst);
        assert!(seen >= 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn next_refresh_skips_missed_slots() {
        let (_, callback) = recorder();
        let (_tx, control_rx) = crossbeam_channel::unbounded();
        let delivery = Delivery {
            callback,
            control_rx,
            epoch: Instant::now(),
            period: Duration::from_millis(10),
            paused: false,
        };
        let long_ago = Instant::now() - Duration::from_millis(95);
        let next = delivery.next_refresh(long_ago);
        assert!(next > Instant::now());
        let offset = next.duration_since(long_ago).as_nanos();
        assert_eq!(offset % Duration::from_millis(10).as_nanos(), 0);
    }
}
