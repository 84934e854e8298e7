//! A single counted tracking unit.
//!
//! A [`Tracker`] owns running state, optional synthetic workload, an
//! optional telemetry sink and, in dedicated mode, its own clock
//! subscription. Its tick handler is the one classification path used
//! by every caller: a dedicated clock, a manager's shared fan-out, or a
//! test driving ticks by hand.
//!
//! # Tick path
//!
//! ```text
//! tick ──> running && !paused? ──no──> ignore
//!             │yes
//!             v
//!          busy-wait `work`
//!             v
//!          budget unknown? ──yes──> remember timestamp, stop
//!             v
//!          unprimed? ──yes──> remember timestamp, stop
//!             v
//!          classify(elapsed, budget) -> total / slow / frozen, report
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use framewatch_core::{
    ClockError, ClockHandle, ClockSource, FrameCounter, FrameVerdict, RateRequest, TargetRate,
    TelemetrySink, Tick, TrackerId,
};

use crate::budget::BudgetCalculator;
use crate::classify::FrameClassifier;
use crate::config::{ConfigError, ResumePolicy, TrackerConfig};
use crate::metrics::{CounterSnapshot, FrameCounters};
use crate::sync::lock;

// ── TrackerState ─────────────────────────────────────────────────

/// Mutable per-run state, guarded by one mutex so that a tick, a pause,
/// and a stop never interleave.
struct RunState {
    running: bool,
    paused: bool,
    previous_timestamp: Option<f64>,
    target: TargetRate,
    work: Duration,
    sink: Option<Arc<dyn TelemetrySink>>,
}

/// State shared between a [`Tracker`] and whatever clock delivers its ticks.
pub(crate) struct TrackerState {
    id: TrackerId,
    classifier: FrameClassifier,
    resume_policy: ResumePolicy,
    run: Mutex<RunState>,
    counters: FrameCounters,
}

// Compile-time assertion: TrackerState can be captured by clock callbacks.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<TrackerState>();
};

impl TrackerState {
    /// Handle one tick.
    pub(crate) fn on_tick(&self, tick: Tick) {
        let mut run = lock(&self.run);
        if !run.running || run.paused {
            return;
        }

        if !run.work.is_zero() {
            busy_wait(run.work);
        }

        let Some(budget) = BudgetCalculator::tick_budget(&tick, run.target) else {
            run.previous_timestamp = Some(tick.timestamp);
            return;
        };

        let Some(previous) = run.previous_timestamp.replace(tick.timestamp) else {
            return;
        };

        let elapsed = tick.timestamp - previous;
        let Some(verdict) = self.classifier.classify(elapsed, budget) else {
            return;
        };

        tracing::trace!(tracker = %self.id, %verdict, elapsed, budget, "frame classified");
        if verdict == FrameVerdict::Frozen {
            tracing::warn!(
                tracker = %self.id,
                elapsed,
                threshold = self.classifier.freeze_threshold(budget),
                "frozen frame"
            );
        }

        let counters = verdict.counters();
        for &counter in &counters {
            self.counters.increment(counter);
        }
        if let Some(sink) = &run.sink {
            self.report(sink.as_ref(), &counters);
        }
    }

    /// Forward one frame's increments to the sink.
    ///
    /// Runs after the local counters are final. Neither an error nor a
    /// panic from the sink escapes onto the clock thread.
    fn report(&self, sink: &dyn TelemetrySink, counters: &[FrameCounter]) {
        for &counter in counters {
            match panic::catch_unwind(AssertUnwindSafe(|| sink.increment(counter, 1))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(
                    tracker = %self.id,
                    sink = sink.name(),
                    counter = counter.as_str(),
                    error = %e,
                    "telemetry increment dropped"
                ),
                Err(_) => tracing::warn!(
                    tracker = %self.id,
                    sink = sink.name(),
                    counter = counter.as_str(),
                    "telemetry sink panicked"
                ),
            }
        }
    }
}

/// Spin until `work` has elapsed.
///
/// Runs on the tick thread itself so the delay is charged to the
/// interval being measured.
fn busy_wait(work: Duration) {
    let start = Instant::now();
    while start.elapsed() < work {
        std::hint::spin_loop();
    }
}

// ── Tracker ──────────────────────────────────────────────────────

/// One tracking unit.
///
/// Created stopped. [`configure`](Tracker::configure) sets workload and
/// sink, [`start`](Tracker::start) or
/// [`start_dedicated`](Tracker::start_dedicated) begins accepting ticks,
/// [`stop`](Tracker::stop) halts it. Counters survive `stop` and `start`;
/// only [`reset_counters`](Tracker::reset_counters) clears them.
///
/// # Example
///
/// ```
/// use framewatch_core::{TargetRate, Tick, TrackerId};
/// use framewatch_engine::{Tracker, TrackerConfig};
///
/// let mut tracker = Tracker::new(TrackerId(0), TrackerConfig::default()).unwrap();
/// tracker.start(TargetRate::HZ_60);
/// for ts in [0.0, 0.016, 0.05] {
///     tracker.on_tick(Tick::new(ts, ts + 1.0 / 60.0));
/// }
/// let snap = tracker.snapshot();
/// assert_eq!((snap.total, snap.slow, snap.frozen), (2, 1, 0));
/// ```
pub struct Tracker {
    state: Arc<TrackerState>,
    clock: Option<Box<dyn ClockHandle>>,
}

impl Tracker {
    /// A stopped tracker with no workload and no sink.
    pub fn new(id: TrackerId, config: TrackerConfig) -> Result<Self, ConfigError> {
        let classifier = config.classifier()?;
        Ok(Self {
            state: Arc::new(TrackerState {
                id,
                classifier,
                resume_policy: config.resume_policy,
                run: Mutex::new(RunState {
                    running: false,
                    paused: false,
                    previous_timestamp: None,
                    target: TargetRate::default(),
                    work: Duration::ZERO,
                    sink: None,
                }),
                counters: FrameCounters::new(),
            }),
            clock: None,
        })
    }

    /// This unit's identifier.
    pub fn id(&self) -> TrackerId {
        self.state.id
    }

    /// Set the synthetic workload and telemetry sink.
    ///
    /// Counters are untouched. A sink being replaced is closed.
    pub fn configure(&mut self, work: Duration, sink: Option<Arc<dyn TelemetrySink>>) {
        let retired = {
            let mut run = lock(&self.state.run);
            run.work = work;
            let old = std::mem::replace(&mut run.sink, sink);
            let same = matches!((&old, &run.sink), (Some(a), Some(b)) if Arc::ptr_eq(a, b));
            if same {
                None
            } else {
                old
            }
        };
        if let Some(old) = retired {
            old.close();
        }
    }

    /// Begin accepting ticks delivered through [`on_tick`](Tracker::on_tick).
    ///
    /// Any previous run is halted first (its dedicated clock retired) and
    /// the unit is re-primed: the next tick only records its timestamp.
    pub fn start(&mut self, target: TargetRate) {
        self.retire_clock();
        let mut run = lock(&self.state.run);
        run.running = true;
        run.paused = false;
        run.previous_timestamp = None;
        run.target = target;
        tracing::debug!(tracker = %self.state.id, rate_hz = target.hz(), "tracker started");
    }

    /// [`start`](Tracker::start), then subscribe to a dedicated clock.
    ///
    /// On failure the unit is left stopped and the error is returned; no
    /// retry is attempted.
    pub fn start_dedicated(
        &mut self,
        clock: &dyn ClockSource,
        request: RateRequest,
    ) -> Result<(), ClockError> {
        self.start(request.target);
        let state = Arc::clone(&self.state);
        match clock.register(request, Box::new(move |tick| state.on_tick(tick))) {
            Ok(handle) => {
                self.clock = Some(handle);
                Ok(())
            }
            Err(e) => {
                lock(&self.state.run).running = false;
                tracing::warn!(tracker = %self.state.id, error = %e, "dedicated clock refused");
                Err(e)
            }
        }
    }

    /// Handle one tick.
    ///
    /// Ignored unless the unit is running and not paused.
    pub fn on_tick(&self, tick: Tick) {
        self.state.on_tick(tick);
    }

    /// Suspend tick processing, and the dedicated clock if there is one.
    ///
    /// Counters and priming are left alone. No-op unless running.
    pub fn pause(&mut self) {
        {
            let mut run = lock(&self.state.run);
            if !run.running || run.paused {
                return;
            }
            run.paused = true;
        }
        if let Some(clock) = &self.clock {
            clock.set_paused(true);
        }
        tracing::debug!(tracker = %self.state.id, "tracker paused");
    }

    /// Undo [`pause`](Tracker::pause).
    ///
    /// Under [`ResumePolicy::Reprime`] the next tick only primes.
    pub fn resume(&mut self) {
        {
            let mut run = lock(&self.state.run);
            if !run.running || !run.paused {
                return;
            }
            run.paused = false;
            if self.state.resume_policy == ResumePolicy::Reprime {
                run.previous_timestamp = None;
            }
        }
        if let Some(clock) = &self.clock {
            clock.set_paused(false);
        }
        tracing::debug!(tracker = %self.state.id, "tracker resumed");
    }

    /// Stop accepting ticks, retire the dedicated clock and release the sink.
    ///
    /// Synchronous: once this returns no further tick reaches this unit.
    /// Counters keep their last values. Calling it on a stopped unit only
    /// releases a sink set by [`configure`](Tracker::configure).
    pub fn stop(&mut self) {
        self.retire_clock();
        let sink = {
            let mut run = lock(&self.state.run);
            let was_running = run.running;
            run.running = false;
            run.paused = false;
            run.previous_timestamp = None;
            if was_running {
                tracing::debug!(tracker = %self.state.id, "tracker stopped");
            }
            run.sink.take()
        };
        if let Some(sink) = sink {
            sink.close();
        }
    }

    /// Zero this unit's counters.
    pub fn reset_counters(&self) {
        // Held so the reset cannot interleave with a tick.
        let _run = lock(&self.state.run);
        self.state.counters.reset();
    }

    /// Current counter values.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.state.counters.snapshot()
    }

    /// Whether the unit accepts ticks.
    pub fn is_running(&self) -> bool {
        lock(&self.state.run).running
    }

    /// Whether the unit is running but paused.
    pub fn is_paused(&self) -> bool {
        let run = lock(&self.state.run);
        run.running && run.paused
    }

    /// Whether the unit owns a clock subscription.
    pub fn has_dedicated_clock(&self) -> bool {
        self.clock.is_some()
    }

    /// The tick handler, for a caller that fans one clock out to many units.
    pub(crate) fn tick_target(&self) -> Arc<TrackerState> {
        Arc::clone(&self.state)
    }

    fn retire_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("id", &self.state.id)
            .field("counters", &self.snapshot())
            .field("dedicated_clock", &self.clock.is_some())
            .finish()
    }
}
