//! Orchestration of many trackers under one clock topology.
//!
//! [`TrackerManager`] owns an ordered set of [`Tracker`]s. In
//! [`ClockMode::Shared`] it holds one clock subscription and forwards
//! every tick, in index order, to each unit. In [`ClockMode::Dedicated`]
//! each unit registers its own subscription and the manager only keeps
//! the units.
//!
//! The manager is the single lifecycle subscriber: background and
//! foreground signals reach every clock it owns through it.

use std::fmt;
use std::sync::Arc;

use framewatch_core::{
    ClockHandle, ClockSource, LifecycleListener, SinkFactory, TelemetrySink, TrackerId,
};

use crate::config::{ClockMode, ConfigError, ManagerConfig};
use crate::metrics::CounterSnapshot;
use crate::tracker::Tracker;

/// Owner of a configured set of trackers.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use framewatch_engine::{ManagerConfig, ThreadClock, TrackerManager};
///
/// let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()));
/// manager.configure(&ManagerConfig::default()).unwrap();
/// std::thread::sleep(std::time::Duration::from_secs(1));
/// println!("{:?}", manager.aggregate());
/// manager.stop_all();
/// ```
pub struct TrackerManager {
    clock: Arc<dyn ClockSource>,
    sinks: Option<Arc<dyn SinkFactory>>,
    trackers: Vec<Tracker>,
    shared_clock: Option<Box<dyn ClockHandle>>,
    mode: Option<ClockMode>,
    paused: bool,
}

impl TrackerManager {
    /// A manager with no units that registers with `clock`.
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            clock,
            sinks: None,
            trackers: Vec::new(),
            shared_clock: None,
            mode: None,
            paused: false,
        }
    }

    /// Allocate one telemetry sink per unit from `factory`.
    pub fn with_sink_factory(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.sinks = Some(factory);
        self
    }

    /// Replace every unit with `config.count` fresh ones and start them.
    ///
    /// Existing units are stopped first. If a clock registration fails,
    /// everything started so far is stopped again and the error returned;
    /// the manager is then empty.
    pub fn configure(&mut self, config: &ManagerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.stop_all();

        let mut trackers = Vec::with_capacity(config.count);
        for index in 0..config.count {
            // validate() bounds count to u32.
            let id = TrackerId(index as u32);
            let mut tracker = Tracker::new(id, config.tracker)?;
            tracker.configure(config.work, self.make_sink(id));
            trackers.push(tracker);
        }
        self.trackers = trackers;
        self.mode = Some(config.mode);

        if let Err(e) = self.start_clocks(config) {
            tracing::warn!(mode = %config.mode, error = %e, "configure failed, stopping all units");
            self.stop_all();
            return Err(e);
        }

        if self.paused {
            self.apply_pause(true);
        }
        tracing::debug!(
            count = config.count,
            mode = %config.mode,
            rate_hz = config.rate.target.hz(),
            strict = config.rate.strict,
            work_us = config.work.as_micros() as u64,
            "trackers configured"
        );
        Ok(())
    }

    fn make_sink(&self, id: TrackerId) -> Option<Arc<dyn TelemetrySink>> {
        let factory = self.sinks.as_ref()?;
        let name = id.sink_name();
        match factory.create(&name) {
            Ok(sink) => Some(sink),
            Err(e) => {
                tracing::warn!(
                    tracker = %id,
                    sink = %name,
                    error = %e,
                    "sink unavailable, counting locally"
                );
                None
            }
        }
    }

    fn start_clocks(&mut self, config: &ManagerConfig) -> Result<(), ConfigError> {
        match config.mode {
            ClockMode::Dedicated => {
                for tracker in &mut self.trackers {
                    tracker.start_dedicated(self.clock.as_ref(), config.rate)?;
                }
            }
            ClockMode::Shared => {
                for tracker in &mut self.trackers {
                    tracker.start(config.rate.target);
                }
                let targets: Vec<_> = self.trackers.iter().map(Tracker::tick_target).collect();
                let handle = self.clock.register(
                    config.rate,
                    Box::new(move |tick| {
                        for target in &targets {
                            target.on_tick(tick);
                        }
                    }),
                )?;
                self.shared_clock = Some(handle);
            }
        }
        Ok(())
    }

    /// Stop every unit, release the shared clock and discard the units.
    ///
    /// Idempotent. Once this returns no tick reaches any former unit.
    pub fn stop_all(&mut self) {
        if let Some(mut shared) = self.shared_clock.take() {
            shared.cancel();
        }
        let count = self.trackers.len();
        for tracker in &mut self.trackers {
            tracker.stop();
        }
        self.trackers.clear();
        if self.mode.take().is_some() {
            tracing::debug!(count, "trackers stopped");
        }
    }

    /// Sum of every unit's counters.
    ///
    /// Best effort: each unit is read consistently, but units are not read
    /// at the same instant.
    pub fn aggregate(&self) -> CounterSnapshot {
        self.trackers.iter().map(Tracker::snapshot).sum()
    }

    /// Per-unit counters, in index order.
    pub fn snapshots(&self) -> Vec<CounterSnapshot> {
        self.trackers.iter().map(Tracker::snapshot).collect()
    }

    /// The unit at `index`.
    pub fn tracker(&self, index: usize) -> Option<&Tracker> {
        self.trackers.get(index)
    }

    /// The unit at `index`, mutably.
    pub fn tracker_mut(&mut self, index: usize) -> Option<&mut Tracker> {
        self.trackers.get_mut(index)
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether there are no units.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Topology of the current configuration, `None` when stopped.
    pub fn mode(&self) -> Option<ClockMode> {
        self.mode
    }

    /// Whether a background signal is in effect.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend every clock subscription the manager owns.
    pub fn pause_all(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.apply_pause(true);
        tracing::debug!(count = self.trackers.len(), "trackers paused");
    }

    /// Resume every clock subscription the manager owns.
    pub fn resume_all(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.apply_pause(false);
        tracing::debug!(count = self.trackers.len(), "trackers resumed");
    }

    fn apply_pause(&mut self, paused: bool) {
        if let Some(shared) = &self.shared_clock {
            shared.set_paused(paused);
        }
        for tracker in &mut self.trackers {
            if paused {
                tracker.pause();
            } else {
                tracker.resume();
            }
        }
    }
}

impl LifecycleListener for TrackerManager {
    fn on_background(&mut self) {
        self.pause_all();
    }

    fn on_foreground(&mut self) {
        self.resume_all();
    }
}

impl Drop for TrackerManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

impl fmt::Debug for TrackerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerManager")
            .field("mode", &self.mode)
            .field("trackers", &self.trackers.len())
            .field("paused", &self.paused)
            .finish()
    }
}
