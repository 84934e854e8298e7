//! Frame-cadence monitoring engine.
//!
//! Given a stream of clock ticks, a [`Tracker`] classifies every
//! tick-to-tick interval as normal, slow or frozen and keeps running
//! counters. A [`TrackerManager`] runs many trackers under one of two
//! clock topologies: one shared clock fanned out to every unit, or one
//! dedicated clock per unit. [`CadenceCounter`] is the lighter sibling
//! that reports a rolling frames-per-second figure instead.
//!
//! The engine only consumes clock callbacks and reports to telemetry
//! sinks through the traits in `framewatch-core`. [`ThreadClock`] is a
//! software clock for hosts without a display link.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod budget;
pub mod cadence;
pub mod classify;
pub mod clock;
pub mod config;
pub mod manager;
pub mod metrics;
pub mod telemetry;
pub mod tracker;

mod sync;

pub use budget::BudgetCalculator;
pub use cadence::{CadenceCounter, CadenceMonitor};
pub use classify::{classify, FrameClassifier, DEFAULT_FREEZE_MULTIPLIER};
pub use clock::{ThreadClock, ThreadClockConfig};
pub use config::{ClockMode, ConfigError, ManagerConfig, ResumePolicy, TrackerConfig};
pub use manager::TrackerManager;
pub use metrics::{CounterSnapshot, FrameCounters};
pub use telemetry::{MemorySink, MemorySinkFactory, TracingSink, TracingSinkFactory};
pub use tracker::Tracker;
