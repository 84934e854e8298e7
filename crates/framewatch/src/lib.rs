//! Framewatch: frame-cadence monitoring for periodic rendering clocks.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the framewatch sub-crates. For most users, adding `framewatch` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use framewatch::prelude::*;
//!
//! // Drive one tracker by hand: prime, one normal frame, one stall.
//! let mut tracker = Tracker::new(TrackerId(0), TrackerConfig::default()).unwrap();
//! tracker.start(TargetRate::HZ_60);
//! for ts in [0.0, 0.016, 1.0] {
//!     tracker.on_tick(Tick::new(ts, ts + 1.0 / 60.0));
//! }
//! assert_eq!(
//!     tracker.snapshot(),
//!     CounterSnapshot { total: 2, slow: 1, frozen: 1 },
//! );
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `framewatch-core` | Ticks, verdicts, rates, errors, collaborator traits |
//! | [`engine`] | `framewatch-engine` | Classification, trackers, manager, cadence, clocks, sinks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`framewatch-core`).
///
/// Implement [`types::ClockSource`] to plug in a display link and
/// [`types::SinkFactory`] to export counters.
pub use framewatch_core as types;

/// The cadence engine (`framewatch-engine`).
///
/// [`engine::TrackerManager`] for many units under one topology,
/// [`engine::Tracker`] for one, [`engine::CadenceMonitor`] for a rolling
/// frame rate.
pub use framewatch_engine as engine;

/// Common imports for typical framewatch usage.
///
/// ```rust
/// use framewatch::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use framewatch_core::{
        ClockHandle, ClockSource, FrameCounter, FrameVerdict, LifecycleEvent, LifecycleListener,
        RateRequest, SinkFactory, TargetRate, TelemetrySink, Tick, TrackerId,
    };

    // Errors
    pub use framewatch_core::{ClockError, SinkError};

    // Engine
    pub use framewatch_engine::{
        CadenceCounter, CadenceMonitor, ClockMode, ConfigError, CounterSnapshot, ManagerConfig,
        MemorySinkFactory, ResumePolicy, ThreadClock, Tracker, TrackerConfig, TrackerManager,
        TracingSinkFactory,
    };
}
