//! Core types and traits for the framewatch cadence engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: ticks,
//! verdicts, counter names, rate requests, error types, and the traits
//! through which the engine talks to its external collaborators (clock
//! sources, telemetry sinks, host lifecycle signals).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod rate;
pub mod tick;
pub mod traits;
pub mod verdict;

pub use error::{ClockError, SinkError};
pub use id::TrackerId;
pub use rate::{FrameRateRange, RateRequest, TargetRate};
pub use tick::Tick;
pub use traits::{
    ClockHandle, ClockSource, LifecycleEvent, LifecycleListener, SinkFactory, TelemetrySink,
    TickCallback,
};
pub use verdict::{FrameCounter, FrameVerdict};
