//! Collaborator traits: clock sources, telemetry sinks, host lifecycle.
//!
//! The engine depends only on these seams. Concrete clocks (a display
//! link, a software timer, a test clock driven by hand) and concrete
//! sinks live outside the classification logic.

use std::sync::Arc;

use crate::error::{ClockError, SinkError};
use crate::rate::RateRequest;
use crate::tick::Tick;
use crate::verdict::FrameCounter;

/// Callback a clock invokes once per refresh.
///
/// Within one subscription, invocations never overlap and arrive in
/// timestamp order.
pub type TickCallback = Box<dyn FnMut(Tick) + Send>;

/// A periodic rendering clock.
pub trait ClockSource: Send + Sync {
    /// Start delivering ticks to `callback` at the requested rate.
    ///
    /// Fails when the clock cannot honour the request; no ticks are
    /// delivered in that case.
    fn register(
        &self,
        request: RateRequest,
        callback: TickCallback,
    ) -> Result<Box<dyn ClockHandle>, ClockError>;
}

/// A live clock subscription.
///
/// Dropping a handle must cancel it.
pub trait ClockHandle: Send {
    /// Suspend or resume tick delivery.
    fn set_paused(&self, paused: bool);

    /// Whether delivery is currently suspended.
    fn is_paused(&self) -> bool;

    /// Retire the subscription.
    ///
    /// Synchronous: once this returns, the callback is never invoked
    /// again. Calling it more than once is a no-op.
    fn cancel(&mut self);
}

/// A destination for named frame counters.
pub trait TelemetrySink: Send + Sync {
    /// Name the sink was created with.
    fn name(&self) -> &str;

    /// Add `delta` to `counter`.
    fn increment(&self, counter: FrameCounter, delta: i64) -> Result<(), SinkError>;

    /// Finish recording. Later increments may be rejected.
    fn close(&self);
}

/// Allocates telemetry sinks by name.
pub trait SinkFactory: Send + Sync {
    /// Create (or start) a sink called `name`.
    fn create(&self, name: &str) -> Result<Arc<dyn TelemetrySink>, SinkError>;
}

/// Foreground/background signal from the host environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// The host moved to the background; rendering stops.
    Background,
    /// The host returned to the foreground.
    Foreground,
}

/// Something that reacts to host lifecycle signals.
pub trait LifecycleListener {
    /// The host moved to the background.
    fn on_background(&mut self);

    /// The host returned to the foreground.
    fn on_foreground(&mut self);

    /// Dispatch a [`LifecycleEvent`] to the matching method.
    fn on_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Background => self.on_background(),
            LifecycleEvent::Foreground => self.on_foreground(),
        }
    }
}
