//! Test utilities and mock collaborators for framewatch development.
//!
//! Provides a hand-driven clock ([`ManualClock`]), recording and failing
//! telemetry sinks, and tick sequence fixtures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use framewatch_core::{
    ClockError, ClockHandle, ClockSource, FrameCounter, RateRequest, SinkError, SinkFactory,
    TelemetrySink, Tick, TickCallback,
};

// ── ManualClock ──────────────────────────────────────────────────

struct Subscription {
    request: RateRequest,
    callback: Mutex<Option<TickCallback>>,
    paused: AtomicBool,
}

impl Subscription {
    fn is_active(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }
}

/// A [`ClockSource`] that only ticks when the test says so.
///
/// [`emit`](ManualClock::emit) delivers one tick to every live, unpaused
/// subscription in registration order, on the calling thread. Cancelling
/// a subscription from inside its own callback deadlocks; the engine
/// never does that.
#[derive(Default)]
pub struct ManualClock {
    subscriptions: Mutex<Vec<Arc<Subscription>>>,
    refuse_after: Option<usize>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that accepts `n` registrations and refuses the rest.
    pub fn refusing_after(n: usize) -> Self {
        Self {
            refuse_after: Some(n),
            ..Self::default()
        }
    }

    /// Deliver `tick` to every live, unpaused subscription.
    pub fn emit(&self, tick: Tick) {
        let subscriptions: Vec<_> = self.subscriptions.lock().unwrap().clone();
        for sub in subscriptions {
            if sub.paused.load(Ordering::SeqCst) {
                continue;
            }
            if let Some(callback) = sub.callback.lock().unwrap().as_mut() {
                callback(tick);
            }
        }
    }

    /// Deliver each tick in turn.
    pub fn emit_all(&self, ticks: impl IntoIterator<Item = Tick>) {
        for tick in ticks {
            self.emit(tick);
        }
    }

    /// Registrations ever accepted, including cancelled ones.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }

    /// Registrations not yet cancelled.
    pub fn active_count(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active())
            .count()
    }

    /// Whether subscription `index` is paused. `None` if out of range.
    pub fn is_paused(&self, index: usize) -> Option<bool> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(index)
            .map(|s| s.paused.load(Ordering::SeqCst))
    }

    /// Rate requests in registration order.
    pub fn requests(&self) -> Vec<RateRequest> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.request)
            .collect()
    }
}

impl ClockSource for ManualClock {
    fn register(
        &self,
        request: RateRequest,
        callback: TickCallback,
    ) -> Result<Box<dyn ClockHandle>, ClockError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if self.refuse_after.is_some_and(|n| subscriptions.len() >= n) {
            return Err(ClockError::Unavailable {
                reason: "manual clock refused registration".into(),
            });
        }
        let sub = Arc::new(Subscription {
            request,
            callback: Mutex::new(Some(callback)),
            paused: AtomicBool::new(false),
        });
        subscriptions.push(Arc::clone(&sub));
        Ok(Box::new(ManualHandle { sub }))
    }
}

struct ManualHandle {
    sub: Arc<Subscription>,
}

impl ClockHandle for ManualHandle {
    fn set_paused(&self, paused: bool) {
        self.sub.paused.store(paused, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.sub.paused.load(Ordering::SeqCst)
    }

    fn cancel(&mut self) {
        // Waits for an in-flight emit to finish with this callback.
        self.sub.callback.lock().unwrap().take();
    }
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── RecordingSink ────────────────────────────────────────────────

/// One observed sink call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkCall {
    Increment {
        sink: String,
        counter: FrameCounter,
        delta: i64,
    },
    Close {
        sink: String,
    },
}

/// Sink that appends every call to a shared log.
pub struct RecordingSink {
    name: String,
    log: Arc<Mutex<Vec<SinkCall>>>,
}

impl TelemetrySink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn increment(&self, counter: FrameCounter, delta: i64) -> Result<(), SinkError> {
        self.log.lock().unwrap().push(SinkCall::Increment {
            sink: self.name.clone(),
            counter,
            delta,
        });
        Ok(())
    }

    fn close(&self) {
        self.log.lock().unwrap().push(SinkCall::Close {
            sink: self.name.clone(),
        });
    }
}

/// Factory whose sinks all write to one ordered call log.
#[derive(Clone, Default)]
pub struct RecordingSinkFactory {
    created: Arc<Mutex<Vec<String>>>,
    log: Arc<Mutex<Vec<SinkCall>>>,
}

impl RecordingSinkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names passed to `create`, in order.
    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    /// Every sink call so far, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.log.lock().unwrap().clone()
    }

    /// Number of `close` calls received by the sink called `name`.
    pub fn close_count(&self, name: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, SinkCall::Close { sink } if sink == name))
            .count()
    }

    /// Sum of deltas reported for `counter` by the sink called `name`.
    pub fn total(&self, name: &str, counter: FrameCounter) -> i64 {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                SinkCall::Increment {
                    sink,
                    counter: c,
                    delta,
                } if sink == name && *c == counter => Some(*delta),
                _ => None,
            })
            .sum()
    }
}

impl SinkFactory for RecordingSinkFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn TelemetrySink>, SinkError> {
        self.created.lock().unwrap().push(name.to_owned());
        Ok(Arc::new(RecordingSink {
            name: name.to_owned(),
            log: Arc::clone(&self.log),
        }))
    }
}

// ── Failing sinks ────────────────────────────────────────────────

/// Sink whose every increment is rejected.
pub struct FailingSink {
    name: String,
}

impl FailingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TelemetrySink for FailingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn increment(&self, _counter: FrameCounter, _delta: i64) -> Result<(), SinkError> {
        Err(SinkError::Rejected {
            reason: "failing sink".into(),
        })
    }

    fn close(&self) {}
}

/// Sink that panics when asked to increment one particular counter.
pub struct PanickingSink {
    name: String,
    on: FrameCounter,
}

impl PanickingSink {
    pub fn new(name: impl Into<String>, on: FrameCounter) -> Self {
        Self {
            name: name.into(),
            on,
        }
    }
}

impl TelemetrySink for PanickingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn increment(&self, counter: FrameCounter, _delta: i64) -> Result<(), SinkError> {
        assert_ne!(counter, self.on, "sink '{}' refuses {counter}", self.name);
        Ok(())
    }

    fn close(&self) {}
}

/// Factory that refuses to create sinks, or hands out sinks that misbehave.
pub enum FailingSinkFactory {
    /// `create` fails.
    Unavailable,
    /// `create` succeeds; increments fail.
    Rejecting,
    /// `create` succeeds; increments of the given counter panic.
    Panicking(FrameCounter),
}

impl SinkFactory for FailingSinkFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn TelemetrySink>, SinkError> {
        match self {
            Self::Unavailable => Err(SinkError::Unavailable {
                name: name.to_owned(),
            }),
            Self::Rejecting => Ok(Arc::new(FailingSink::new(name))),
            Self::Panicking(on) => Ok(Arc::new(PanickingSink::new(name, *on))),
        }
    }
}
