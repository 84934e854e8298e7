//! Reference telemetry sinks.
//!
//! [`TracingSink`] forwards every increment as a `tracing` event for an
//! external collector to pick up. [`MemorySinkFactory`] keeps named
//! counters in process, in creation order, so runs with the same unit
//! count can be compared by name.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use framewatch_core::{FrameCounter, SinkError, SinkFactory, TelemetrySink};
use indexmap::IndexMap;

use crate::metrics::CounterSnapshot;
use crate::sync::lock;

// ── TracingSink ──────────────────────────────────────────────────

/// Emits each increment as a `debug` event on the `framewatch::telemetry` target.
#[derive(Debug)]
pub struct TracingSink {
    name: String,
    closed: AtomicBool,
}

impl TracingSink {
    /// An open sink called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            closed: AtomicBool::new(false),
        }
    }
}

impl TelemetrySink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn increment(&self, counter: FrameCounter, delta: i64) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }
        tracing::debug!(
            target: "framewatch::telemetry",
            sink = %self.name,
            counter = counter.as_str(),
            delta,
            "increment"
        );
        Ok(())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: "framewatch::telemetry", sink = %self.name, "closed");
        }
    }
}

/// Creates a fresh [`TracingSink`] per name.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSinkFactory;

impl SinkFactory for TracingSinkFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn TelemetrySink>, SinkError> {
        Ok(Arc::new(TracingSink::new(name)))
    }
}

// ── MemorySink ───────────────────────────────────────────────────

/// Accumulated values for one sink name, shared across re-creations.
#[derive(Debug, Default)]
struct CounterRecord {
    total: AtomicU64,
    slow: AtomicU64,
    frozen: AtomicU64,
}

impl CounterRecord {
    fn cell(&self, counter: FrameCounter) -> &AtomicU64 {
        match counter {
            FrameCounter::Total => &self.total,
            FrameCounter::Slow => &self.slow,
            FrameCounter::Frozen => &self.frozen,
        }
    }

    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total: self.total.load(Ordering::Acquire),
            slow: self.slow.load(Ordering::Acquire),
            frozen: self.frozen.load(Ordering::Acquire),
        }
    }
}

/// A sink handed out by [`MemorySinkFactory`].
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    record: Arc<CounterRecord>,
    closed: AtomicBool,
}

impl MemorySink {
    /// Whether [`close`](TelemetrySink::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl TelemetrySink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn increment(&self, counter: FrameCounter, delta: i64) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }
        let delta = u64::try_from(delta).map_err(|_| SinkError::Rejected {
            reason: format!("negative delta {delta} for '{counter}'"),
        })?;
        self.record.cell(counter).fetch_add(delta, Ordering::AcqRel);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// In-process telemetry registry.
///
/// Creating a sink under a name that was used before reopens the same
/// record, so totals accumulate across runs. Cloning the factory shares
/// the registry.
#[derive(Clone, Debug, Default)]
pub struct MemorySinkFactory {
    records: Arc<Mutex<IndexMap<String, Arc<CounterRecord>>>>,
}

impl MemorySinkFactory {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated totals for `name`, if a sink by that name was ever created.
    pub fn totals(&self, name: &str) -> Option<CounterSnapshot> {
        lock(&self.records).get(name).map(|r| r.snapshot())
    }

    /// Every name seen so far, in first-creation order.
    pub fn names(&self) -> Vec<String> {
        lock(&self.records).keys().cloned().collect()
    }

    /// Forget all records.
    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl SinkFactory for MemorySinkFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn TelemetrySink>, SinkError> {
        let record = Arc::clone(lock(&self.records).entry(name.to_string()).or_default());
        Ok(Arc::new(MemorySink {
            name: name.to_string(),
            record,
            closed: AtomicBool::new(false),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_accumulates() {
        let factory = MemorySinkFactory::new();
        let sink = factory.create("tracker_1").unwrap();
        sink.increment(FrameCounter::Total, 1).unwrap();
        sink.increment(FrameCounter::Total, 2).unwrap();
        sink.increment(FrameCounter::Slow, 1).unwrap();
        assert_eq!(
            factory.totals("tracker_1"),
            Some(CounterSnapshot {
                total: 3,
                slow: 1,
                frozen: 0
            })
        );
        assert_eq!(factory.totals("tracker_2"), None);
    }

    #[test]
    fn closed_memory_sink_rejects() {
        let factory = MemorySinkFactory::new();
        let sink = factory.create("a").unwrap();
        sink.close();
        assert_eq!(
            sink.increment(FrameCounter::Total, 1),
            Err(SinkError::Closed)
        );
        assert_eq!(factory.totals("a"), Some(CounterSnapshot::default()));
    }

    #[test]
    fn negative_delta_is_rejected() {
        let factory = MemorySinkFactory::new();
        let sink = factory.create("a").unwrap();
        assert!(matches!(
            sink.increment(FrameCounter::Slow, -1),
            Err(SinkError::Rejected { .. })
        ));
    }

    #[test]
    fn recreating_a_name_reopens_its_record() {
        let factory = MemorySinkFactory::new();
        let first = factory.create("tracker_1").unwrap();
        first.increment(FrameCounter::Total, 5).unwrap();
        first.close();

        let second = factory.create("tracker_1").unwrap();
        second.increment(FrameCounter::Total, 1).unwrap();
        assert_eq!(factory.totals("tracker_1").unwrap().total, 6);
        assert_eq!(factory.names(), ["tracker_1"]);
    }

    #[test]
    fn names_keep_creation_order() {
        let factory = MemorySinkFactory::new();
        for name in ["tracker_2", "tracker_1", "tracker_3"] {
            factory.create(name).unwrap();
        }
        assert_eq!(factory.names(), ["tracker_2", "tracker_1", "tracker_3"]);
        factory.clear();
        assert!(factory.names().is_empty());
    }

    #[test]
    fn tracing_sink_closes_once() {
        let sink = TracingSink::new("trace");
        assert_eq!(sink.name(), "trace");
        assert!(sink.increment(FrameCounter::Frozen, 1).is_ok());
        sink.close();
        sink.close();
        assert_eq!(sink.increment(FrameCounter::Total, 1), Err(SinkError::Closed));
    }
}
