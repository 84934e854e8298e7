//! Frame counters and read-only snapshots.
//!
//! [`FrameCounters`] is the live, per-unit counter block written from
//! the tick path. [`CounterSnapshot`] is the plain value handed upward
//! to whatever displays or exports the numbers.

use std::iter::Sum;
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};

use framewatch_core::FrameCounter;

/// A point-in-time copy of one unit's counters, or a sum of several.
///
/// Every snapshot taken from a single [`FrameCounters`] satisfies
/// `frozen <= slow <= total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Classified intervals.
    pub total: u64,
    /// Intervals over budget.
    pub slow: u64,
    /// Intervals over the freeze threshold.
    pub frozen: u64,
}

impl CounterSnapshot {
    /// Value of one named counter.
    pub fn get(&self, counter: FrameCounter) -> u64 {
        match counter {
            FrameCounter::Total => self.total,
            FrameCounter::Slow => self.slow,
            FrameCounter::Frozen => self.frozen,
        }
    }

    /// Whether `frozen <= slow <= total` holds.
    pub fn is_consistent(&self) -> bool {
        self.frozen <= self.slow && self.slow <= self.total
    }
}

impl Add for CounterSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            total: self.total.saturating_add(rhs.total),
            slow: self.slow.saturating_add(rhs.slow),
            frozen: self.frozen.saturating_add(rhs.frozen),
        }
    }
}

impl Sum for CounterSnapshot {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Live counters for one tracking unit.
///
/// Written only from that unit's tick path; read lock-free from any
/// thread. Increments always go total, then slow, then frozen, and
/// [`snapshot`](FrameCounters::snapshot) loads in the reverse order, so
/// a concurrent read never sees `frozen > slow` or `slow > total`.
#[derive(Debug, Default)]
pub struct FrameCounters {
    total: AtomicU64,
    slow: AtomicU64,
    frozen: AtomicU64,
}

// Compile-time assertion: FrameCounters must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FrameCounters>();
};

impl FrameCounters {
    /// Fresh counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `counter`.
    ///
    /// Callers increment in [`FrameVerdict::counters`] order.
    ///
    /// [`FrameVerdict::counters`]: framewatch_core::FrameVerdict::counters
    pub fn increment(&self, counter: FrameCounter) {
        self.cell(counter).fetch_add(1, Ordering::Release);
    }

    /// Read all three counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        let frozen = self.frozen.load(Ordering::Acquire);
        let slow = self.slow.load(Ordering::Acquire);
        let total = self.total.load(Ordering::Acquire);
        CounterSnapshot {
            total,
            slow,
            frozen,
        }
    }

    /// Zero all counters.
    ///
    /// Must not race with [`increment`](FrameCounters::increment); a
    /// snapshot taken during a reset may mix old and new values.
    pub fn reset(&self) {
        self.frozen.store(0, Ordering::Release);
        self.slow.store(0, Ordering::Release);
        self.total.store(0, Ordering::Release);
    }

    fn cell(&self, counter: FrameCounter) -> &AtomicU64 {
        match counter {
            FrameCounter::Total => &self.total,
            FrameCounter::Slow => &self.slow,
            FrameCounter::Frozen => &self.frozen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewatch_core::FrameVerdict;

    #[test]
    fn default_counters_are_zero() {
        let c = FrameCounters::new();
        assert_eq!(c.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn verdict_counters_drive_increments() {
        let c = FrameCounters::new();
        for verdict in [
            FrameVerdict::Normal,
            FrameVerdict::Slow,
            FrameVerdict::Frozen,
            FrameVerdict::Normal,
        ] {
            for counter in verdict.counters() {
                c.increment(counter);
            }
        }
        let snap = c.snapshot();
        assert_eq!(
            snap,
            CounterSnapshot {
                total: 4,
                slow: 2,
                frozen: 1
            }
        );
        assert!(snap.is_consistent());
        assert_eq!(snap.get(FrameCounter::Slow), 2);
    }

    #[test]
    fn reset_zeroes_everything() {
        let c = FrameCounters::new();
        c.increment(FrameCounter::Total);
        c.increment(FrameCounter::Slow);
        c.reset();
        assert_eq!(c.snapshot(), CounterSnapshot::default());
    }

    #[test]
    fn snapshots_sum() {
        let a = CounterSnapshot {
            total: 3,
            slow: 1,
            frozen: 0,
        };
        let b = CounterSnapshot {
            total: 5,
            slow: 2,
            frozen: 1,
        };
        let sum: CounterSnapshot = [a, b].into_iter().sum();
        assert_eq!(
            sum,
            CounterSnapshot {
                total: 8,
                slow: 3,
                frozen: 1
            }
        );
    }

    #[test]
    fn concurrent_reads_stay_consistent() {
        use std::sync::Arc;

        let c = Arc::new(FrameCounters::new());
        let writer = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || {
                for i in 0..20_000u32 {
                    let verdict = match i % 7 {
                        0 => FrameVerdict::Frozen,
                        1 | 2 => FrameVerdict::Slow,
                        _ => FrameVerdict::Normal,
                    };
                    for counter in verdict.counters() {
                        c.increment(counter);
                    }
                }
            })
        };
        for _ in 0..20_000 {
            assert!(c.snapshot().is_consistent());
        }
        writer.join().unwrap();
        assert_eq!(c.snapshot().total, 20_000);
    }
}
