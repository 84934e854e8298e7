//! Benchmark profiles and tick generators for the framewatch engine.
//!
//! - [`stress_profile`]: a manager configuration with synthetic load
//! - [`jank_ticks`]: a deterministic tick stream with periodic stalls

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::time::Duration;

use framewatch_core::{RateRequest, TargetRate, Tick};
use framewatch_engine::{ClockMode, ManagerConfig, TrackerConfig};

/// Every `SLOW_EVERY`th interval in [`jank_ticks`] runs two periods long.
pub const SLOW_EVERY: usize = 7;

/// Every `FROZEN_EVERY`th interval in [`jank_ticks`] runs fifty periods long.
pub const FROZEN_EVERY: usize = 97;

/// A manager configuration for `count` units at `hz`, each burning `work`
/// per tick.
pub fn stress_profile(count: usize, mode: ClockMode, hz: u32, work: Duration) -> ManagerConfig {
    ManagerConfig {
        count,
        mode,
        rate: RateRequest::strict(TargetRate::new(hz).unwrap_or_default()),
        work,
        tracker: TrackerConfig::default(),
    }
}

/// `n` ticks at `period`, with a slow interval every [`SLOW_EVERY`] and a
/// frozen one every [`FROZEN_EVERY`].
///
/// Deterministic, so runs are comparable.
pub fn jank_ticks(n: usize, period: f64) -> Vec<Tick> {
    let mut ts = 0.0;
    (0..n)
        .map(|i| {
            if i > 0 {
                ts += if i % FROZEN_EVERY == 0 {
                    50.0 * period
                } else if i % SLOW_EVERY == 0 {
                    2.0 * period
                } else {
                    0.9 * period
                };
            }
            Tick::new(ts, ts + period)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use framewatch_core::TrackerId;
    use framewatch_engine::Tracker;

    #[test]
    fn jank_ticks_produce_the_advertised_mix() {
        let mut tracker = Tracker::new(TrackerId(0), TrackerConfig::default()).unwrap();
        tracker.start(TargetRate::HZ_60);
        for tick in jank_ticks(98, 1.0 / 60.0) {
            tracker.on_tick(tick);
        }
        let snap = tracker.snapshot();
        assert_eq!(snap.total, 97);
        // 7, 14, ..., 91 plus the frozen one at 97.
        assert_eq!(snap.slow, 14);
        assert_eq!(snap.frozen, 1);
    }

    #[test]
    fn stress_profile_validates() {
        let config = stress_profile(8, ClockMode::Dedicated, 120, Duration::from_micros(200));
        assert!(config.validate().is_ok());
        assert_eq!(config.rate.target.hz(), 120);
    }
}
