//! Tick sequence fixtures.
//!
//! All helpers attach `deadline = timestamp + period`, the shape a real
//! display link delivers.

use framewatch_core::Tick;

/// Refresh period of a 60 Hz display, in seconds.
pub const PERIOD_60HZ: f64 = 1.0 / 60.0;

/// `n` ticks spaced exactly one period apart, starting at `start`.
pub fn steady_ticks(start: f64, period: f64, n: usize) -> Vec<Tick> {
    (0..n)
        .map(|i| {
            let ts = start + i as f64 * period;
            Tick::new(ts, ts + period)
        })
        .collect()
}

/// One tick per timestamp, each advertising `period` as its interval.
pub fn ticks_at(timestamps: &[f64], period: f64) -> Vec<Tick> {
    timestamps
        .iter()
        .map(|&ts| Tick::new(ts, ts + period))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_ticks_are_evenly_spaced() {
        let ticks = steady_ticks(1.0, 0.5, 3);
        let ts: Vec<f64> = ticks.iter().map(|t| t.timestamp).collect();
        assert_eq!(ts, [1.0, 1.5, 2.0]);
        assert!(ticks.iter().all(|t| t.interval_estimate() == Some(0.5)));
    }
}
