//! Real-time stress harness.
//!
//! Runs the same synthetic load under both clock topologies on the
//! thread-backed clock and prints per-unit counters, telemetry totals and
//! the measured cadence. Set `RUST_LOG=framewatch_engine=debug` (or
//! `framewatch::telemetry=debug`) to watch the engine work.
//!
//! Usage: `stress_harness [COUNT] [WORK_US] [SECONDS]`

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use framewatch_bench::stress_profile;
use framewatch_core::{LifecycleEvent, LifecycleListener, RateRequest, TargetRate};
use framewatch_engine::{CadenceMonitor, ClockMode, MemorySinkFactory, ThreadClock, TrackerManager};
use tracing_subscriber::EnvFilter;

fn arg(index: usize, default: u64) -> u64 {
    std::env::args()
        .nth(index)
        .and_then(|a| a.parse().ok())
        .unwrap_or(default)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let count = arg(1, 8) as usize;
    let work = Duration::from_micros(arg(2, 500));
    let run_for = Duration::from_secs(arg(3, 3));

    println!("=== framewatch stress harness ===");
    println!("units={count} work={work:?} duration={run_for:?}\n");

    let clock = Arc::new(ThreadClock::default());
    let sinks = MemorySinkFactory::new();
    let mut manager = TrackerManager::new(clock.clone()).with_sink_factory(Arc::new(sinks.clone()));

    let mut cadence = CadenceMonitor::new();
    cadence
        .start(clock.as_ref(), RateRequest::strict(TargetRate::HZ_60))
        .unwrap();

    for mode in [ClockMode::Shared, ClockMode::Dedicated] {
        sinks.clear();
        manager
            .configure(&stress_profile(count, mode, 60, work))
            .unwrap();

        thread::sleep(run_for / 2);
        // Simulate the host going to the background for a moment.
        manager.on_lifecycle(LifecycleEvent::Background);
        cadence.on_lifecycle(LifecycleEvent::Background);
        thread::sleep(Duration::from_millis(250));
        manager.on_lifecycle(LifecycleEvent::Foreground);
        cadence.on_lifecycle(LifecycleEvent::Foreground);
        thread::sleep(run_for / 2);

        println!("--- {mode} ---");
        for (i, snap) in manager.snapshots().iter().enumerate() {
            println!(
                "  unit {:>3}: total={:>5} slow={:>5} frozen={:>3}",
                i + 1,
                snap.total,
                snap.slow,
                snap.frozen
            );
        }
        let agg = manager.aggregate();
        println!(
            "  aggregate: total={} slow={} frozen={}",
            agg.total, agg.slow, agg.frozen
        );
        manager.stop_all();

        for name in sinks.names() {
            if let Some(t) = sinks.totals(&name) {
                println!("  sink {name}: total={} slow={} frozen={}", t.total, t.slow, t.frozen);
            }
        }
        println!("  cadence: {} fps\n", cadence.current_rate());
    }

    cadence.stop();
}
