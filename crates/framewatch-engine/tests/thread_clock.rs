//! Real-time runs on the thread-backed clock. Deadlines are generous so
//! the tests hold on loaded machines.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use framewatch_core::{FrameCounter, RateRequest, TargetRate};
use framewatch_engine::{
    CadenceMonitor, ClockMode, ManagerConfig, ThreadClock, ThreadClockConfig, TrackerManager,
};
use framewatch_test_utils::{FailingSinkFactory, RecordingSinkFactory};

fn wait_until(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
    let give_up = Instant::now() + limit;
    while Instant::now() < give_up {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn shared_manager_counts_real_ticks() {
    let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()));
    manager.configure(&ManagerConfig::default()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        manager.snapshots().iter().all(|s| s.total >= 10)
    }));
    manager.stop_all();
}

#[test]
fn dedicated_manager_counts_real_ticks() {
    let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()));
    manager
        .configure(&ManagerConfig {
            count: 4,
            mode: ClockMode::Dedicated,
            ..ManagerConfig::default()
        })
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        manager.snapshots().iter().all(|s| s.total >= 10)
    }));
    let agg = manager.aggregate();
    assert!(agg.frozen <= agg.slow && agg.slow <= agg.total);
}

#[test]
fn stopped_unit_receives_no_ticks() {
    let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()));
    manager
        .configure(&ManagerConfig {
            count: 2,
            mode: ClockMode::Dedicated,
            ..ManagerConfig::default()
        })
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        manager.aggregate().total >= 2
    }));
    manager.tracker_mut(0).unwrap().stop();
    let before = manager.tracker(0).unwrap().snapshot();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(manager.tracker(0).unwrap().snapshot(), before);
    manager.stop_all();
}

#[test]
fn stop_all_halts_every_unit() {
    let factory = Arc::new(RecordingSinkFactory::new());
    let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()))
        .with_sink_factory(factory.clone());
    manager
        .configure(&ManagerConfig {
            count: 2,
            mode: ClockMode::Dedicated,
            ..ManagerConfig::default()
        })
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        manager.snapshots().iter().all(|s| s.total >= 2)
    }));
    manager.stop_all();
    assert_eq!(factory.close_count("tracker_1"), 1);
    assert_eq!(factory.close_count("tracker_2"), 1);
    let calls = factory.calls().len();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(factory.calls().len(), calls);
}

#[test]
fn panicking_sink_does_not_stop_the_clock_thread() {
    let mut manager = TrackerManager::new(Arc::new(ThreadClock::default()))
        .with_sink_factory(Arc::new(FailingSinkFactory::Panicking(FrameCounter::Total)));
    manager
        .configure(&ManagerConfig {
            count: 2,
            mode: ClockMode::Dedicated,
            ..ManagerConfig::default()
        })
        .unwrap();
    assert!(wait_until(Duration::from_secs(5), || {
        manager.snapshots().iter().all(|s| s.total >= 10)
    }));
    manager.stop_all();
}

#[test]
fn rate_above_clock_maximum_is_refused() {
    let clock = ThreadClock::new(ThreadClockConfig {
        max_rate: TargetRate::HZ_60,
        ..ThreadClockConfig::default()
    });
    let mut manager = TrackerManager::new(Arc::new(clock));
    let result = manager.configure(&ManagerConfig {
        rate: RateRequest::strict(TargetRate::HZ_120),
        ..ManagerConfig::default()
    });
    assert!(result.is_err());
    assert!(manager.is_empty());
}

#[test]
fn cadence_monitor_reports_a_rate() {
    let clock = ThreadClock::default();
    let mut monitor = CadenceMonitor::new();
    monitor
        .start(&clock, RateRequest::strict(TargetRate::HZ_60))
        .unwrap();
    assert!(wait_until(Duration::from_secs(10), || monitor.current_rate() > 0));
    let rate = monitor.current_rate();
    assert!(rate <= 61, "rate {rate}");
    monitor.stop();
}
