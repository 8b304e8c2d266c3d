// File: crates/pullscope-core/tests/registry.rs
// Purpose: One-time capability registration and the time-scale capability it provides.

use pullscope_core::registry::{self, registration_count, TimeScaleCapability, TimeUnit};
use pullscope_core::{register_once, ChartOptions, ChartRenderer};

#[test]
fn register_once_is_idempotent() {
    let first = register_once();
    for _ in 0..10 {
        let again = register_once();
        assert!(std::ptr::eq(first, again), "registry must not be rebuilt");
    }
    assert_eq!(registration_count(), 1);
    assert!(std::ptr::eq(registry::registry().expect("registered"), first));
    assert!(first.has("zoom"));
    assert!(first.has("timeseries"));
    assert!(!first.has("category"));
    assert!(first.missing().is_empty());
}

#[test]
fn register_once_from_many_threads() {
    let handles: Vec<_> = (0..8).map(|_| std::thread::spawn(|| register_once() as *const _ as usize)).collect();
    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(registration_count(), 1);
}

#[test]
fn renderer_constructs_after_registration() {
    register_once();
    assert!(ChartRenderer::new(ChartOptions::default()).is_ok());
}

#[test]
fn wheel_factor_is_clamped() {
    let pz = register_once().pan_zoom;
    assert!((pz.wheel_factor(1.0) - 0.9).abs() < 1e-12);
    assert!((pz.wheel_factor(-1.0) - 1.1).abs() < 1e-12);
    assert_eq!(pz.wheel_factor(100.0), 0.1);
}

#[test]
fn time_ticks_follow_elapsed_seconds() {
    let scale = TimeScaleCapability::default();
    let (step, ticks) = scale.ticks(0.0, 60.0, 6);
    assert_eq!(step, 10.0);
    assert_eq!(ticks, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);

    // Second is the smallest unit by default, even for sub-second spans.
    assert_eq!(scale.tick_step(0.0, 0.5, 8), 1.0);
    let fine = TimeScaleCapability { min_unit: TimeUnit::Millisecond };
    assert!(fine.tick_step(0.0, 0.5, 8) < 1.0);
}

#[test]
fn time_labels() {
    let scale = TimeScaleCapability::default();
    assert_eq!(scale.format(65.0, 1.0), "1:05");
    assert_eq!(scale.format(0.25, 0.05), "0:00.250");
    // 2014-02-11T00:00:00Z
    assert_eq!(scale.format(1_392_076_800.0, 1.0), "00:00:00");
}
