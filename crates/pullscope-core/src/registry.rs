// File: crates/pullscope-core/src/registry.rs
// Summary: Process-wide, one-time registration of chart capabilities (pan/zoom, time scale).
// Notes:
// - `register_once` must run before the first `ChartRenderer::new`; it is safe to call
//   again on host re-initialisation and returns the registry built by the first call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::ticks_with_step;

/// Capability ids every chart needs.
pub const REQUIRED_CAPABILITIES: [&str; 2] = ["zoom", "timeseries"];

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

/// A rendering capability that must exist before charts are constructed.
pub trait Capability: Send + Sync {
    fn id(&self) -> &'static str;
}

/// Wheel and drag-select zoom handling. Gestures act on the time (x) axis only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanZoomCapability {
    pub wheel_enabled: bool,
    pub drag_enabled: bool,
    /// Span fraction removed per wheel line.
    pub wheel_speed: f64,
    /// Drag selections narrower than this (px) are clicks, not zooms.
    pub drag_threshold_px: f32,
}

impl Default for PanZoomCapability {
    fn default() -> Self {
        Self {
            wheel_enabled: true,
            drag_enabled: true,
            wheel_speed: 0.1,
            drag_threshold_px: 4.0,
        }
    }
}

impl PanZoomCapability {
    /// Span multiplier for a wheel delta in lines (positive zooms in).
    pub fn wheel_factor(&self, lines: f64) -> f64 {
        (1.0 - lines * self.wheel_speed).clamp(0.1, 10.0)
    }
}

impl Capability for PanZoomCapability {
    fn id(&self) -> &'static str { "zoom" }
}

/// Smallest time unit the axis labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    #[default]
    Second,
    Minute,
}

impl TimeUnit {
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnit::Millisecond => 0.001,
            TimeUnit::Second => 1.0,
            TimeUnit::Minute => 60.0,
        }
    }
}

/// Continuous time axis: spacing proportional to elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeScaleCapability {
    pub min_unit: TimeUnit,
}

impl TimeScaleCapability {
    // Candidate tick steps in seconds.
    const STEPS: [f64; 17] = [
        0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 300.0,
        900.0, 3600.0,
    ];

    /// Timestamps above this are treated as unix epoch seconds when labelling.
    const EPOCH_THRESHOLD: f64 = 1.0e9;

    /// Pick a tick step so that about `target` ticks cover `[min, max]`.
    pub fn tick_step(&self, min: f64, max: f64, target: usize) -> f64 {
        let raw = (max - min).abs() / target.max(1) as f64;
        let floor = self.min_unit.seconds();
        Self::STEPS
            .iter()
            .copied()
            .filter(|s| *s >= floor)
            .find(|s| *s >= raw)
            .unwrap_or_else(|| (raw / 3600.0).ceil().max(1.0) * 3600.0)
    }

    pub fn ticks(&self, min: f64, max: f64, target: usize) -> (f64, Vec<f64>) {
        let step = self.tick_step(min, max, target);
        (step, ticks_with_step(min, max, step, target.saturating_mul(3).max(2)))
    }

    /// Label for a tick at `t` given the tick step.
    pub fn format(&self, t: f64, step: f64) -> String {
        if t.abs() >= Self::EPOCH_THRESHOLD {
            let secs = t.floor() as i64;
            let nanos = ((t - t.floor()) * 1e9) as u32;
            if let Some(dt) = DateTime::from_timestamp(secs, nanos) {
                let fmt = if step < 1.0 { "%H:%M:%S%.3f" } else { "%H:%M:%S" };
                return dt.format(fmt).to_string();
            }
        }
        let sign = if t < 0.0 { "-" } else { "" };
        let abs = t.abs();
        let minutes = (abs / 60.0).floor() as u64;
        let seconds = abs - minutes as f64 * 60.0;
        if step < 1.0 {
            format!("{sign}{minutes}:{seconds:06.3}")
        } else {
            format!("{sign}{minutes}:{:02}", seconds.round() as u64)
        }
    }
}

impl Capability for TimeScaleCapability {
    fn id(&self) -> &'static str { "timeseries" }
}

/// Registered capabilities; one instance per process.
#[derive(Debug)]
pub struct Registry {
    pub pan_zoom: PanZoomCapability,
    pub time_scale: TimeScaleCapability,
}

impl Registry {
    fn builtin() -> Self {
        Self {
            pan_zoom: PanZoomCapability::default(),
            time_scale: TimeScaleCapability::default(),
        }
    }

    pub fn capabilities(&self) -> [&dyn Capability; 2] {
        [&self.pan_zoom as &dyn Capability, &self.time_scale]
    }

    pub fn has(&self, id: &str) -> bool {
        self.capabilities().iter().any(|c| c.id() == id)
    }

    pub fn missing(&self) -> Vec<&'static str> {
        REQUIRED_CAPABILITIES.into_iter().filter(|id| !self.has(id)).collect()
    }
}

/// Register the built-in capabilities. Later calls are no-ops returning the same registry.
pub fn register_once() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        let registry = Registry::builtin();
        debug!(
            capabilities = ?registry.capabilities().iter().map(|c| c.id()).collect::<Vec<_>>(),
            "registered chart capabilities"
        );
        registry
    })
}

/// The registry, if `register_once` has run.
pub fn registry() -> Option<&'static Registry> {
    REGISTRY.get()
}

/// How many times registration actually executed in this process (0 or 1).
pub fn registration_count() -> usize {
    REGISTRATIONS.load(Ordering::SeqCst)
}
