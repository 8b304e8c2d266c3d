// File: crates/pullscope-core/src/scale.rs
// Summary: Continuous time (X) and linear value (Y) scale transforms.

use crate::geometry::PlotArea;
use crate::model::Timestamp;
use crate::viewport::Viewport;

/// Value Y coordinate (metric amount).
pub type Value = f64;

/// Horizontal time scale: pixel offset proportional to elapsed seconds.
#[derive(Clone, Copy, Debug)]
pub struct TimeScale {
    pub left_px: f32,
    pub start: Timestamp,
    pub px_per_second: f64,
}

impl TimeScale {
    pub fn new(area: &PlotArea, viewport: &Viewport) -> Self {
        let span = viewport.span().max(1e-12);
        Self {
            left_px: area.left,
            start: viewport.x_min,
            px_per_second: area.width() as f64 / span,
        }
    }
    #[inline]
    pub fn to_px(&self, x: Timestamp) -> f32 {
        self.left_px + ((x - self.start) * self.px_per_second) as f32
    }
    #[inline]
    pub fn from_px(&self, px: f32) -> Timestamp {
        self.start + (px - self.left_px) as f64 / self.px_per_second
    }
}

/// Vertical value scale mapping data range to [top, bottom] pixels.
#[derive(Clone, Copy, Debug)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: Value,
    pub vmax: Value,
}

impl ValueScale {
    pub fn new_linear(top_px: f32, bottom_px: f32, vmin: Value, vmax: Value) -> Self {
        let mut s = Self { top_px, bottom_px, vmin, vmax };
        if (s.vmax - s.vmin).abs() < 1e-12 { s.vmax = s.vmin + 1.0; }
        s
    }
    #[inline]
    pub fn to_px(&self, y: Value) -> f32 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.bottom_px - ((y - self.vmin) / span) as f32 * (self.bottom_px - self.top_px)
    }
}
