// File: crates/pullscope-core/src/viewport.rs
// Summary: Visible time range plus helpers for x-only pan/zoom/select and y autoscale.

use crate::geometry::PlotArea;
use crate::grid::nice_step;
use crate::model::{Point, PointTimeseries, Timestamp};

/// Visible x range in timestamp units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_min: Timestamp,
    pub x_max: Timestamp,
}

impl Viewport {
    pub fn new(x_min: Timestamp, x_max: Timestamp) -> Self {
        let (x_min, x_max) = if x_min <= x_max { (x_min, x_max) } else { (x_max, x_min) };
        Self { x_min, x_max }
    }

    /// Full extent of the data; degenerate or empty data gets a unit-wide range.
    pub fn full_extent<'a>(series: impl IntoIterator<Item = &'a [Point]>) -> Self {
        let extent = series
            .into_iter()
            .filter_map(|pts| Some((pts.first()?.x, pts.last()?.x)))
            .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            });
        match extent {
            Some((lo, hi)) if lo.is_finite() && hi.is_finite() => {
                if (hi - lo).abs() < 1e-9 { Self::new(lo, lo + 1.0) } else { Self::new(lo, hi) }
            }
            _ => Self::new(0.0, 1.0),
        }
    }

    pub fn of_timeseries(ts: &PointTimeseries) -> Self {
        Self::full_extent(ts.datasets.iter().map(|d| d.points.as_slice()))
    }

    pub fn span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn contains(&self, x: Timestamp) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    pub fn pan_by_pixels(&mut self, dx: f32, area: &PlotArea) {
        let plot_w = (area.width() as f64).max(1.0);
        let wx = -(dx as f64) / plot_w * self.span();
        self.x_min += wx;
        self.x_max += wx;
    }

    /// Scale the span by `factor` keeping the time under `cursor_px` fixed.
    pub fn zoom_at_pixel(&mut self, factor: f64, cursor_px: f32, area: &PlotArea) {
        let plot_w = (area.width() as f64).max(1.0);
        let cx = (area.clamp_x(cursor_px) - area.left) as f64;
        let x_span = self.span();
        let wx = self.x_min + cx / plot_w * x_span;
        let nx = (x_span * factor).max(Self::MIN_SPAN);
        let rx = (wx - self.x_min) / x_span.max(Self::MIN_SPAN);
        self.x_min = wx - rx * nx;
        self.x_max = self.x_min + nx;
    }

    /// Narrow to the time range between two pixel columns of a drag selection.
    pub fn select_pixels(&mut self, from_px: f32, to_px: f32, area: &PlotArea) {
        let plot_w = (area.width() as f64).max(1.0);
        let a = (area.clamp_x(from_px) - area.left) as f64 / plot_w;
        let b = (area.clamp_x(to_px) - area.left) as f64 / plot_w;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let span = self.span();
        let lo = self.x_min + a * span;
        let hi = (self.x_min + b * span).max(lo + Self::MIN_SPAN);
        self.x_min = lo;
        self.x_max = hi;
    }

    const MIN_SPAN: f64 = 1e-6;
}

/// Indices `[start, end)` of the points within `[x_min, x_max]`, widened by one
/// neighbour on each side so edge segments still reach the plot border.
pub fn visible_window(points: &[Point], x_min: Timestamp, x_max: Timestamp) -> (usize, usize) {
    let start = points.partition_point(|p| p.x < x_min);
    let end = points.partition_point(|p| p.x <= x_max);
    (start.saturating_sub(1), (end + 1).min(points.len()))
}

pub fn visible_y_range<'a>(
    series: impl IntoIterator<Item = &'a [Point]>,
    x_min: f64,
    x_max: f64,
) -> Option<(f64, f64)> {
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut any = false;
    for points in series {
        let (start, end) = visible_window(points, x_min, x_max);
        for y in points[start..end].iter().filter_map(|p| p.y) {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
            any = true;
        }
    }
    if any { Some((y_min, y_max)) } else { None }
}

/// Y axis bounds: visible data, pulled down to `suggested_min` when given, rounded out
/// to nice steps. Data below the suggestion still extends the range.
pub fn autoscale_y<'a>(
    series: impl IntoIterator<Item = &'a [Point]>,
    viewport: &Viewport,
    suggested_min: Option<f64>,
    target_ticks: usize,
) -> (f64, f64) {
    let (mut lo, mut hi) =
        visible_y_range(series, viewport.x_min, viewport.x_max).unwrap_or((0.0, 1.0));
    if let Some(s) = suggested_min {
        lo = lo.min(s);
        hi = hi.max(s);
    }
    if (hi - lo).abs() < 1e-9 {
        hi = lo + 1.0;
    }
    let step = nice_step(hi - lo, target_ticks);
    ((lo / step).floor() * step, (hi / step).ceil() * step)
}
