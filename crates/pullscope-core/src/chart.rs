// File: crates/pullscope-core/src/chart.rs
// Summary: Chart renderer: draw configuration, surface attach/update/detach and gesture routing.
// Notes:
// - One `RenderHandle` per mounted chart view. Dropping or detaching it releases the
//   surface exactly once, including on error paths.
// - The handle is single-threaded: every gesture, update and redraw arrives
//   through `&mut self` in event order.

use tracing::{debug, trace, warn};

use crate::axis::{TimeAxis, ValueAxis};
use crate::error::{ChartError, ChartResult};
use crate::geometry::PlotArea;
use crate::interaction::{InteractionController, Transition, ViewEvent, ViewState, ZoomState};
use crate::interp::Interpolation;
use crate::model::{BucketGrid, Point, PointTimeseries, Timestamp};
use crate::options::ChartOptions;
use crate::registry::{self, Registry};
use crate::scale::TimeScale;
use crate::scene::{build_scene, Overlay, Scene};
use crate::theme::{palette_color, Rgba, Theme};
use crate::types::Insets;
use crate::viewport::{visible_window, Viewport};

/// Drawable target provided by the host view on mount.
pub trait RenderSurface {
    /// Pixel size, or `None` while the host has not laid the surface out.
    fn size(&self) -> Option<(u32, u32)>;
    fn present(&mut self, scene: &Scene) -> ChartResult<()>;
    /// Free backend resources. Called exactly once per attach.
    fn release(&mut self);

    fn is_ready(&self) -> bool {
        matches!(self.size(), Some((w, h)) if w > 0 && h > 0)
    }
}

/// Visual series for one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesConfig {
    pub label: String,
    pub color: Rgba,
    pub interpolation: Interpolation,
    pub line_width: f32,
    pub point_radius: f32,
    pub fill: bool,
    pub points: Vec<Point>,
}

/// Everything needed to draw a frame, independent of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawConfig {
    pub title: Option<String>,
    pub series: Vec<SeriesConfig>,
    pub x_axis: TimeAxis,
    pub y_axis: ValueAxis,
    /// Always false: frames reflect live gesture state immediately.
    pub animation: bool,
    /// False: pointer events need not hit a line to register.
    pub intersect: bool,
    pub show_legend: bool,
    pub interval: Option<f64>,
    pub buckets: Option<BucketGrid>,
    pub gap_factor: f64,
    pub insets: Insets,
    pub x_ticks: usize,
    pub y_ticks: usize,
    interpolation: Interpolation,
    line_width: f32,
    point_radius: f32,
}

impl DrawConfig {
    pub fn build(timeseries: PointTimeseries, options: &ChartOptions) -> Self {
        let mut x_axis = TimeAxis::new(options.x_title.clone());
        x_axis.min_unit = options.time_unit;
        let mut y_axis = ValueAxis::new(options.y_title.clone());
        y_axis.suggested_min = options.y_suggested_min;

        let mut config = Self {
            title: options.title.clone(),
            series: Vec::new(),
            x_axis,
            y_axis,
            animation: false,
            intersect: false,
            show_legend: options.show_legend,
            interval: None,
            buckets: None,
            gap_factor: options.gap_factor,
            insets: options.insets,
            x_ticks: options.x_ticks,
            y_ticks: options.y_ticks,
            interpolation: options.interpolation,
            line_width: options.line_width,
            point_radius: options.point_radius,
        };
        config.replace_data(timeseries);
        config
    }

    /// Swap in new datasets; series that keep their name keep their color.
    pub fn replace_data(&mut self, timeseries: PointTimeseries) {
        let previous = std::mem::take(&mut self.series);
        self.interval = timeseries.interval;
        self.buckets = timeseries.buckets;
        self.series = timeseries
            .datasets
            .into_iter()
            .enumerate()
            .map(|(i, ds)| {
                let color = previous
                    .iter()
                    .find(|s| s.label == ds.name)
                    .map(|s| s.color)
                    .unwrap_or_else(|| palette_color(i));
                SeriesConfig {
                    label: ds.name,
                    color,
                    interpolation: self.interpolation,
                    line_width: self.line_width,
                    point_radius: self.point_radius,
                    fill: false,
                    points: ds.points,
                }
            })
            .collect();
    }

    /// Largest neighbour spacing still drawn as a connected line, for data without a
    /// bucket grid.
    pub fn max_gap(&self) -> Option<f64> {
        self.interval.map(|i| i * self.gap_factor)
    }

    /// Whether neighbouring real points at `a` and `b` must not be connected.
    ///
    /// Aggregated data breaks where an empty bucket lies between the two points. Other
    /// data breaks where the spacing exceeds `max_gap`.
    pub fn breaks_between(&self, a: Timestamp, b: Timestamp) -> bool {
        match (self.buckets, self.max_gap()) {
            (Some(grid), _) => grid.skips_between(a, b),
            (None, Some(gap)) => (b - a).abs() > gap,
            (None, None) => false,
        }
    }

    pub fn full_extent(&self) -> Viewport {
        Viewport::full_extent(self.series.iter().map(|s| s.points.as_slice()))
    }
}

/// Pointer input in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Wheel over the surface; positive `lines` zooms in.
    Wheel { x_px: f32, lines: f64 },
    DragStart { x_px: f32 },
    DragMove { x_px: f32 },
    DragEnd { x_px: f32 },
    /// Shift the visible range by a pixel delta.
    Pan { dx_px: f32 },
    PointerMove { x_px: f32 },
    PointerLeave,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoverItem {
    pub dataset: usize,
    pub label: String,
    pub x: Timestamp,
    pub y: f64,
    pub color: Rgba,
}

/// Values under the pointer, one per dataset with a nearby real point.
#[derive(Clone, Debug, PartialEq)]
pub struct Hover {
    pub x: Timestamp,
    pub items: Vec<HoverItem>,
}

/// Factory for chart handles; exists only after capability registration.
pub struct ChartRenderer {
    options: ChartOptions,
    theme: Theme,
    registry: &'static Registry,
}

impl ChartRenderer {
    pub fn new(options: ChartOptions) -> ChartResult<Self> {
        let registry = registry::registry().ok_or(ChartError::CapabilitiesMissing)?;
        let missing = registry.missing();
        if !missing.is_empty() {
            warn!(?missing, "chart capabilities not registered");
            return Err(ChartError::CapabilitiesMissing);
        }
        let theme = options.theme();
        Ok(Self { options, theme, registry })
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Bind `surface` to a new chart instance and draw the first frame.
    pub fn attach<S: RenderSurface>(&self, surface: S, timeseries: PointTimeseries) -> ChartResult<RenderHandle<S>> {
        if !surface.is_ready() {
            debug!("surface not laid out yet; attach deferred to next mount");
            return Err(ChartError::SurfaceUnavailable);
        }
        timeseries.validate()?;

        let config = DrawConfig::build(timeseries, &self.options);
        let full = config.full_extent();
        let mut handle = RenderHandle {
            surface: Some(surface),
            config,
            theme: self.theme,
            registry: self.registry,
            viewport: full,
            full,
            controller: InteractionController::new(),
            drag_anchor: None,
            selection: None,
            hover_px: None,
            frames: 0,
        };
        handle.redraw()?;
        debug!(datasets = handle.config.series.len(), "chart attached");
        Ok(handle)
    }
}

/// A mounted chart: owns the surface, draw configuration, viewport and zoom state.
pub struct RenderHandle<S: RenderSurface> {
    surface: Option<S>,
    config: DrawConfig,
    theme: Theme,
    registry: &'static Registry,
    viewport: Viewport,
    full: Viewport,
    controller: InteractionController,
    drag_anchor: Option<f32>,
    selection: Option<(f32, f32)>,
    hover_px: Option<f32>,
    frames: u64,
}

impl<S: RenderSurface> RenderHandle<S> {
    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn full_extent(&self) -> Viewport {
        self.full
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.controller.state()
    }

    pub fn view_state(&self) -> ViewState {
        self.controller.view_state()
    }

    /// Drives the host's reset-zoom control.
    pub fn show_reset(&self) -> bool {
        self.controller.show_reset()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Mutable access, e.g. to resize before the next `redraw`.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    fn plot(&self) -> PlotArea {
        let (w, h) = self.surface.as_ref().and_then(|s| s.size()).unwrap_or((1, 1));
        PlotArea::inset(w, h, &self.config.insets)
    }

    /// Replace the data in place; the current viewport survives when zoomed.
    pub fn update(&mut self, timeseries: PointTimeseries) -> ChartResult<()> {
        timeseries.validate()?;
        self.config.replace_data(timeseries);
        self.full = self.config.full_extent();
        if self.controller.state() == ZoomState::Default {
            self.viewport = self.full;
        }
        self.controller.handle(ViewEvent::DataUpdated);
        self.redraw()
    }

    /// Show `[x_min, x_max]`, as a drag-select of that range would.
    pub fn zoom_to(&mut self, x_min: Timestamp, x_max: Timestamp) -> ChartResult<Option<Transition>> {
        self.viewport = Viewport::new(x_min, x_max);
        let t = self.controller.handle(ViewEvent::DragSelect);
        self.redraw()?;
        Ok(t)
    }

    /// Restore the full extent of the current data and hide the reset control.
    pub fn reset_zoom(&mut self) -> ChartResult<Option<Transition>> {
        self.viewport = self.full;
        self.drag_anchor = None;
        self.selection = None;
        let t = self.controller.handle(ViewEvent::Reset);
        self.redraw()?;
        Ok(t)
    }

    pub fn handle_gesture(&mut self, gesture: Gesture) -> ChartResult<Option<Transition>> {
        let plot = self.plot();
        let pan_zoom = self.registry.pan_zoom;
        trace!(?gesture, "gesture");

        let event = match gesture {
            Gesture::Wheel { x_px, lines } => {
                if !pan_zoom.wheel_enabled || !plot.contains_x(x_px) || lines == 0.0 {
                    return Ok(None);
                }
                self.viewport.zoom_at_pixel(pan_zoom.wheel_factor(lines), x_px, &plot);
                Some(ViewEvent::WheelZoom)
            }
            Gesture::DragStart { x_px } => {
                if !pan_zoom.drag_enabled || !plot.contains_x(x_px) {
                    return Ok(None);
                }
                self.drag_anchor = Some(x_px);
                self.selection = Some((x_px, x_px));
                None
            }
            Gesture::DragMove { x_px } => {
                let Some(anchor) = self.drag_anchor else { return Ok(None) };
                self.selection = Some((anchor, x_px));
                None
            }
            Gesture::DragEnd { x_px } => {
                let Some(anchor) = self.drag_anchor.take() else { return Ok(None) };
                self.selection = None;
                if (x_px - anchor).abs() >= pan_zoom.drag_threshold_px {
                    self.viewport.select_pixels(anchor, x_px, &plot);
                    Some(ViewEvent::DragSelect)
                } else {
                    None
                }
            }
            Gesture::Pan { dx_px } => {
                if dx_px == 0.0 {
                    return Ok(None);
                }
                self.viewport.pan_by_pixels(dx_px, &plot);
                Some(ViewEvent::Pan)
            }
            Gesture::PointerMove { x_px } => {
                self.hover_px = plot.contains_x(x_px).then_some(x_px);
                Some(ViewEvent::Hover)
            }
            Gesture::PointerLeave => {
                self.hover_px = None;
                Some(ViewEvent::Hover)
            }
        };

        let transition = event.and_then(|e| self.controller.handle(e));
        self.redraw()?;
        Ok(transition)
    }

    /// Nearest real point per dataset under pixel column `px`.
    pub fn hover_at(&self, px: f32) -> Option<Hover> {
        let plot = self.plot();
        if !plot.contains_x(px) {
            return None;
        }
        let x = TimeScale::new(&plot, &self.viewport).from_px(px);
        let items = self
            .config
            .series
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                let (start, end) = visible_window(&s.points, self.viewport.x_min, self.viewport.x_max);
                let p = nearest_real(&s.points[start..end], x)?;
                if !self.viewport.contains(p.x) {
                    return None;
                }
                Some(HoverItem { dataset: i, label: s.label.clone(), x: p.x, y: p.y?, color: s.color })
            })
            .collect();
        Some(Hover { x, items })
    }

    /// Build the current frame without presenting it.
    pub fn scene(&self) -> Option<Scene> {
        let size = self.surface.as_ref()?.size()?;
        let hover = self.hover_px.and_then(|px| self.hover_at(px));
        let overlay = Overlay { selection: self.selection, hover: hover.as_ref() };
        Some(build_scene(&self.config, &self.viewport, size, &self.theme, self.registry, &overlay))
    }

    pub fn redraw(&mut self) -> ChartResult<()> {
        let scene = self.scene().ok_or(ChartError::SurfaceUnavailable)?;
        let surface = self.surface.as_mut().ok_or(ChartError::SurfaceUnavailable)?;
        surface.present(&scene)?;
        self.frames += 1;
        Ok(())
    }

    /// Release the surface. Consuming the handle makes a second detach impossible.
    pub fn detach(mut self) {
        self.release_surface();
    }

    fn release_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            debug!(frames = self.frames, "chart surface released");
        }
    }
}

impl<S: RenderSurface> Drop for RenderHandle<S> {
    fn drop(&mut self) {
        self.release_surface();
    }
}

fn nearest_real(points: &[Point], x: Timestamp) -> Option<&Point> {
    let i = points.partition_point(|p| p.x < x);
    let left = points[..i].iter().rev().find(|p| p.y.is_some());
    let right = points[i..].iter().find(|p| p.y.is_some());
    match (left, right) {
        (Some(l), Some(r)) => Some(if x - l.x <= r.x - x { l } else { r }),
        (l, r) => l.or(r),
    }
}
