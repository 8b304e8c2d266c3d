// File: crates/pullscope-core/src/scene.rs
// Summary: Renderer-agnostic frame: pixel-space primitives built from a draw configuration.
// Notes:
// - Backends draw `grid`, then `series` and `dots` clipped to `plot`, then `overlay`,
//   `rects` and `labels` unclipped.
// - Lines break at missing values and wherever `DrawConfig::breaks_between` reports a gap.

use crate::chart::{DrawConfig, Hover};
use crate::geometry::PlotArea;
use crate::grid::nice_ticks;
use crate::interp::{monotone_segments, Interpolation};
use crate::model::Point;
use crate::registry::{Registry, TimeScaleCapability};
use crate::scale::{TimeScale, ValueScale};
use crate::theme::{Rgba, Theme};
use crate::viewport::{autoscale_y, visible_window, Viewport};

// Rough glyph advance used for legend/tooltip layout; backends measure real text.
const CHAR_PX: f32 = 7.0;
const LABEL_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    CubicTo { c1: (f32, f32), c2: (f32, f32), to: (f32, f32) },
}

/// One continuous stroked run of a dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokePath {
    pub dataset: usize,
    pub color: Rgba,
    pub width: f32,
    pub cmds: Vec<PathCmd>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePrim {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub color: Rgba,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub dataset: usize,
    pub center: (f32, f32),
    pub radius: f32,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    /// Baseline anchor.
    pub at: (f32, f32),
    pub size: f32,
    pub color: Rgba,
    pub align: TextAlign,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    pub plot: PlotArea,
    pub y_range: (f64, f64),
    pub grid: Vec<LinePrim>,
    pub series: Vec<StrokePath>,
    pub dots: Vec<Dot>,
    pub overlay: Vec<LinePrim>,
    pub rects: Vec<FillRect>,
    pub labels: Vec<Label>,
}

impl Scene {
    pub fn paths_for(&self, dataset: usize) -> impl Iterator<Item = &StrokePath> {
        self.series.iter().filter(move |p| p.dataset == dataset)
    }

    pub fn dots_for(&self, dataset: usize) -> impl Iterator<Item = &Dot> {
        self.dots.iter().filter(move |d| d.dataset == dataset)
    }
}

/// Transient interaction overlays for one frame.
#[derive(Clone, Debug, Default)]
pub struct Overlay<'a> {
    /// Drag-select band in progress, as two pixel columns.
    pub selection: Option<(f32, f32)>,
    pub hover: Option<&'a Hover>,
}

/// Split ordered points into continuous runs of real values.
///
/// A run ends at a missing value, or where `breaks(prev_x, x)` holds for two
/// neighbouring real points.
pub fn split_runs(points: &[Point], breaks: impl Fn(f64, f64) -> bool) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for p in points {
        let Some(y) = p.y else {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        };
        if let Some(&(prev_x, _)) = current.last() {
            if breaks(prev_x, p.x) {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push((p.x, y));
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

pub fn build_scene(
    config: &DrawConfig,
    viewport: &Viewport,
    size: (u32, u32),
    theme: &Theme,
    registry: &Registry,
    overlay: &Overlay<'_>,
) -> Scene {
    let (width, height) = size;
    let plot = PlotArea::inset(width, height, &config.insets);
    let y_range = autoscale_y(
        config.series.iter().map(|s| s.points.as_slice()),
        viewport,
        config.y_axis.suggested_min,
        config.y_ticks,
    );
    let xs = TimeScale::new(&plot, viewport);
    let ys = ValueScale::new_linear(plot.top, plot.bottom, y_range.0, y_range.1);

    let mut scene = Scene {
        width,
        height,
        background: theme.background,
        plot,
        y_range,
        grid: Vec::new(),
        series: Vec::new(),
        dots: Vec::new(),
        overlay: Vec::new(),
        rects: Vec::new(),
        labels: Vec::new(),
    };

    let mut time = registry.time_scale;
    time.min_unit = config.x_axis.min_unit;
    push_axes(&mut scene, config, viewport, &xs, &ys, &time, theme);
    push_series(&mut scene, config, viewport, &xs, &ys);
    if config.show_legend {
        push_legend(&mut scene, config, theme);
    }
    if let Some((a, b)) = overlay.selection {
        scene.rects.push(FillRect {
            left: plot.clamp_x(a.min(b)),
            top: plot.top,
            right: plot.clamp_x(a.max(b)),
            bottom: plot.bottom,
            color: theme.selection,
        });
    }
    if let Some(hover) = overlay.hover {
        push_hover(&mut scene, hover, &xs, &ys, &time, theme);
    }
    scene
}

fn push_axes(
    scene: &mut Scene,
    config: &DrawConfig,
    viewport: &Viewport,
    xs: &TimeScale,
    ys: &ValueScale,
    time: &TimeScaleCapability,
    theme: &Theme,
) {
    let plot = scene.plot;

    if config.x_axis.display {
        let (step, ticks) = time.ticks(viewport.x_min, viewport.x_max, config.x_ticks);
        for t in ticks {
            let px = xs.to_px(t);
            scene.grid.push(LinePrim { from: (px, plot.top), to: (px, plot.bottom), color: theme.grid, width: 1.0 });
            scene.labels.push(Label {
                text: time.format(t, step),
                at: (px, plot.bottom + 18.0),
                size: LABEL_SIZE,
                color: theme.tick,
                align: TextAlign::Center,
            });
        }
        if let Some(title) = &config.x_axis.title {
            scene.labels.push(Label {
                text: title.clone(),
                at: ((plot.left + plot.right) * 0.5, plot.bottom + 40.0),
                size: LABEL_SIZE,
                color: theme.axis_label,
                align: TextAlign::Center,
            });
        }
    }

    if config.y_axis.display {
        for v in nice_ticks(ys.vmin, ys.vmax, config.y_ticks) {
            let py = ys.to_px(v);
            scene.grid.push(LinePrim { from: (plot.left, py), to: (plot.right, py), color: theme.grid, width: 1.0 });
            scene.labels.push(Label {
                text: format_value(v),
                at: (plot.left - 8.0, py + 4.0),
                size: LABEL_SIZE,
                color: theme.tick,
                align: TextAlign::Right,
            });
        }
        if let Some(title) = &config.y_axis.title {
            scene.labels.push(Label {
                text: title.clone(),
                at: (8.0, plot.top - 12.0),
                size: LABEL_SIZE,
                color: theme.axis_label,
                align: TextAlign::Left,
            });
        }
    }

    // X and Y axis lines
    scene.grid.push(LinePrim { from: (plot.left, plot.bottom), to: (plot.right, plot.bottom), color: theme.axis_line, width: 1.5 });
    scene.grid.push(LinePrim { from: (plot.left, plot.top), to: (plot.left, plot.bottom), color: theme.axis_line, width: 1.5 });

    if let Some(title) = &config.title {
        scene.labels.push(Label {
            text: title.clone(),
            at: (scene.width as f32 * 0.5, TITLE_SIZE + 4.0),
            size: TITLE_SIZE,
            color: theme.axis_label,
            align: TextAlign::Center,
        });
    }
}

fn push_series(scene: &mut Scene, config: &DrawConfig, viewport: &Viewport, xs: &TimeScale, ys: &ValueScale) {
    for (index, series) in config.series.iter().enumerate() {
        let (start, end) = visible_window(&series.points, viewport.x_min, viewport.x_max);
        for run in split_runs(&series.points[start..end], |a, b| config.breaks_between(a, b)) {
            let px: Vec<(f64, f64)> = run
                .iter()
                .map(|&(x, y)| (xs.to_px(x) as f64, ys.to_px(y) as f64))
                .collect();

            if series.point_radius > 0.0 {
                for &(x, y) in &px {
                    scene.dots.push(Dot { dataset: index, center: (x as f32, y as f32), radius: series.point_radius, color: series.color });
                }
            } else if px.len() == 1 {
                // No interpolation partner: draw the lone value as a dot.
                let (x, y) = px[0];
                scene.dots.push(Dot { dataset: index, center: (x as f32, y as f32), radius: series.line_width.max(1.5), color: series.color });
            }
            if px.len() < 2 {
                continue;
            }

            let mut cmds = Vec::with_capacity(px.len() + 1);
            cmds.push(PathCmd::MoveTo(px[0].0 as f32, px[0].1 as f32));
            match series.interpolation {
                Interpolation::Linear => {
                    cmds.extend(px.iter().skip(1).map(|&(x, y)| PathCmd::LineTo(x as f32, y as f32)));
                }
                Interpolation::MonotoneCubic => {
                    cmds.extend(monotone_segments(&px).into_iter().map(|s| PathCmd::CubicTo {
                        c1: (s.c1.0 as f32, s.c1.1 as f32),
                        c2: (s.c2.0 as f32, s.c2.1 as f32),
                        to: (s.p3.0 as f32, s.p3.1 as f32),
                    }));
                }
            }
            scene.series.push(StrokePath { dataset: index, color: series.color, width: series.line_width, cmds });
        }
    }
}

fn push_legend(scene: &mut Scene, config: &DrawConfig, theme: &Theme) {
    let y = scene.plot.top - 16.0;
    let mut x = scene.plot.left + 160.0;
    for series in &config.series {
        scene.rects.push(FillRect { left: x, top: y - 5.0, right: x + 24.0, bottom: y + 5.0, color: series.color });
        scene.labels.push(Label {
            text: series.label.clone(),
            at: (x + 30.0, y + 4.0),
            size: LABEL_SIZE,
            color: theme.axis_label,
            align: TextAlign::Left,
        });
        x += 30.0 + series.label.chars().count() as f32 * CHAR_PX + 16.0;
    }
}

fn push_hover(scene: &mut Scene, hover: &Hover, xs: &TimeScale, ys: &ValueScale, time: &TimeScaleCapability, theme: &Theme) {
    let plot = scene.plot;
    let px = xs.to_px(hover.x);
    if !plot.contains_x(px) {
        return;
    }
    scene.overlay.push(LinePrim { from: (px, plot.top), to: (px, plot.bottom), color: theme.crosshair, width: 1.0 });

    let mut lines = vec![(time.format(hover.x, 1.0), theme.axis_label)];
    for item in &hover.items {
        let (ix, iy) = (xs.to_px(item.x), ys.to_px(item.y));
        if plot.contains_x(ix) {
            scene.overlay.push(LinePrim { from: (ix - 3.0, iy), to: (ix + 3.0, iy), color: item.color, width: 3.0 });
        }
        lines.push((format!("{}: {}", item.label, format_value(item.y)), item.color));
    }

    let widest = lines.iter().map(|(t, _)| t.chars().count()).max().unwrap_or(0) as f32 * CHAR_PX;
    let box_w = widest + 16.0;
    let box_h = lines.len() as f32 * 16.0 + 8.0;
    let left = if px + 12.0 + box_w <= plot.right { px + 12.0 } else { (px - 12.0 - box_w).max(plot.left) };
    let top = plot.top + 8.0;
    scene.rects.push(FillRect { left, top, right: left + box_w, bottom: top + box_h, color: theme.background.with_alpha(220) });
    for (i, (text, color)) in lines.into_iter().enumerate() {
        scene.labels.push(Label {
            text,
            at: (left + 8.0, top + 16.0 * (i as f32 + 1.0)),
            size: LABEL_SIZE,
            color,
            align: TextAlign::Left,
        });
    }
}

/// Compact tick/tooltip number: thousands as `k`, millions as `M`.
pub fn format_value(v: f64) -> String {
    let a = v.abs();
    if a >= 1.0e6 {
        format!("{:.1}M", v / 1.0e6)
    } else if a >= 1.0e4 {
        format!("{:.1}k", v / 1.0e3)
    } else if a >= 100.0 || v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
