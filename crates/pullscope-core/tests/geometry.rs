// File: crates/pullscope-core/tests/geometry.rs
// Purpose: Pixel transforms, viewport math, line splitting and dataset validation.

use pullscope_core::geometry::PlotArea;
use pullscope_core::grid::{nice_step, nice_ticks};
use pullscope_core::scale::{TimeScale, ValueScale};
use pullscope_core::scene::{format_value, split_runs};
use pullscope_core::types::Insets;
use pullscope_core::viewport::{autoscale_y, visible_window};
use pullscope_core::{BucketGrid, ChartError, Dataset, Point, PointTimeseries, Viewport};

fn area() -> PlotArea {
    PlotArea::from_ltrb(100.0, 20.0, 1100.0, 320.0)
}

#[test]
fn time_scale_round_trip() {
    let xs = TimeScale::new(&area(), &Viewport::new(10.0, 20.0));
    assert_eq!(xs.to_px(10.0), 100.0);
    assert_eq!(xs.to_px(20.0), 1100.0);
    assert!((xs.from_px(600.0) - 15.0).abs() < 1e-9);
}

#[test]
fn time_is_proportional_not_categorical() {
    // Irregular sampling keeps its irregular spacing on screen.
    let xs = TimeScale::new(&area(), &Viewport::new(0.0, 10.0));
    let gaps: Vec<f32> = [0.0, 1.0, 4.0].windows(2).map(|w| xs.to_px(w[1]) - xs.to_px(w[0])).collect();
    assert!((gaps[1] / gaps[0] - 3.0).abs() < 1e-4);
}

#[test]
fn value_scale_flips_y() {
    let ys = ValueScale::new_linear(20.0, 320.0, 0.0, 300.0);
    assert_eq!(ys.to_px(0.0), 320.0);
    assert_eq!(ys.to_px(300.0), 20.0);
    assert_eq!(ys.to_px(150.0), 170.0);
    // Degenerate range widens instead of dividing by zero.
    let flat = ValueScale::new_linear(0.0, 100.0, 5.0, 5.0);
    assert_eq!(flat.vmax, 6.0);
}

#[test]
fn plot_area_from_insets() {
    let insets = Insets::default();
    let plot = PlotArea::inset(1200, 400, &insets);
    assert_eq!(plot.width(), (1200 - insets.hsum()) as f32);
    assert_eq!(plot.height(), (400 - insets.vsum()) as f32);
    let tiny = PlotArea::inset(10, 10, &insets);
    assert!(tiny.width() >= 1.0 && tiny.height() >= 1.0);
}

#[test]
fn full_extent_of_timeseries() {
    let ts = PointTimeseries::new(vec![
        Dataset::new("A", vec![Point::new(3.0, 1.0), Point::new(9.0, 1.0)]),
        Dataset::new("B", vec![Point::new(1.0, 1.0), Point::new(5.0, 1.0)]),
        Dataset::new("C", vec![]),
    ]);
    assert_eq!(Viewport::of_timeseries(&ts), Viewport::new(1.0, 9.0));
    assert_eq!(ts.x_extent(), Some((1.0, 9.0)));
    assert_eq!(Viewport::of_timeseries(&PointTimeseries::empty()), Viewport::new(0.0, 1.0));

    let single = PointTimeseries::new(vec![Dataset::new("A", vec![Point::new(7.0, 1.0)])]);
    assert_eq!(Viewport::of_timeseries(&single), Viewport::new(7.0, 8.0));
}

#[test]
fn zoom_never_collapses() {
    let plot = area();
    let mut v = Viewport::new(0.0, 10.0);
    for _ in 0..500 {
        v.zoom_at_pixel(0.1, 600.0, &plot);
    }
    assert!(v.span() > 0.0);
    assert!(v.x_min <= 5.0 && v.x_max >= 5.0);
}

#[test]
fn select_pixels_orders_and_clamps() {
    let plot = area();
    let mut v = Viewport::new(0.0, 100.0);
    v.select_pixels(1200.0, 600.0, &plot);
    assert_eq!(v, Viewport::new(50.0, 100.0));
}

#[test]
fn visible_window_includes_neighbours() {
    let pts: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 1.0)).collect();
    assert_eq!(visible_window(&pts, 3.5, 6.5), (3, 8));
    assert_eq!(visible_window(&pts, -5.0, 100.0), (0, 10));
    assert_eq!(visible_window(&[], 0.0, 1.0), (0, 0));
}

#[test]
fn autoscale_uses_visible_points_only() {
    let pts = vec![
        Point::new(0.0, 5.0),
        Point::new(1.0, 10.0),
        Point::new(2.0, 8.0),
        Point::new(50.0, 900.0),
        Point::new(51.0, 800.0),
    ];
    let (lo, hi) = autoscale_y([pts.as_slice()], &Viewport::new(0.0, 1.0), Some(0.0), 5);
    assert_eq!(lo, 0.0);
    assert_eq!(hi, 10.0);
}

#[test]
fn split_runs_at_missing_and_wide_gaps() {
    let pts = vec![
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
        Point::missing(2.0),
        Point::new(3.0, 1.0),
        Point::new(4.0, 1.0),
        Point::new(9.0, 1.0),
    ];
    assert!(pts[2].is_missing());
    let runs = split_runs(&pts, |a, b| b - a > 1.5);
    let lens: Vec<usize> = runs.iter().map(Vec::len).collect();
    assert_eq!(lens, [2, 2, 1]);
    assert_eq!(split_runs(&pts, |_, _| false).len(), 2);
}

#[test]
fn bucket_grid_detects_skipped_buckets() {
    let grid = BucketGrid::new(0.0, 1.0).expect("valid grid");
    assert_eq!(grid.index(0.0), 0);
    assert_eq!(grid.index(2.0), 2, "boundary timestamps open their own bucket");
    assert_eq!(grid.index(2.999), 2);
    // Neighbouring buckets stay connected even when their points are almost 2 widths apart.
    assert!(!grid.skips_between(1.01, 2.99));
    assert!(grid.skips_between(1.0, 3.0));
    assert!(grid.skips_between(3.0, 1.0));
    assert!(BucketGrid::new(0.0, 0.0).is_none());
    assert!(BucketGrid::new(0.0, f64::NAN).is_none());
}

#[test]
fn nice_ticks_are_round() {
    assert_eq!(nice_step(100.0, 5), 20.0);
    assert_eq!(nice_ticks(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn value_labels() {
    assert_eq!(format_value(0.0), "0");
    assert_eq!(format_value(12.5), "12.50");
    assert_eq!(format_value(2_500.0), "2500");
    assert_eq!(format_value(45_000.0), "45.0k");
    assert_eq!(format_value(3_200_000.0), "3.2M");
}

#[test]
fn try_new_enforces_invariants() {
    let dup = PointTimeseries::try_new(vec![Dataset::new("A", vec![]), Dataset::new("A", vec![])]);
    assert_eq!(dup.unwrap_err(), ChartError::DuplicateDataset("A".into()));

    let unordered = Dataset::new("B", vec![Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(1.5, 1.0)]);
    assert_eq!(unordered.first_unordered(), Some(2));
    assert!(PointTimeseries::try_new(vec![unordered]).is_err());

    let ok = PointTimeseries::try_new(vec![Dataset::new("A", vec![]), Dataset::new("B", vec![Point::missing(0.0)])]);
    assert!(ok.is_ok());
}
