// File: crates/pullscope-core/src/aggregate.rs
// Summary: Resolution-adaptive bucketing of raw samples into named point datasets.
// Notes:
// - Bucket width is max(native sample interval, span / max_points).
// - Buckets are anchored at the earliest valid timestamp. A point keeps the timestamp of
//   the first sample in its bucket, so single-sample buckets pass through unchanged.
// - Empty buckets produce no point. The grid travels with the timeseries and the renderer
//   breaks the line where bucket indices skip.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ChartError, ChartResult};
use crate::model::{BucketGrid, Dataset, Point, PointTimeseries, Sample, Timestamp};

/// How samples landing in the same bucket combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Cumulative counters such as damage done.
    #[default]
    Sum,
    /// Instantaneous gauges.
    Mean,
    Max,
    Min,
    /// Sum per second of bucket width ("per second amounts").
    Rate,
}

/// Target resolution for one aggregation pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    max_points: usize,
    native_interval: Option<f64>,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { max_points: Self::DEFAULT_MAX_POINTS, native_interval: None }
    }
}

impl Resolution {
    pub const DEFAULT_MAX_POINTS: usize = 1_000;

    /// At most `max_points` buckets across the full span.
    pub fn new(max_points: usize) -> ChartResult<Self> {
        if max_points == 0 {
            return Err(ChartError::InvalidResolution("max_points must be at least 1".into()));
        }
        Ok(Self { max_points, native_interval: None })
    }

    /// One bucket per native sample interval, no adaptive coarsening.
    pub fn native() -> Self {
        Self { max_points: usize::MAX, native_interval: None }
    }

    /// Override the detected native sampling interval (seconds).
    pub fn with_native_interval(mut self, interval: f64) -> ChartResult<Self> {
        if !(interval.is_finite() && interval > 0.0) {
            return Err(ChartError::InvalidResolution(format!(
                "native interval must be positive, got {interval}"
            )));
        }
        self.native_interval = Some(interval);
        Ok(self)
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn native_interval(&self) -> Option<f64> {
        self.native_interval
    }

    /// Effective bucket width for a span `w` and a native interval.
    ///
    /// Returns `None` when neither the span nor the native interval gives a width
    /// (all samples share one timestamp).
    pub fn bucket_width(&self, span: f64, native: Option<f64>) -> Option<f64> {
        let adaptive = span / self.max_points as f64;
        let width = match native {
            Some(n) => n.max(adaptive),
            None => adaptive,
        };
        (width.is_finite() && width > 0.0).then_some(width)
    }
}

/// What to aggregate: the query identity plus the metric's combine function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub entity_id: String,
    pub metric_id: String,
    #[serde(default)]
    pub aggregation: Aggregation,
    /// When set, append a dataset with this label combining every series per bucket.
    #[serde(default)]
    pub total_label: Option<String>,
}

impl AggregateQuery {
    pub fn new(entity_id: impl Into<String>, metric_id: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            entity_id: entity_id.into(),
            metric_id: metric_id.into(),
            aggregation,
            total_label: None,
        }
    }

    pub fn with_total(mut self, label: impl Into<String>) -> Self {
        self.total_label = Some(label.into());
        self
    }

    fn matches(&self, s: &Sample) -> bool {
        s.entity_id == self.entity_id && s.metric_id == self.metric_id
    }
}

/// Data-quality counters from one aggregation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub accepted: usize,
    /// Non-finite timestamp or value; dropped.
    pub malformed: usize,
    /// Belonged to another entity or metric; ignored.
    pub foreign: usize,
}

/// Aggregate `samples` into one dataset per series label.
pub fn aggregate(samples: &[Sample], query: &AggregateQuery, resolution: Resolution) -> PointTimeseries {
    aggregate_with_report(samples, query, resolution).0
}

/// Same as [`aggregate`], also returning data-quality counters.
pub fn aggregate_with_report(
    samples: &[Sample],
    query: &AggregateQuery,
    resolution: Resolution,
) -> (PointTimeseries, AggregateReport) {
    let mut report = AggregateReport::default();
    let mut groups: IndexMap<&str, Vec<(Timestamp, f64)>> = IndexMap::new();

    for s in samples {
        if !query.matches(s) {
            report.foreign += 1;
            continue;
        }
        if !s.is_well_formed() {
            report.malformed += 1;
            continue;
        }
        report.accepted += 1;
        groups.entry(s.series.as_str()).or_default().push((s.timestamp, s.value));
    }

    if report.malformed > 0 {
        warn!(
            entity = %query.entity_id,
            metric = %query.metric_id,
            dropped = report.malformed,
            "dropped malformed samples before aggregation"
        );
    }
    if groups.is_empty() {
        debug!(entity = %query.entity_id, metric = %query.metric_id, "no samples to aggregate");
        return (PointTimeseries::empty(), report);
    }

    for values in groups.values_mut() {
        values.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let (t0, t1) = groups
        .values()
        .flat_map(|v| [v.first(), v.last()])
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(t, _)| (lo.min(t), hi.max(t)));
    let native = resolution.native_interval().or_else(|| detect_native_interval(groups.values()));
    let width = resolution.bucket_width(t1 - t0, native);
    let grid = width.and_then(|w| BucketGrid::new(t0, w));

    let mut datasets: Vec<Dataset> = groups
        .iter()
        .map(|(name, values)| Dataset::new(*name, collapse(grid.as_ref(), values, query.aggregation)))
        .collect();

    if let Some(label) = &query.total_label {
        if groups.contains_key(label.as_str()) {
            warn!(label = %label, "total dataset label collides with a series name; skipping total");
        } else {
            let mut all: Vec<(Timestamp, f64)> = groups.values().flatten().copied().collect();
            all.sort_by(|a, b| a.0.total_cmp(&b.0));
            datasets.push(Dataset::new(label.clone(), collapse(grid.as_ref(), &all, query.aggregation)));
        }
    }

    let mut ts = PointTimeseries::new(datasets);
    if let Some(grid) = grid {
        ts = ts.with_buckets(grid);
    }
    debug!(
        entity = %query.entity_id,
        metric = %query.metric_id,
        datasets = ts.datasets.len(),
        points = ts.point_count(),
        bucket_width = ?width,
        "aggregated timeseries"
    );
    (ts, report)
}

/// Smallest positive spacing between distinct timestamps across all groups.
fn detect_native_interval<'a>(groups: impl Iterator<Item = &'a Vec<(Timestamp, f64)>>) -> Option<f64> {
    let mut ts: Vec<f64> = groups.flat_map(|v| v.iter().map(|&(t, _)| t)).collect();
    ts.sort_by(f64::total_cmp);
    ts.dedup();
    ts.windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .min_by(f64::total_cmp)
}

/// Collapse time-sorted values into one point per non-empty bucket, placed at the
/// first sample's timestamp. Without a grid every value shares one bucket.
fn collapse(grid: Option<&BucketGrid>, values: &[(Timestamp, f64)], agg: Aggregation) -> Vec<Point> {
    let width = grid.map(|g| g.width);
    let mut out = Vec::new();
    let mut current: Option<(u64, Timestamp, Accumulator)> = None;
    for &(t, v) in values {
        let idx = grid.map_or(0, |g| g.index(t));
        match current.as_mut() {
            Some((i, _, acc)) if *i == idx => acc.push(v),
            _ => {
                if let Some((_, x, acc)) = current.take() {
                    out.push(Point::new(x, acc.finish(agg, width)));
                }
                current = Some((idx, t, Accumulator::new(v)));
            }
        }
    }
    if let Some((_, x, acc)) = current {
        out.push(Point::new(x, acc.finish(agg, width)));
    }
    out
}

#[derive(Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new(v: f64) -> Self {
        Self { sum: v, count: 1, min: v, max: v }
    }

    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn finish(self, agg: Aggregation, width: Option<f64>) -> f64 {
        match agg {
            Aggregation::Sum => self.sum,
            Aggregation::Mean => self.sum / self.count as f64,
            Aggregation::Max => self.max,
            Aggregation::Min => self.min,
            Aggregation::Rate => self.sum / width.unwrap_or(1.0),
        }
    }
}
