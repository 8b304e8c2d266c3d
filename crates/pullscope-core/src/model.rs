// File: crates/pullscope-core/src/model.rs
// Summary: Sample, Point, Dataset and PointTimeseries value types.
// Notes:
// - Timestamps are seconds as f64 (epoch or pull-relative); the time axis consumes
//   them directly.
// - `Point::y == None` is a gap marker, never drawn as zero.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Seconds, epoch or relative to pull start.
pub type Timestamp = f64;

/// One raw timestamped observation for an entity/metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub entity_id: String,
    pub metric_id: String,
    /// Sub-identity inside the query (contributor or category); becomes the dataset name.
    pub series: String,
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(
        entity_id: impl Into<String>,
        metric_id: impl Into<String>,
        series: impl Into<String>,
        timestamp: Timestamp,
        value: f64,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            metric_id: metric_id.into(),
            series: series.into(),
            timestamp,
            value,
        }
    }

    /// A sample is usable when both its timestamp and value are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.timestamp.is_finite() && self.value.is_finite()
    }
}

/// A chart point; `y == None` marks a gap that must not be interpolated across.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Timestamp,
    pub y: Option<f64>,
}

impl Point {
    pub const fn new(x: Timestamp, y: f64) -> Self {
        Self { x, y: Some(y) }
    }

    pub const fn missing(x: Timestamp) -> Self {
        Self { x, y: None }
    }

    pub fn is_missing(&self) -> bool {
        self.y.is_none()
    }
}

/// One named, time-ordered sequence of points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub points: Vec<Point>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self { name: name.into(), points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point whose `x` is smaller than its predecessor.
    pub fn first_unordered(&self) -> Option<usize> {
        self.points
            .windows(2)
            .position(|w| !(w[1].x >= w[0].x))
            .map(|i| i + 1)
    }

    /// Min and max `x` of the dataset, if it has any points.
    pub fn x_extent(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.x, last.x))
    }
}

/// Fixed-width time buckets anchored at `origin`.
///
/// Aggregated points keep their real timestamps, so the bucket a point came from is
/// recovered from its `x` rather than stored per point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketGrid {
    pub origin: Timestamp,
    pub width: f64,
}

impl BucketGrid {
    // Slack so timestamps sitting exactly on a boundary do not round down a bucket.
    const EDGE_EPSILON: f64 = 1e-9;

    /// `None` unless `width` is finite and positive.
    pub fn new(origin: Timestamp, width: f64) -> Option<Self> {
        (origin.is_finite() && width.is_finite() && width > 0.0).then_some(Self { origin, width })
    }

    pub fn index(&self, t: Timestamp) -> u64 {
        ((t - self.origin) / self.width + Self::EDGE_EPSILON).floor().max(0.0) as u64
    }

    /// True when at least one empty bucket lies between the buckets of `a` and `b`.
    pub fn skips_between(&self, a: Timestamp, b: Timestamp) -> bool {
        let (i, j) = (self.index(a.min(b)), self.index(a.max(b)));
        j > i + 1
    }
}

/// All datasets answering one query key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTimeseries {
    pub datasets: Vec<Dataset>,
    /// Bucket width used to produce the datasets; `None` for hand-built series.
    pub interval: Option<f64>,
    /// Grid the datasets were bucketed on; neighbours from non-adjacent buckets are a gap.
    #[serde(default)]
    pub buckets: Option<BucketGrid>,
}

impl PointTimeseries {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        Self { datasets, interval: None, buckets: None }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Construct while enforcing unique names and ordered points.
    pub fn try_new(datasets: Vec<Dataset>) -> ChartResult<Self> {
        let ts = Self::new(datasets);
        ts.validate()?;
        Ok(ts)
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = (interval.is_finite() && interval > 0.0).then_some(interval);
        self
    }

    /// Record the aggregation grid; also sets `interval` to the bucket width.
    pub fn with_buckets(mut self, grid: BucketGrid) -> Self {
        self.interval = Some(grid.width);
        self.buckets = Some(grid);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Check the invariants the renderer relies on. Violations are caller errors.
    pub fn validate(&self) -> ChartResult<()> {
        let mut names = HashSet::with_capacity(self.datasets.len());
        for ds in &self.datasets {
            if !names.insert(ds.name.as_str()) {
                return Err(ChartError::DuplicateDataset(ds.name.clone()));
            }
            if let Some(index) = ds.first_unordered() {
                return Err(ChartError::UnorderedPoints { dataset: ds.name.clone(), index });
            }
        }
        Ok(())
    }

    /// Full x extent across every dataset.
    pub fn x_extent(&self) -> Option<(Timestamp, Timestamp)> {
        self.datasets
            .iter()
            .filter_map(Dataset::x_extent)
            .fold(None, |acc, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            })
    }

    pub fn point_count(&self) -> usize {
        self.datasets.iter().map(|d| d.points.len()).sum()
    }
}

/// Query key supplied by routing: which entity (encounter), metric and pull to chart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub entity_id: String,
    pub metric_id: String,
    pub pull_id: String,
}

impl QueryKey {
    pub fn new(
        entity_id: impl Into<String>,
        metric_id: impl Into<String>,
        pull_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            metric_id: metric_id.into(),
            pull_id: pull_id.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.entity_id, self.pull_id, self.metric_id)
    }
}
