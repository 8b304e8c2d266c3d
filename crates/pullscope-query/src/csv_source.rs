// File: crates/pullscope-query/src/csv_source.rs
// Summary: Sample source backed by a CSV file.
// Columns: entity_id,metric_id,series,timestamp,value and an optional pull_id.
// Timestamps are seconds or RFC 3339. Unparsable numbers become NaN so the aggregator
// counts and drops them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::DateTime;
use pullscope_core::{QueryKey, Sample};
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceResult;
use crate::source::DataSource;

#[derive(Debug, Deserialize)]
struct Row {
    entity_id: String,
    metric_id: String,
    #[serde(default)]
    pull_id: Option<String>,
    series: String,
    timestamp: String,
    value: String,
}

impl Row {
    fn matches(&self, key: &QueryKey) -> bool {
        self.entity_id == key.entity_id
            && self.metric_id == key.metric_id
            && self.pull_id.as_deref().map_or(true, |p| p.is_empty() || p == key.pull_id)
    }

    fn into_sample(self) -> Sample {
        let t = parse_timestamp(&self.timestamp);
        let v = self.value.trim().parse().unwrap_or(f64::NAN);
        Sample::new(self.entity_id, self.metric_id, self.series, t, v)
    }
}

fn parse_timestamp(raw: &str) -> f64 {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<f64>() {
        return secs;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
        .unwrap_or(f64::NAN)
}

#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Synchronous read of all rows matching `key`.
    pub fn read(path: &Path, key: &QueryKey) -> SourceResult<Vec<Sample>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let mut out = Vec::new();
        for row in reader.deserialize::<Row>() {
            let row = row?;
            if row.matches(key) {
                out.push(row.into_sample());
            }
        }
        debug!(path = %path.display(), %key, samples = out.len(), "read csv samples");
        Ok(out)
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn fetch_samples(&self, key: &QueryKey) -> SourceResult<Vec<Sample>> {
        let path = self.path.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || Self::read(&path, &key)).await?
    }
}
