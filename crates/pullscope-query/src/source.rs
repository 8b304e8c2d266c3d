// File: crates/pullscope-query/src/source.rs
// Summary: The asynchronous data-source seam plus encounter/pull listing types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pullscope_core::{QueryKey, Sample};
use serde::{Deserialize, Serialize};

use crate::error::SourceResult;

/// Where raw samples come from. Fetching has no side effects visible to the chart.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Samples for one query key. An empty vector means "no data", not an error.
    async fn fetch_samples(&self, key: &QueryKey) -> SourceResult<Vec<Sample>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullResult {
    Wipe,
    Reset,
    Kill,
}

/// One attempt at an encounter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pull {
    pub id: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub result: PullResult,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub title: String,
    pub pulls: Vec<Pull>,
}

impl Encounter {
    pub fn pull(&self, id: &str) -> Option<&Pull> {
        self.pulls.iter().find(|p| p.id == id)
    }
}
