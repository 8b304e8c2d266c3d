// File: crates/pullscope-query/src/loader.rs
// Summary: Fetch-then-aggregate off the interaction loop, with stale-result suppression.
// Notes:
// - Every load takes a generation ticket. A newer load or `cancel()` invalidates all
//   earlier tickets of the same view; their results come back as `LoadOutcome::Stale`.
// - Each view owns its counter (`for_view`). Clones stay within one view.
// - Aggregation runs on the blocking pool so large sample sets never stall gestures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pullscope_core::{
    aggregate_with_report, AggregateQuery, AggregateReport, Aggregation, ChartError, PointTimeseries, QueryKey,
    Resolution,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::source::DataSource;

/// How fetched samples are turned into chart data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    pub aggregation: Aggregation,
    pub max_points: usize,
    /// Label of the combined dataset; `None` skips it.
    pub total_label: Option<String>,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::Rate,
            max_points: Resolution::DEFAULT_MAX_POINTS,
            total_label: None,
        }
    }
}

/// Identifies one load; only the newest ticket may apply its result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub key: QueryKey,
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    Loaded { key: QueryKey, timeseries: PointTimeseries, report: AggregateReport },
    /// The source failed or had nothing for the key.
    Unavailable { key: QueryKey, error: ChartError },
    /// Superseded or cancelled; must not be applied.
    Stale { key: QueryKey, generation: u64 },
}

impl LoadOutcome {
    pub fn key(&self) -> &QueryKey {
        match self {
            LoadOutcome::Loaded { key, .. } | LoadOutcome::Unavailable { key, .. } | LoadOutcome::Stale { key, .. } => key,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, LoadOutcome::Stale { .. })
    }
}

/// Loader for one chart view. Clones share the view's generation counter, e.g. with a
/// spawned task; `for_view` gives another view a counter of its own.
#[derive(Clone)]
pub struct QueryLoader {
    source: Arc<dyn DataSource>,
    settings: LoadSettings,
    generation: Arc<AtomicU64>,
}

impl QueryLoader {
    pub fn new(source: Arc<dyn DataSource>, settings: LoadSettings) -> Self {
        Self { source, settings, generation: Arc::new(AtomicU64::new(0)) }
    }

    /// Same source and settings, fresh generation counter. Starting or cancelling loads
    /// on the result never touches this loader's tickets.
    pub fn for_view(&self) -> Self {
        Self::new(Arc::clone(&self.source), self.settings.clone())
    }

    pub fn settings(&self) -> &LoadSettings {
        &self.settings
    }

    /// Start a load for `key`, invalidating every earlier ticket.
    pub fn begin(&self, key: QueryKey) -> LoadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { key, generation }
    }

    /// Invalidate every in-flight load.
    pub fn cancel(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "cancelled in-flight loads");
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    pub async fn load(&self, key: QueryKey) -> LoadOutcome {
        let ticket = self.begin(key);
        self.run(ticket).await
    }

    /// Execute a previously issued ticket.
    pub async fn run(&self, ticket: LoadTicket) -> LoadOutcome {
        let fetched = self.source.fetch_samples(&ticket.key).await;
        if !self.is_current(&ticket) {
            return self.stale(ticket);
        }

        let samples = match fetched {
            Ok(samples) if samples.is_empty() => {
                return unavailable(ticket.key, "no samples for query".to_string());
            }
            Ok(samples) => samples,
            Err(e) => return unavailable(ticket.key, e.to_string()),
        };

        let resolution = match Resolution::new(self.settings.max_points) {
            Ok(r) => r,
            Err(e) => return unavailable(ticket.key, e.to_string()),
        };
        let mut query = AggregateQuery::new(&ticket.key.entity_id, &ticket.key.metric_id, self.settings.aggregation);
        query.total_label = self.settings.total_label.clone();

        let joined =
            tokio::task::spawn_blocking(move || aggregate_with_report(&samples, &query, resolution)).await;
        if !self.is_current(&ticket) {
            return self.stale(ticket);
        }
        match joined {
            Ok((timeseries, report)) if timeseries.is_empty() => unavailable(
                ticket.key,
                format!("no well-formed samples for query ({} malformed)", report.malformed),
            ),
            Ok((timeseries, report)) => {
                debug!(key = %ticket.key, generation = ticket.generation, points = timeseries.point_count(), "load complete");
                LoadOutcome::Loaded { key: ticket.key, timeseries, report }
            }
            Err(e) => unavailable(ticket.key, format!("aggregation task failed: {e}")),
        }
    }

    fn stale(&self, ticket: LoadTicket) -> LoadOutcome {
        debug!(key = %ticket.key, generation = ticket.generation, "discarding stale load result");
        LoadOutcome::Stale { key: ticket.key, generation: ticket.generation }
    }
}

fn unavailable(key: QueryKey, reason: String) -> LoadOutcome {
    warn!(%key, %reason, "data unavailable");
    let error = ChartError::DataUnavailable { key: key.clone(), reason };
    LoadOutcome::Unavailable { key, error }
}
