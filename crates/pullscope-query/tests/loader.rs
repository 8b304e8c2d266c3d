// File: crates/pullscope-query/tests/loader.rs
// Purpose: Fetch + aggregate loads, stale-result suppression and unavailable data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pullscope_core::{Aggregation, ChartError, QueryKey, Sample};
use pullscope_query::{DataSource, FixtureSource, LoadOutcome, LoadSettings, QueryLoader, SourceResult, DAMAGE};

/// Returns only samples with non-finite timestamps or values.
struct MalformedSource;

#[async_trait]
impl DataSource for MalformedSource {
    async fn fetch_samples(&self, key: &QueryKey) -> SourceResult<Vec<Sample>> {
        Ok(vec![
            Sample::new(key.entity_id.clone(), key.metric_id.clone(), "Warrior", f64::NAN, 10.0),
            Sample::new(key.entity_id.clone(), key.metric_id.clone(), "Mage", 1.0, f64::INFINITY),
        ])
    }
}

fn loader(source: FixtureSource, settings: LoadSettings) -> QueryLoader {
    QueryLoader::new(Arc::new(source), settings)
}

fn key(pull: &str) -> QueryKey {
    QueryKey::new("1", DAMAGE, pull)
}

#[tokio::test]
async fn loads_one_dataset_per_player() {
    let l = loader(FixtureSource::new(), LoadSettings::default());
    let LoadOutcome::Loaded { key: k, timeseries, report } = l.load(key("1")).await else {
        panic!("expected data");
    };
    assert_eq!(k, key("1"));
    assert_eq!(report.accepted, 300);
    let names: Vec<&str> = timeseries.datasets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Warrior", "Mage", "Paladin"]);
    // 100 ms native spacing is coarser than span / 1000, so nothing is merged.
    assert!(timeseries.datasets.iter().all(|d| d.points.len() == 100));
    let interval = timeseries.interval.expect("bucket width");
    assert!((interval - 0.1).abs() < 1e-6);
}

#[tokio::test]
async fn coarse_resolution_and_total() {
    let settings = LoadSettings { aggregation: Aggregation::Sum, max_points: 20, total_label: Some("All".into()) };
    let l = loader(FixtureSource::new(), settings);
    let LoadOutcome::Loaded { timeseries, .. } = l.load(key("2")).await else { panic!("expected data") };
    assert_eq!(timeseries.datasets.len(), 4);
    assert_eq!(timeseries.datasets[3].name, "All");
    assert!(timeseries.datasets.iter().all(|d| d.points.len() <= 21));
}

#[tokio::test]
async fn newer_ticket_supersedes_older() {
    let l = loader(FixtureSource::new(), LoadSettings::default());
    let first = l.begin(key("1"));
    let second = l.begin(key("2"));
    assert!(!l.is_current(&first));
    assert!(l.is_current(&second));

    let old = l.run(first).await;
    assert_eq!(old, LoadOutcome::Stale { key: key("1"), generation: 1 });
    assert!(matches!(l.run(second).await, LoadOutcome::Loaded { .. }));
}

#[tokio::test]
async fn cancel_discards_in_flight_load() {
    let l = loader(FixtureSource::new().with_latency(Duration::from_millis(30)), LoadSettings::default());
    let ticket = l.begin(key("1"));
    let worker = l.clone();
    let task = tokio::spawn(async move { worker.run(ticket).await });
    l.cancel();
    let outcome = task.await.expect("join");
    assert!(outcome.is_stale());
    assert_eq!(outcome.key(), &key("1"));
}

#[tokio::test]
async fn unknown_pull_is_unavailable() {
    let l = loader(FixtureSource::new(), LoadSettings::default());
    let LoadOutcome::Unavailable { key: k, error } = l.load(key("42")).await else {
        panic!("expected unavailable");
    };
    assert_eq!(k, key("42"));
    assert!(matches!(error, ChartError::DataUnavailable { .. }));
    assert!(error.is_user_visible());
    assert!(!error.is_fatal());
}

#[tokio::test]
async fn empty_metric_is_unavailable() {
    let l = loader(FixtureSource::new(), LoadSettings::default());
    let outcome = l.load(QueryKey::new("1", "healing", "1")).await;
    let LoadOutcome::Unavailable { error: ChartError::DataUnavailable { reason, .. }, .. } = outcome else {
        panic!("expected unavailable");
    };
    assert!(reason.contains("no samples"));
}

#[tokio::test]
async fn zero_max_points_is_reported() {
    let settings = LoadSettings { max_points: 0, ..LoadSettings::default() };
    let l = loader(FixtureSource::new(), settings);
    assert!(matches!(l.load(key("1")).await, LoadOutcome::Unavailable { .. }));
}

#[tokio::test]
async fn all_malformed_samples_are_unavailable() {
    let l = QueryLoader::new(Arc::new(MalformedSource), LoadSettings::default());
    let outcome = l.load(key("1")).await;
    let LoadOutcome::Unavailable { error: ChartError::DataUnavailable { reason, .. }, .. } = outcome else {
        panic!("expected unavailable, got {outcome:?}");
    };
    assert!(reason.contains("2 malformed"), "{reason}");
}

#[tokio::test]
async fn views_keep_separate_generations() {
    let shared = loader(FixtureSource::new(), LoadSettings::default());
    let a = shared.for_view();
    let b = shared.for_view();
    let ticket = a.begin(key("1"));
    b.begin(key("2"));
    b.cancel();
    shared.cancel();
    assert!(a.is_current(&ticket));
    assert!(matches!(a.run(ticket).await, LoadOutcome::Loaded { .. }));
}
