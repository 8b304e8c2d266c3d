// File: crates/pullscope-query/src/fixture.rs
// Summary: In-memory encounters and seeded per-player damage samples.
// Notes:
// - Four encounters share the same three pulls; every pull yields 100 samples per player
//   at 100 ms spacing, starting at the pull timestamp.
// - Output depends only on (encounter, pull), so repeated fetches are identical.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pullscope_core::{QueryKey, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::source::{DataSource, Encounter, Pull, PullResult};

/// Metric id the fixture produces samples for.
pub const DAMAGE: &str = "damage";

/// (player, mean damage per tick)
const PLAYERS: [(&str, f64); 3] = [("Warrior", 1_800.0), ("Mage", 2_400.0), ("Paladin", 1_200.0)];

#[derive(Clone, Debug)]
pub struct FixtureSource {
    encounters: Vec<Encounter>,
    points: usize,
    interval: f64,
    latency: Option<Duration>,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSource {
    pub fn new() -> Self {
        let pulls = pulls();
        let encounters = (1..=4)
            .map(|i| Encounter { id: i.to_string(), title: format!("Encounter {i}"), pulls: pulls.clone() })
            .collect();
        Self { encounters, points: 100, interval: 0.1, latency: None }
    }

    /// Samples per player per pull.
    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    /// Spacing between samples in seconds.
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    /// Delay every fetch, imitating a slow backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    pub fn encounter(&self, id: &str) -> Option<&Encounter> {
        self.encounters.iter().find(|e| e.id == id)
    }

    fn samples_for(&self, encounter: usize, pull: &Pull, pull_index: usize, metric: &str) -> Vec<Sample> {
        let entity = &self.encounters[encounter].id;
        let mut rng = StdRng::seed_from_u64(((encounter as u64) << 8) | pull_index as u64);
        let start = pull.started_at.timestamp() as f64;
        let mut out = Vec::with_capacity(self.points * PLAYERS.len());
        for i in 0..self.points {
            let t = start + i as f64 * self.interval;
            for (player, mean) in PLAYERS {
                let v = mean * rng.gen_range(0.4..1.6);
                out.push(Sample::new(entity.as_str(), metric, player, t, v));
            }
        }
        out
    }
}

fn pull_start(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 2, 11, 20, minute, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn pulls() -> Vec<Pull> {
    [PullResult::Reset, PullResult::Wipe, PullResult::Reset]
        .into_iter()
        .enumerate()
        .map(|(i, result)| Pull {
            id: (i + 1).to_string(),
            title: format!("Pull #{}", i + 1),
            started_at: pull_start(i as u32 * 12),
            result,
        })
        .collect()
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn fetch_samples(&self, key: &QueryKey) -> SourceResult<Vec<Sample>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let encounter = self
            .encounters
            .iter()
            .position(|e| e.id == key.entity_id)
            .ok_or_else(|| SourceError::UnknownEncounter(key.entity_id.clone()))?;
        let pulls = &self.encounters[encounter].pulls;
        let pull_index = pulls.iter().position(|p| p.id == key.pull_id).ok_or_else(|| SourceError::UnknownPull {
            encounter: key.entity_id.clone(),
            pull: key.pull_id.clone(),
        })?;
        if key.metric_id != DAMAGE {
            debug!(%key, "fixture has no samples for metric");
            return Ok(Vec::new());
        }
        Ok(self.samples_for(encounter, &pulls[pull_index], pull_index, &key.metric_id))
    }
}
