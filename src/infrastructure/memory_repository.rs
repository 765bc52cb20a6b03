// In-memory repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::TelemetryRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;

/// Store backed by a fixed set of records, used for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: Vec<TelemetryRecord>,
}

impl InMemoryRepository {
    pub fn new(mut records: Vec<TelemetryRecord>) -> Self {
        // stable, so untimestamped records keep insertion order at the front
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    /// Load a JSON array of records.
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let records: Vec<TelemetryRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

        tracing::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self::new(records))
    }

    fn select(&self, predicate: impl Fn(&TelemetryRecord) -> bool) -> Vec<TelemetryRecord> {
        self.records.iter().filter(|r| predicate(r)).cloned().collect()
    }
}

#[async_trait]
impl TelemetryRepository for InMemoryRepository {
    async fn list_car_ids(&self) -> Result<Vec<String>> {
        let ids: BTreeSet<&str> = self.records.iter().map(|r| r.car.as_str()).collect();
        Ok(ids.into_iter().map(str::to_string).collect())
    }

    async fn fetch_day(&self, car: &str, date: &str) -> Result<Vec<TelemetryRecord>> {
        Ok(self.select(|r| r.car == car && r.date == date))
    }

    async fn fetch_history(&self, car: &str) -> Result<Vec<TelemetryRecord>> {
        Ok(self.select(|r| r.car == car))
    }
}
