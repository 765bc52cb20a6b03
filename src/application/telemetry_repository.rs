// Repository trait for telemetry data access
use crate::domain::telemetry::TelemetryRecord;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List every car identifier present in the store
    async fn list_car_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Records for one car whose date key equals `date`, oldest first
    async fn fetch_day(&self, car: &str, date: &str) -> anyhow::Result<Vec<TelemetryRecord>>;

    /// Every record stored for a car, oldest first
    async fn fetch_history(&self, car: &str) -> anyhow::Result<Vec<TelemetryRecord>>;
}
