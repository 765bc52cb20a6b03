// Car service - Use case for listing cars
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::car::Car;
use crate::infrastructure::config::CarConfig;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct CarService {
    repository: Arc<dyn TelemetryRepository>,
    registry: Vec<CarConfig>,
}

impl CarService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, registry: Vec<CarConfig>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// Cars with stored telemetry plus every car in the registry, sorted by
    /// id. Registry entries supply display names.
    pub async fn list_cars(&self) -> anyhow::Result<Vec<Car>> {
        let mut ids: BTreeSet<String> = self.repository.list_car_ids().await?.into_iter().collect();
        ids.extend(self.registry.iter().map(|c| c.id.clone()));

        Ok(ids
            .into_iter()
            .map(|id| match self.registry.iter().find(|c| c.id == id) {
                Some(entry) => Car::with_name(id, entry.name.clone()),
                None => Car::new(id),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::TelemetryRecord;
    use crate::infrastructure::memory_repository::InMemoryRepository;

    #[tokio::test]
    async fn test_list_cars_merges_registry() {
        let repository = Arc::new(InMemoryRepository::new(vec![
            TelemetryRecord::new("THOR", "2025-02-10"),
            TelemetryRecord::new("Red_Bull_", "2025-02-10"),
        ]));
        let registry = vec![
            CarConfig {
                id: "THOR".to_string(),
                name: "Thor".to_string(),
            },
            CarConfig {
                id: "ODIN".to_string(),
                name: "Odin".to_string(),
            },
        ];

        let cars = CarService::new(repository, registry).list_cars().await.unwrap();
        let listed: Vec<(&str, &str)> = cars.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect();

        assert_eq!(
            listed,
            vec![("ODIN", "Odin"), ("Red_Bull_", "Red Bull"), ("THOR", "Thor")]
        );
    }
}
