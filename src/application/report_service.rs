// Report service - Downloadable plain-text reports
use crate::application::error::ServiceError;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::comparison::compare;
use crate::domain::dashboard::CarComparison;
use crate::domain::report;
use chrono::Utc;
use std::sync::Arc;

/// A rendered report and the filename it is offered under.
#[derive(Debug, Clone, PartialEq)]
pub struct TextReport {
    pub filename: String,
    pub body: String,
}

#[derive(Clone)]
pub struct ReportService {
    repository: Arc<dyn TelemetryRepository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn day_report(&self, car: &str, date: &str) -> Result<TextReport, ServiceError> {
        let records = self.repository.fetch_day(car, date).await?;
        if records.is_empty() {
            return Err(ServiceError::no_telemetry(car, date));
        }

        Ok(TextReport {
            filename: report::day_report_filename(car, date),
            body: report::day_report(car, date, &records, Utc::now()),
        })
    }

    /// Unlike the structured comparison, the report needs data on both days.
    pub async fn comparison_report(
        &self,
        car: &str,
        date1: &str,
        date2: &str,
    ) -> Result<TextReport, ServiceError> {
        let (first, second) = futures::try_join!(
            self.repository.fetch_day(car, date1),
            self.repository.fetch_day(car, date2)
        )?;
        if first.is_empty() || second.is_empty() {
            return Err(ServiceError::insufficient_data(car, date1, date2));
        }

        let comparison = CarComparison {
            car: car.to_string(),
            date1: date1.to_string(),
            date2: date2.to_string(),
            date1_records: first.len(),
            date2_records: second.len(),
            comparison: compare(&first, &second),
        };

        Ok(TextReport {
            filename: report::comparison_report_filename(car, date1, date2),
            body: report::comparison_report(&comparison, Utc::now()),
        })
    }
}
