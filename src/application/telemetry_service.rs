// Telemetry service - Day summaries, insights, history and comparisons
use crate::application::error::ServiceError;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::aggregate::AggregateResult;
use crate::domain::comparison::compare;
use crate::domain::dashboard::{CarComparison, CarHistory, DaySummary, InsightsReport, MetricSeries};
use crate::domain::insights::InsightRules;
use crate::domain::scoring::ScoringRules;
use crate::domain::telemetry::{Metric, MetricView, TelemetryRecord, metric_series};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct TelemetryService {
    repository: Arc<dyn TelemetryRepository>,
    scoring: ScoringRules,
    insights: InsightRules,
}

impl TelemetryService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        scoring: ScoringRules,
        insights: InsightRules,
    ) -> Self {
        Self {
            repository,
            scoring,
            insights,
        }
    }

    /// Fetch a day and fail with `NoTelemetry` when it is empty, so callers
    /// never score a day without data.
    async fn fetch_non_empty_day(
        &self,
        car: &str,
        date: &str,
    ) -> Result<Vec<TelemetryRecord>, ServiceError> {
        let records = self.repository.fetch_day(car, date).await?;
        if records.is_empty() {
            tracing::warn!("No telemetry for {} on {}", car, date);
            return Err(ServiceError::no_telemetry(car, date));
        }
        tracing::debug!("Fetched {} records for {} on {}", records.len(), car, date);
        Ok(records)
    }

    /// Aggregate a day, treating an all-zero result as no usable data so a
    /// day of zero or missing readings is never scored.
    fn usable_aggregate(
        records: &[TelemetryRecord],
        car: &str,
        date: &str,
    ) -> Result<AggregateResult, ServiceError> {
        let aggregate = AggregateResult::from_records(records);
        if aggregate.is_empty() {
            tracing::warn!("No usable readings for {} on {}", car, date);
            return Err(ServiceError::no_telemetry(car, date));
        }
        Ok(aggregate)
    }

    pub async fn day_summary(&self, car: &str, date: &str) -> Result<DaySummary, ServiceError> {
        let records = self.fetch_non_empty_day(car, date).await?;

        let aggregate = Self::usable_aggregate(&records, car, date)?;
        let averages = aggregate.base();
        let score = self.scoring.score(&averages);

        Ok(DaySummary {
            car: car.to_string(),
            date: date.to_string(),
            record_count: records.len(),
            records,
            averages,
            aggregate,
            score,
        })
    }

    pub async fn insights(&self, car: &str, date: &str) -> Result<InsightsReport, ServiceError> {
        let records = self.fetch_non_empty_day(car, date).await?;
        let averages = Self::usable_aggregate(&records, car, date)?.base();

        Ok(InsightsReport {
            car: car.to_string(),
            date: date.to_string(),
            averages,
            insights: self.insights.generate(&averages),
        })
    }

    pub async fn metric_series(
        &self,
        car: &str,
        date: &str,
        metric_key: &str,
    ) -> Result<MetricSeries, ServiceError> {
        let metric = Metric::from_key(metric_key)
            .ok_or_else(|| ServiceError::UnknownMetric(metric_key.to_string()))?;
        let records = self.fetch_non_empty_day(car, date).await?;

        Ok(MetricSeries {
            car: car.to_string(),
            date: date.to_string(),
            metric,
            unit: metric.unit(),
            points: metric_series(&records, metric),
        })
    }

    pub async fn history(&self, car: &str) -> Result<CarHistory, ServiceError> {
        let records = self.repository.fetch_history(car).await?;
        if records.is_empty() {
            return Err(ServiceError::NoHistory {
                car: car.to_string(),
            });
        }

        let days = records.iter().map(|r| r.date.as_str()).collect::<BTreeSet<_>>().len();
        let aggregate = AggregateResult::from_records(&records);

        Ok(CarHistory {
            car: car.to_string(),
            sessions: records.len(),
            days,
            averages: aggregate.base(),
            aggregate,
        })
    }

    /// Compare two days. One empty side averages to zero; only two empty
    /// sides are an error.
    pub async fn compare(
        &self,
        car: &str,
        date1: &str,
        date2: &str,
        view: MetricView,
    ) -> Result<CarComparison, ServiceError> {
        let (first, second) = futures::try_join!(
            self.repository.fetch_day(car, date1),
            self.repository.fetch_day(car, date2)
        )?;
        tracing::debug!(
            "Comparing {}: {} records on {}, {} records on {}",
            car,
            first.len(),
            date1,
            second.len(),
            date2
        );

        if first.is_empty() && second.is_empty() {
            return Err(ServiceError::insufficient_data(car, date1, date2));
        }

        Ok(CarComparison {
            car: car.to_string(),
            date1: date1.to_string(),
            date2: date2.to_string(),
            date1_records: first.len(),
            date2_records: second.len(),
            comparison: compare(&first, &second).for_view(view),
        })
    }
}
