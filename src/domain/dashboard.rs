// Dashboard response models
use super::aggregate::{AggregateResult, BaseAverages};
use super::comparison::ComparisonResult;
use super::scoring::PerformanceScore;
use super::telemetry::{Metric, TelemetryRecord, TimeSeriesPoint};
use serde::Serialize;

/// Everything the day view needs for one car.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub car: String,
    pub date: String,
    pub record_count: usize,
    pub records: Vec<TelemetryRecord>,
    pub averages: BaseAverages,
    pub aggregate: AggregateResult,
    pub score: PerformanceScore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub car: String,
    pub date: String,
    #[serde(flatten)]
    pub averages: BaseAverages,
    pub insights: Vec<String>,
}

/// Averages over every stored day for a car.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarHistory {
    pub car: String,
    pub sessions: usize,
    pub days: usize,
    #[serde(flatten)]
    pub averages: BaseAverages,
    pub aggregate: AggregateResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarComparison {
    pub car: String,
    pub date1: String,
    pub date2: String,
    pub date1_records: usize,
    pub date2_records: usize,
    #[serde(flatten)]
    pub comparison: ComparisonResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub car: String,
    pub date: String,
    pub metric: Metric,
    pub unit: &'static str,
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub metric: Metric,
    pub unit: &'static str,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}
