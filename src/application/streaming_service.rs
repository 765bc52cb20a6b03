// Streaming dashboard service - Progressive loading of a day view
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::aggregate::{AggregateResult, BaseAverages};
use crate::domain::dashboard::ChartData;
use crate::domain::insights::InsightRules;
use crate::domain::scoring::{PerformanceScore, ScoringRules};
use crate::domain::telemetry::{Metric, TelemetryRecord, downsample, metric_series};
use crate::infrastructure::config::ChartConfig;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

const MAX_POINTS_PER_SERIES: usize = 150;
const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub metric: Metric,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSkeleton {
    pub car: String,
    pub date: String,
    pub record_count: usize,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub widgets: usize,
    pub duration_ms: u64,
}

/// One frame of the progressive dashboard. `Skeleton` always comes first and
/// `Complete` always last.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    Summary {
        averages: BaseAverages,
        score: PerformanceScore,
    },
    Chart(ChartData),
    Insights {
        insights: Vec<String>,
    },
    Error {
        message: String,
    },
    Complete(CompletionEvent),
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    repository: Arc<dyn TelemetryRepository>,
    charts: Vec<ChartConfig>,
    scoring: ScoringRules,
    insights: InsightRules,
}

impl StreamingDashboardService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        charts: Vec<ChartConfig>,
        scoring: ScoringRules,
        insights: InsightRules,
    ) -> Self {
        Self {
            repository,
            charts,
            scoring,
            insights,
        }
    }

    pub async fn stream_day(&self, car: &str, date: &str) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let records = match self.repository.fetch_day(car, date).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to fetch {} on {}: {:#}", car, date, e);
                let _ = tx
                    .send(StreamMessage::Error {
                        message: format!("telemetry store error: {e:#}"),
                    })
                    .await;
                let _ = tx.send(complete(0, start_time)).await;
                return rx;
            }
        };

        // An all-zero aggregate means no usable readings: nothing to score or draw
        let aggregate = AggregateResult::from_records(&records);
        let usable = !aggregate.is_empty();

        // 1. Skeleton with only the charts that have something to draw
        let charts: Vec<ChartConfig> = self
            .charts
            .iter()
            .filter(|c| usable && has_series(&records, c.metric))
            .cloned()
            .collect();
        tracing::debug!(
            "Streaming {} on {}: {} records, {} of {} charts",
            car,
            date,
            records.len(),
            charts.len(),
            self.charts.len()
        );

        let skeleton = DashboardSkeleton {
            car: car.to_string(),
            date: date.to_string(),
            record_count: records.len(),
            charts: charts.iter().map(chart_skeleton).collect(),
        };
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        if !usable {
            let _ = tx.send(complete(0, start_time)).await;
            return rx;
        }

        // 2. Summary
        let averages = aggregate.base();
        let _ = tx
            .send(StreamMessage::Summary {
                averages,
                score: self.scoring.score(&averages),
            })
            .await;

        // 3. One task per chart
        let records = Arc::new(records);
        let widgets = charts.len() + 2;
        let handles: Vec<_> = charts
            .into_iter()
            .map(|chart| {
                let tx = tx.clone();
                let records = records.clone();
                tokio::spawn(async move {
                    let points = downsample(
                        metric_series(&records, chart.metric),
                        MAX_POINTS_PER_SERIES,
                    );
                    let data = ChartData {
                        unit: chart.metric.unit(),
                        id: chart.id,
                        title: chart.title,
                        metric: chart.metric,
                        color: chart.color,
                        points,
                    };
                    let _ = tx.send(StreamMessage::Chart(data)).await;
                })
            })
            .collect();

        // 4. Insights and completion once every chart has been sent
        let insights = self.insights.generate(&averages);
        tokio::spawn(async move {
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    tracing::warn!("Chart task failed: {}", e);
                }
            }
            let _ = tx.send(StreamMessage::Insights { insights }).await;
            let _ = tx.send(complete(widgets, start_time)).await;
        });

        rx
    }
}

fn has_series(records: &[TelemetryRecord], metric: Metric) -> bool {
    records
        .iter()
        .any(|r| r.timestamp.is_some() && metric.reading(r).is_some())
}

fn chart_skeleton(chart: &ChartConfig) -> ChartSkeleton {
    ChartSkeleton {
        id: chart.id.clone(),
        title: chart.title.clone(),
        metric: chart.metric,
        unit: chart.metric.unit(),
        color: chart.color.clone(),
    }
}

fn complete(widgets: usize, start_time: Instant) -> StreamMessage {
    StreamMessage::Complete(CompletionEvent {
        widgets,
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}
