// Two-sided metric comparison
use super::aggregate::AggregateResult;
use super::telemetry::{Metric, MetricView, Polarity, TelemetryRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: Metric,
    pub label: &'static str,
    pub unit: &'static str,
    pub first: i64,
    pub second: i64,
    /// `second - first`
    pub delta: i64,
    pub polarity: Polarity,
}

impl MetricComparison {
    fn new(metric: Metric, first: i64, second: i64) -> Self {
        Self {
            metric,
            label: metric.label(),
            unit: metric.unit(),
            first,
            second,
            delta: second - first,
            polarity: metric.polarity(),
        }
    }

    /// Whether the change moved in the metric's better direction. `None`
    /// when there was no change.
    pub fn improved(&self) -> Option<bool> {
        match (self.delta.signum(), self.polarity) {
            (0, _) => None,
            (d, Polarity::HigherIsBetter) => Some(d > 0),
            (d, Polarity::LowerIsBetter) => Some(d < 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub first: AggregateResult,
    pub second: AggregateResult,
    pub metrics: Vec<MetricComparison>,
}

impl ComparisonResult {
    /// Keep only the metric rows visible in `view`.
    pub fn for_view(mut self, view: MetricView) -> Self {
        self.metrics.retain(|m| view.includes(m.metric.group()));
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricComparison> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Average both sides independently and diff every metric.
///
/// Sample sizes are not normalized; an empty side simply averages to zero.
pub fn compare(first: &[TelemetryRecord], second: &[TelemetryRecord]) -> ComparisonResult {
    let first = AggregateResult::from_records(first);
    let second = AggregateResult::from_records(second);

    let metrics = Metric::ALL
        .into_iter()
        .map(|metric| MetricComparison::new(metric, first.get(metric), second.get(metric)))
        .collect();

    ComparisonResult {
        first,
        second,
        metrics,
    }
}
