// Per-metric averaging over a set of telemetry records
use super::telemetry::{Metric, TelemetryRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Average one metric across `records`, addressed by its wire key.
///
/// Unknown keys behave like a field no record carries and yield `0`.
pub fn average_metric(records: &[TelemetryRecord], metric_key: &str) -> i64 {
    match Metric::from_key(metric_key) {
        Some(metric) => average_of(records, metric),
        None => 0,
    }
}

/// Rounded mean of the strictly positive readings of `metric`.
///
/// Missing and non-numeric readings count as zero, and every value `<= 0` is
/// dropped before averaging, so a genuine zero reading (empty tank, car
/// stationary) is indistinguishable from no data. Returns `0` when nothing
/// survives the filter.
pub fn average_of(records: &[TelemetryRecord], metric: Metric) -> i64 {
    let (sum, count) = records
        .iter()
        .map(|r| metric.value_in(r))
        .filter(|v| *v > 0.0)
        .fold((0.0_f64, 0_u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return 0;
    }
    (sum / f64::from(count)).round() as i64
}

/// The four averages scoring and insights work from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAverages {
    pub avg_speed: i64,
    pub avg_rpm: i64,
    pub avg_temp: i64,
    pub avg_fuel: i64,
}

impl BaseAverages {
    pub fn new(avg_speed: i64, avg_rpm: i64, avg_temp: i64, avg_fuel: i64) -> Self {
        Self {
            avg_speed,
            avg_rpm,
            avg_temp,
            avg_fuel,
        }
    }
}

/// One rounded average per metric for a (car, date) selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    averages: BTreeMap<Metric, i64>,
}

impl AggregateResult {
    pub fn from_records(records: &[TelemetryRecord]) -> Self {
        let averages = Metric::ALL
            .into_iter()
            .map(|metric| (metric, average_of(records, metric)))
            .collect();
        Self { averages }
    }

    pub fn get(&self, metric: Metric) -> i64 {
        self.averages.get(&metric).copied().unwrap_or(0)
    }

    pub fn base(&self) -> BaseAverages {
        BaseAverages::new(
            self.get(Metric::Speed),
            self.get(Metric::Rpm),
            self.get(Metric::Temperature),
            self.get(Metric::FuelLevel),
        )
    }

    /// True when no metric produced a usable average.
    pub fn is_empty(&self) -> bool {
        self.averages.values().all(|v| *v == 0)
    }
}
