// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One timestamped sensor reading for a car.
///
/// Numeric fields are optional: stores written by different ingestion
/// versions carry different subsets of metrics. Decoding is lenient so a
/// stray string or null never rejects a whole day of readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub car: String,
    pub date: String,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,
    #[serde(
        default,
        alias = "lap_time",
        alias = "laptime",
        alias = "lap",
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub lap_time: Option<String>,

    // Driver
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub avg_throttle: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub avg_brake_pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub hard_brake_events: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub steering_work: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub gear_shifts: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub coast_time: Option<f64>,

    // Engineer
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub coolant_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub oil_temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub battery_voltage_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fuel_used_lap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_lat_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_long_g: Option<f64>,

    // Shared
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub max_rpm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub sector1_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub sector2_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub sector3_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub delta_to_best_lap: Option<f64>,
}

impl TelemetryRecord {
    pub fn new(car: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            car: car.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_lap_time(mut self, lap_time: impl Into<String>) -> Self {
        self.lap_time = Some(lap_time.into());
        self
    }

    /// Set a numeric metric. `Metric::LapTime` is textual and ignored here.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        if let Some(slot) = self.numeric_slot(metric) {
            *slot = Some(value);
        }
        self
    }

    fn numeric_slot(&mut self, metric: Metric) -> Option<&mut Option<f64>> {
        let slot = match metric {
            Metric::Speed => &mut self.speed,
            Metric::Rpm => &mut self.rpm,
            Metric::Temperature => &mut self.temperature,
            Metric::FuelLevel => &mut self.fuel_level,
            Metric::LapTime => return None,
            Metric::AvgThrottle => &mut self.avg_throttle,
            Metric::AvgBrakePressure => &mut self.avg_brake_pressure,
            Metric::HardBrakeEvents => &mut self.hard_brake_events,
            Metric::SteeringWork => &mut self.steering_work,
            Metric::GearShifts => &mut self.gear_shifts,
            Metric::CoastTime => &mut self.coast_time,
            Metric::CoolantTemp => &mut self.coolant_temp,
            Metric::OilTemp => &mut self.oil_temp,
            Metric::BatteryVoltageMin => &mut self.battery_voltage_min,
            Metric::FuelUsedLap => &mut self.fuel_used_lap,
            Metric::MaxLatG => &mut self.max_lat_g,
            Metric::MaxLongG => &mut self.max_long_g,
            Metric::MaxSpeed => &mut self.max_speed,
            Metric::MaxRpm => &mut self.max_rpm,
            Metric::Sector1Time => &mut self.sector1_time,
            Metric::Sector2Time => &mut self.sector2_time,
            Metric::Sector3Time => &mut self.sector3_time,
            Metric::DeltaToBestLap => &mut self.delta_to_best_lap,
        };
        Some(slot)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|n| n.is_finite()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Convert an `"m:ss"` lap time into seconds.
///
/// Returns `None` unless the string has exactly one colon and both parts
/// parse as finite numbers.
pub fn parse_lap_time(raw: &str) -> Option<f64> {
    let (minutes, seconds) = raw.split_once(':')?;
    if seconds.contains(':') {
        return None;
    }
    let minutes = minutes.trim().parse::<f64>().ok()?;
    let seconds = seconds.trim().parse::<f64>().ok()?;
    let total = minutes * 60.0 + seconds;
    total.is_finite().then_some(total)
}

/// Which way a metric should move for the car to be doing better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

/// Audience a metric belongs to on the dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricGroup {
    Base,
    Driver,
    Engineer,
    Shared,
}

/// Metric subset requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricView {
    Driver,
    Engineer,
    #[default]
    All,
}

impl MetricView {
    /// Parse the lowercase name used in query strings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "driver" => Some(Self::Driver),
            "engineer" => Some(Self::Engineer),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn includes(&self, group: MetricGroup) -> bool {
        match (self, group) {
            (Self::All, _) => true,
            (_, MetricGroup::Base | MetricGroup::Shared) => true,
            (Self::Driver, MetricGroup::Driver) => true,
            (Self::Engineer, MetricGroup::Engineer) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Speed,
    Rpm,
    Temperature,
    FuelLevel,
    LapTime,
    AvgThrottle,
    AvgBrakePressure,
    HardBrakeEvents,
    SteeringWork,
    GearShifts,
    CoastTime,
    CoolantTemp,
    OilTemp,
    BatteryVoltageMin,
    FuelUsedLap,
    MaxLatG,
    MaxLongG,
    MaxSpeed,
    MaxRpm,
    Sector1Time,
    Sector2Time,
    Sector3Time,
    DeltaToBestLap,
}

impl Metric {
    pub const ALL: [Metric; 23] = [
        Metric::Speed,
        Metric::Rpm,
        Metric::Temperature,
        Metric::FuelLevel,
        Metric::LapTime,
        Metric::AvgThrottle,
        Metric::AvgBrakePressure,
        Metric::HardBrakeEvents,
        Metric::SteeringWork,
        Metric::GearShifts,
        Metric::CoastTime,
        Metric::CoolantTemp,
        Metric::OilTemp,
        Metric::BatteryVoltageMin,
        Metric::FuelUsedLap,
        Metric::MaxLatG,
        Metric::MaxLongG,
        Metric::MaxSpeed,
        Metric::MaxRpm,
        Metric::Sector1Time,
        Metric::Sector2Time,
        Metric::Sector3Time,
        Metric::DeltaToBestLap,
    ];

    /// Field name used on the wire and in the store.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Rpm => "rpm",
            Self::Temperature => "temperature",
            Self::FuelLevel => "fuelLevel",
            Self::LapTime => "lapTime",
            Self::AvgThrottle => "avgThrottle",
            Self::AvgBrakePressure => "avgBrakePressure",
            Self::HardBrakeEvents => "hardBrakeEvents",
            Self::SteeringWork => "steeringWork",
            Self::GearShifts => "gearShifts",
            Self::CoastTime => "coastTime",
            Self::CoolantTemp => "coolantTemp",
            Self::OilTemp => "oilTemp",
            Self::BatteryVoltageMin => "batteryVoltageMin",
            Self::FuelUsedLap => "fuelUsedLap",
            Self::MaxLatG => "maxLatG",
            Self::MaxLongG => "maxLongG",
            Self::MaxSpeed => "maxSpeed",
            Self::MaxRpm => "maxRpm",
            Self::Sector1Time => "sector1Time",
            Self::Sector2Time => "sector2Time",
            Self::Sector3Time => "sector3Time",
            Self::DeltaToBestLap => "deltaToBestLap",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Speed => "Avg Speed",
            Self::Rpm => "Avg RPM",
            Self::Temperature => "Avg Temp",
            Self::FuelLevel => "Avg Fuel",
            Self::LapTime => "Lap Time",
            Self::AvgThrottle => "Avg Throttle",
            Self::AvgBrakePressure => "Avg Brake",
            Self::HardBrakeEvents => "Hard Brakes",
            Self::SteeringWork => "Steering Work",
            Self::GearShifts => "Gear Shifts",
            Self::CoastTime => "Coast Time",
            Self::CoolantTemp => "Coolant Temp",
            Self::OilTemp => "Oil Temp",
            Self::BatteryVoltageMin => "Min Battery V",
            Self::FuelUsedLap => "Fuel Used/Lap",
            Self::MaxLatG => "Max Lateral G",
            Self::MaxLongG => "Max Long G",
            Self::MaxSpeed => "Max Speed",
            Self::MaxRpm => "Max RPM",
            Self::Sector1Time => "Sector 1",
            Self::Sector2Time => "Sector 2",
            Self::Sector3Time => "Sector 3",
            Self::DeltaToBestLap => "Δ Best Lap",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Speed | Self::MaxSpeed => "MPH",
            Self::Rpm | Self::MaxRpm => "RPM",
            Self::Temperature => "°F",
            Self::FuelLevel | Self::AvgThrottle | Self::AvgBrakePressure => "%",
            Self::HardBrakeEvents => "events",
            Self::SteeringWork => "rel",
            Self::GearShifts => "per lap",
            Self::CoolantTemp | Self::OilTemp => "°C",
            Self::BatteryVoltageMin => "V",
            Self::FuelUsedLap => "L",
            Self::MaxLatG | Self::MaxLongG => "g",
            Self::LapTime
            | Self::CoastTime
            | Self::Sector1Time
            | Self::Sector2Time
            | Self::Sector3Time
            | Self::DeltaToBestLap => "sec",
        }
    }

    pub fn group(&self) -> MetricGroup {
        match self {
            Self::Speed | Self::Rpm | Self::Temperature | Self::FuelLevel | Self::LapTime => {
                MetricGroup::Base
            }
            Self::AvgThrottle
            | Self::AvgBrakePressure
            | Self::HardBrakeEvents
            | Self::SteeringWork
            | Self::GearShifts
            | Self::CoastTime => MetricGroup::Driver,
            Self::CoolantTemp
            | Self::OilTemp
            | Self::BatteryVoltageMin
            | Self::FuelUsedLap
            | Self::MaxLatG
            | Self::MaxLongG => MetricGroup::Engineer,
            Self::MaxSpeed
            | Self::MaxRpm
            | Self::Sector1Time
            | Self::Sector2Time
            | Self::Sector3Time
            | Self::DeltaToBestLap => MetricGroup::Shared,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Self::Speed
            | Self::FuelLevel
            | Self::AvgThrottle
            | Self::CoastTime
            | Self::MaxSpeed
            | Self::BatteryVoltageMin
            | Self::MaxLatG
            | Self::MaxLongG => Polarity::HigherIsBetter,
            _ => Polarity::LowerIsBetter,
        }
    }

    /// The raw reading for this metric, if the record carries a usable one.
    pub fn reading(&self, record: &TelemetryRecord) -> Option<f64> {
        let value = match self {
            Self::LapTime => record.lap_time.as_deref().and_then(parse_lap_time),
            Self::Speed => record.speed,
            Self::Rpm => record.rpm,
            Self::Temperature => record.temperature,
            Self::FuelLevel => record.fuel_level,
            Self::AvgThrottle => record.avg_throttle,
            Self::AvgBrakePressure => record.avg_brake_pressure,
            Self::HardBrakeEvents => record.hard_brake_events,
            Self::SteeringWork => record.steering_work,
            Self::GearShifts => record.gear_shifts,
            Self::CoastTime => record.coast_time,
            Self::CoolantTemp => record.coolant_temp,
            Self::OilTemp => record.oil_temp,
            Self::BatteryVoltageMin => record.battery_voltage_min,
            Self::FuelUsedLap => record.fuel_used_lap,
            Self::MaxLatG => record.max_lat_g,
            Self::MaxLongG => record.max_long_g,
            Self::MaxSpeed => record.max_speed,
            Self::MaxRpm => record.max_rpm,
            Self::Sector1Time => record.sector1_time,
            Self::Sector2Time => record.sector2_time,
            Self::Sector3Time => record.sector3_time,
            Self::DeltaToBestLap => record.delta_to_best_lap,
        };
        value.filter(|v| v.is_finite())
    }

    /// Reading with missing values collapsed to zero.
    pub fn value_in(&self, record: &TelemetryRecord) -> f64 {
        self.reading(record).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Time series of one metric across records. Records without a timestamp or
/// without a reading for the metric are skipped.
pub fn metric_series(records: &[TelemetryRecord], metric: Metric) -> Vec<TimeSeriesPoint> {
    records
        .iter()
        .filter_map(|r| {
            let time = r.timestamp?;
            let value = metric.reading(r)?;
            Some(TimeSeriesPoint::new(time.timestamp_millis(), value))
        })
        .collect()
}

/// Downsample time series points using bucket averaging
pub fn downsample(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
    if max_points == 0 || points.len() <= max_points {
        return points;
    }

    let bucket_size = points.len().div_ceil(max_points);
    points
        .chunks(bucket_size)
        .map(|chunk| {
            // Middle point's timestamp, average value
            let mid_idx = chunk.len() / 2;
            let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;
            TimeSeriesPoint::new(chunk[mid_idx].time_ms, avg_value)
        })
        .collect()
}
