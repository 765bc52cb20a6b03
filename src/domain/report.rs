// Plain-text report formatting
use super::dashboard::CarComparison;
use super::telemetry::{Metric, TelemetryRecord};
use chrono::{DateTime, NaiveDate, Utc};

const NOT_AVAILABLE: &str = "N/A";

/// Headline metrics of the comparison report with their report label and
/// the suffix appended to values.
const HEADLINE: [(Metric, &str, &str); 4] = [
    (Metric::Speed, "Average Speed", " MPH"),
    (Metric::Rpm, "Average RPM", " RPM"),
    (Metric::Temperature, "Average Temperature", "°F"),
    (Metric::FuelLevel, "Average Fuel Level", "%"),
];

/// Render a date key as "Mon Feb 10 2025"; keys that are not ISO dates are
/// shown as-is.
pub fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a %b %d %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn reading(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v != 0.0 => format!("{v}{suffix}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn generated_line(generated_at: DateTime<Utc>) -> String {
    format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))
}

pub fn day_report_filename(car: &str, date: &str) -> String {
    format!("{car}_{date}_report.txt")
}

pub fn comparison_report_filename(car: &str, date1: &str, date2: &str) -> String {
    format!("{car}_{date1}_vs_{date2}_comparison.txt")
}

/// Entry-by-entry listing of one day of readings.
pub fn day_report(
    car: &str,
    date: &str,
    records: &[TelemetryRecord],
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("Car Telemetry Report - {car}"),
        format!("Date: {}", display_date(date)),
        format!("Total Entries: {}", records.len()),
        String::new(),
    ];

    for (i, entry) in records.iter().enumerate() {
        let time = entry
            .timestamp
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let lap = entry
            .lap_time
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(NOT_AVAILABLE);

        lines.push(format!("Entry {}", i + 1));
        lines.push(format!("Time: {time}"));
        lines.push(format!("Speed: {}", reading(entry.speed, " MPH")));
        lines.push(format!("RPM: {}", reading(entry.rpm, "")));
        lines.push(format!("Temperature: {}", reading(entry.temperature, "°F")));
        lines.push(format!("Fuel Level: {}", reading(entry.fuel_level, "%")));
        lines.push(format!("Lap Time: {lap}"));
        lines.push("---".to_string());
    }

    lines.push(String::new());
    lines.push(generated_line(generated_at));
    lines.join("\n")
}

/// Side-by-side averages and differences for two days. Values and deltas
/// come straight from the comparison rows.
pub fn comparison_report(comparison: &CarComparison, generated_at: DateTime<Utc>) -> String {
    let CarComparison {
        car,
        date1,
        date2,
        date1_records,
        date2_records,
        comparison,
    } = comparison;

    let mut lines = vec![
        format!("Car Telemetry Comparison Report - {car}"),
        format!("Date 1: {} ({date1_records} entries)", display_date(date1)),
        format!("Date 2: {} ({date2_records} entries)", display_date(date2)),
        String::new(),
        "COMPARISON RESULTS:".to_string(),
        String::new(),
    ];

    for (metric, label, suffix) in HEADLINE {
        let Some(row) = comparison.metric(metric) else {
            continue;
        };
        lines.push(format!("{label}:"));
        lines.push(format!("  {date1}: {}{suffix}", row.first));
        lines.push(format!("  {date2}: {}{suffix}", row.second));
        lines.push(format!("  Difference: {}{suffix}", row.delta));
        lines.push(String::new());
    }

    let extra: Vec<_> = comparison
        .metrics
        .iter()
        .filter(|row| !HEADLINE.iter().any(|(m, _, _)| *m == row.metric))
        .filter(|row| row.first != 0 || row.second != 0)
        .collect();

    if !extra.is_empty() {
        lines.push("ADDITIONAL METRICS:".to_string());
        lines.push(String::new());
        for row in extra {
            lines.push(format!(
                "{}: {} -> {} ({:+} {})",
                row.label, row.first, row.second, row.delta, row.unit
            ));
        }
        lines.push(String::new());
    }

    lines.push(generated_line(generated_at));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::compare;
    use chrono::TimeZone;

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 12, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2025-02-10"), "Mon Feb 10 2025");
        assert_eq!(display_date("practice-1"), "practice-1");
    }

    #[test]
    fn test_day_report() {
        let records = vec![
            TelemetryRecord::new("THOR", "2025-02-10")
                .at(Utc.with_ymd_and_hms(2025, 2, 10, 2, 0, 0).unwrap())
                .with(Metric::Speed, 120.0)
                .with(Metric::Rpm, 6500.0)
                .with(Metric::FuelLevel, 0.0)
                .with_lap_time("1:28"),
            TelemetryRecord::new("THOR", "2025-02-10"),
        ];

        let report = day_report("THOR", "2025-02-10", &records, generated());

        assert!(report.starts_with("Car Telemetry Report - THOR\nDate: Mon Feb 10 2025\nTotal Entries: 2"));
        assert!(report.contains("Entry 1\nTime: 2025-02-10T02:00:00+00:00\nSpeed: 120 MPH\nRPM: 6500"));
        assert!(report.contains("Fuel Level: N/A"));
        assert!(report.contains("Lap Time: 1:28"));
        assert!(report.contains("Entry 2\nTime: N/A\nSpeed: N/A"));
        assert!(report.ends_with("Generated: 2025-02-12 09:30:00 UTC"));
    }

    #[test]
    fn test_comparison_report_uses_comparison_deltas() {
        let day1 = vec![
            TelemetryRecord::new("THOR", "2025-02-10")
                .with(Metric::Speed, 150.0)
                .with(Metric::Temperature, 190.0),
        ];
        let day2 = vec![
            TelemetryRecord::new("THOR", "2025-02-11")
                .with(Metric::Speed, 142.0)
                .with(Metric::Temperature, 185.0)
                .with(Metric::OilTemp, 110.0),
        ];
        let comparison = CarComparison {
            car: "THOR".to_string(),
            date1: "2025-02-10".to_string(),
            date2: "2025-02-11".to_string(),
            date1_records: day1.len(),
            date2_records: day2.len(),
            comparison: compare(&day1, &day2),
        };

        let report = comparison_report(&comparison, generated());

        assert!(report.contains("Date 1: Mon Feb 10 2025 (1 entries)"));
        assert!(report.contains(
            "Average Speed:\n  2025-02-10: 150 MPH\n  2025-02-11: 142 MPH\n  Difference: -8 MPH"
        ));
        assert!(report.contains("Average Temperature:\n  2025-02-10: 190°F\n  2025-02-11: 185°F\n  Difference: -5°F"));
        assert!(report.contains("Difference: 0%"));
        assert!(report.contains("ADDITIONAL METRICS:\n\nOil Temp: 0 -> 110 (+110 °C)"));
        assert!(!report.contains("Coolant Temp"));
    }
}
