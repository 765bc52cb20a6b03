// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::TelemetryRecord;
use crate::infrastructure::config::{InfluxSettings, prepare_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const LIST_CARS_QUERY: &str = r#"SHOW TAG VALUES FROM "${measurement}" WITH KEY = "car""#;
const DAY_QUERY: &str =
    r#"SELECT * FROM "${measurement}" WHERE "car" = '${car}' AND "date" = '${date}' ORDER BY time ASC"#;
const HISTORY_QUERY: &str =
    r#"SELECT * FROM "${measurement}" WHERE "car" = '${car}' ORDER BY time ASC"#;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
    #[serde(default)]
    tags: Option<HashMap<String, String>>,
}

impl InfluxRepository {
    pub fn new(settings: InfluxSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            token: settings.token,
            database: settings.database,
            retention_policy: settings.retention_policy,
            measurement: settings.measurement,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy),
            urlencoding::encode(query)
        )
    }

    fn render(&self, template: &str, car: Option<&str>, date: Option<&str>) -> String {
        let mut vars = HashMap::new();
        vars.insert("measurement".to_string(), self.measurement.clone());
        if let Some(car) = car {
            vars.insert("car".to_string(), car.to_string());
        }
        if let Some(date) = date {
            vars.insert("date".to_string(), date.to_string());
        }
        prepare_query(template, &vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        tracing::debug!("Executing InfluxQL: {}", query);
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            anyhow::bail!("InfluxDB query error: {}", error);
        }

        Ok(data)
    }

    async fn query_records(&self, query: &str) -> Result<Vec<TelemetryRecord>> {
        let response = self.execute_query(query).await?;
        Ok(records_from_response(response))
    }
}

fn series_of(response: InfluxQLResponse) -> Vec<InfluxQLSeries> {
    response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.series)
        .unwrap_or_default()
}

/// Zip each row with the column names into a record. Rows that do not decode
/// are logged and skipped.
fn records_from_response(response: InfluxQLResponse) -> Vec<TelemetryRecord> {
    let mut records = Vec::new();

    for series in series_of(response) {
        for row in series.values {
            let mut object = Map::new();
            if let Some(tags) = &series.tags {
                for (key, value) in tags {
                    object.insert(key.clone(), Value::String(value.clone()));
                }
            }
            for (column, value) in series.columns.iter().zip(row) {
                let key = if column == "time" { "timestamp" } else { column.as_str() };
                if !value.is_null() {
                    object.insert(key.to_string(), value);
                }
            }

            match serde_json::from_value::<TelemetryRecord>(Value::Object(object)) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping undecodable InfluxDB row: {}", e),
            }
        }
    }

    records
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn list_car_ids(&self) -> Result<Vec<String>> {
        let response = self.execute_query(&self.render(LIST_CARS_QUERY, None, None)).await?;

        let mut cars: Vec<String> = series_of(response)
            .iter()
            .flat_map(|s| s.values.iter())
            .filter_map(|row| row.get(1).and_then(Value::as_str).map(str::to_string))
            .collect();
        cars.sort();
        cars.dedup();

        Ok(cars)
    }

    async fn fetch_day(&self, car: &str, date: &str) -> Result<Vec<TelemetryRecord>> {
        self.query_records(&self.render(DAY_QUERY, Some(car), Some(date)))
            .await
            .with_context(|| format!("Failed to fetch telemetry for {} on {}", car, date))
    }

    async fn fetch_history(&self, car: &str) -> Result<Vec<TelemetryRecord>> {
        self.query_records(&self.render(HISTORY_QUERY, Some(car), None))
            .await
            .with_context(|| format!("Failed to fetch telemetry history for {}", car))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::Metric;

    fn repository() -> InfluxRepository {
        InfluxRepository::new(InfluxSettings {
            host: "http://localhost:8086/".to_string(),
            token: "token".to_string(),
            database: "racing".to_string(),
            retention_policy: "autogen".to_string(),
            measurement: "car_telemetry".to_string(),
        })
    }

    #[test]
    fn test_render_day_query() {
        let query = repository().render(DAY_QUERY, Some("THOR"), Some("2025-02-10"));
        assert_eq!(
            query,
            r#"SELECT * FROM "car_telemetry" WHERE "car" = 'THOR' AND "date" = '2025-02-10' ORDER BY time ASC"#
        );
    }

    #[test]
    fn test_build_query_url() {
        let url = repository().build_query_url("SHOW MEASUREMENTS");
        assert_eq!(
            url,
            "http://localhost:8086/query?db=racing&rp=autogen&q=SHOW%20MEASUREMENTS"
        );
    }

    #[test]
    fn test_records_from_response() {
        let raw = r#"{
            "results": [{
                "series": [{
                    "name": "car_telemetry",
                    "columns": ["time", "car", "date", "speed", "rpm", "lapTime", "oilTemp"],
                    "values": [
                        ["2025-02-10T00:00:00Z", "THOR", "2025-02-10", 120.5, 6500, "1:30", null],
                        ["2025-02-10T00:00:01Z", "THOR", "2025-02-10", 118, 6400, null, 105]
                    ]
                }]
            }]
        }"#;
        let response: InfluxQLResponse = serde_json::from_str(raw).unwrap();

        let records = records_from_response(response);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].car, "THOR");
        assert_eq!(records[0].speed, Some(120.5));
        assert_eq!(records[0].lap_time.as_deref(), Some("1:30"));
        assert_eq!(records[0].oil_temp, None);
        assert_eq!(Metric::OilTemp.reading(&records[1]), Some(105.0));
        assert_eq!(records[1].timestamp.unwrap().timestamp_millis(), 1_739_145_601_000);
    }

    #[test]
    fn test_tags_fill_missing_columns() {
        let raw = r#"{
            "results": [{
                "series": [{
                    "name": "car_telemetry",
                    "tags": {"car": "HAYA", "date": "2025-02-11"},
                    "columns": ["time", "speed"],
                    "values": [["2025-02-11T10:00:00Z", 150]]
                }]
            }]
        }"#;
        let response: InfluxQLResponse = serde_json::from_str(raw).unwrap();

        let records = records_from_response(response);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].car, "HAYA");
        assert_eq!(records[0].date, "2025-02-11");
    }

    #[test]
    fn test_rows_without_identity_are_skipped() {
        let raw = r#"{
            "results": [{
                "series": [{
                    "name": "car_telemetry",
                    "columns": ["time", "speed"],
                    "values": [["2025-02-11T10:00:00Z", 150]]
                }]
            }]
        }"#;
        let response: InfluxQLResponse = serde_json::from_str(raw).unwrap();
        assert!(records_from_response(response).is_empty());
    }

    #[test]
    fn test_empty_result() {
        let response: InfluxQLResponse = serde_json::from_str(r#"{"results": [{}]}"#).unwrap();
        assert!(records_from_response(response).is_empty());
    }
}
