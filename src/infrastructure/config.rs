use crate::domain::insights::InsightRules;
use crate::domain::scoring::ScoringRules;
use crate::domain::telemetry::Metric;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "config/app";
const CONFIG_PATH_VAR: &str = "RACE_TELEMETRY_CONFIG";
const ENV_PREFIX: &str = "RACE_TELEMETRY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub influx: Option<InfluxSettings>,
    #[serde(default)]
    pub cars: Vec<CarConfig>,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub scoring: ScoringRules,
    #[serde(default)]
    pub insights: InsightRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Influx,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// JSON array of records loaded by the memory backend at startup
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

fn default_measurement() -> String {
    "car_telemetry".to_string()
}

/// Display name for a car id.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CarConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_charts")]
    pub charts: Vec<ChartConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            charts: default_charts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub metric: Metric,
    pub color: Option<String>,
}

impl ChartConfig {
    fn new(metric: Metric, color: &str) -> Self {
        Self {
            id: metric.key().to_string(),
            title: metric.label().to_string(),
            metric,
            color: Some(color.to_string()),
        }
    }
}

fn default_charts() -> Vec<ChartConfig> {
    vec![
        ChartConfig::new(Metric::Speed, "#3b82f6"),
        ChartConfig::new(Metric::Rpm, "#ef4444"),
        ChartConfig::new(Metric::Temperature, "#f59e0b"),
        ChartConfig::new(Metric::FuelLevel, "#10b981"),
        ChartConfig::new(Metric::LapTime, "#8b5cf6"),
    ]
}

/// Load `config/app.{toml,yaml,json}` (or the path in `RACE_TELEMETRY_CONFIG`)
/// and overlay `RACE_TELEMETRY__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${var}` placeholders in an InfluxQL template. Values are escaped
/// for use inside single-quoted string literals.
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        result = result.replace(&placeholder, &escaped);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("car".to_string(), "THOR".to_string());
        vars.insert("date".to_string(), "2025-02-10".to_string());

        let query = "SELECT * FROM car_telemetry WHERE \"car\" = '${car}' AND \"date\" = '${date}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT * FROM car_telemetry WHERE \"car\" = 'THOR' AND \"date\" = '2025-02-10'"
        );
    }

    #[test]
    fn test_prepare_query_escapes_quotes() {
        let mut vars = HashMap::new();
        vars.insert("car".to_string(), "x' OR '1'='1".to_string());

        let result = prepare_query("\"car\" = '${car}'", &vars);
        assert_eq!(result, "\"car\" = 'x\\' OR \\'1\\'=\\'1'");
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.store.backend, StoreBackend::Influx);
        assert!(config.influx.is_none());
        assert_eq!(config.scoring, ScoringRules::default());
        let metrics: Vec<Metric> = config.dashboard.charts.iter().map(|c| c.metric).collect();
        assert_eq!(
            metrics,
            vec![
                Metric::Speed,
                Metric::Rpm,
                Metric::Temperature,
                Metric::FuelLevel,
                Metric::LapTime
            ]
        );
    }

    #[test]
    fn test_full_config() {
        let raw = r##"
            [server]
            bind = "127.0.0.1:8080"
            allowed_origins = ["http://localhost:5173"]

            [store]
            backend = "memory"
            seed_file = "data/sample_telemetry.json"

            [influx]
            host = "http://localhost:8086/"
            token = "secret"
            database = "racing"
            retention_policy = "autogen"

            [[cars]]
            id = "THOR"
            name = "Thor"

            [[dashboard.charts]]
            id = "oil"
            title = "Oil"
            metric = "oilTemp"

            [insights]
            temp_high = 210
        "##;

        let config: AppConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(
            config.store.seed_file,
            Some(PathBuf::from("data/sample_telemetry.json"))
        );
        let influx = config.influx.unwrap();
        assert_eq!(influx.measurement, "car_telemetry");
        assert_eq!(config.cars[0].name, "Thor");
        assert_eq!(config.dashboard.charts.len(), 1);
        assert_eq!(config.dashboard.charts[0].metric, Metric::OilTemp);
        assert_eq!(config.dashboard.charts[0].color, None);
        assert_eq!(config.insights.temp_high, 210);
        assert_eq!(config.insights.temp_critical, 220);
    }
}
