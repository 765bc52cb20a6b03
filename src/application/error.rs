// Service-level errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no telemetry found for {car} on {date}")]
    NoTelemetry { car: String, date: String },

    #[error("no telemetry history for {car}")]
    NoHistory { car: String },

    #[error("insufficient data to compare {car} on {date1} and {date2}")]
    InsufficientData {
        car: String,
        date1: String,
        date2: String,
    },

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("unknown metric view '{0}', expected driver, engineer or all")]
    UnknownView(String),

    #[error("telemetry store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn no_telemetry(car: &str, date: &str) -> Self {
        Self::NoTelemetry {
            car: car.to_string(),
            date: date.to_string(),
        }
    }

    pub fn insufficient_data(car: &str, date1: &str, date2: &str) -> Self {
        Self::InsufficientData {
            car: car.to_string(),
            date1: date1.to_string(),
            date2: date2.to_string(),
        }
    }

    /// True for outcomes caused by missing data rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoTelemetry { .. } | Self::NoHistory { .. } | Self::InsufficientData { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::no_telemetry("THOR", "2025-02-10");
        assert_eq!(err.to_string(), "no telemetry found for THOR on 2025-02-10");

        let err = ServiceError::UnknownMetric("warpFactor".to_string());
        assert_eq!(err.to_string(), "unknown metric 'warpFactor'");
    }

    #[test]
    fn test_store_error_keeps_context() {
        let err: ServiceError = anyhow::anyhow!("connection refused")
            .context("Failed to send request to InfluxDB")
            .into();
        let msg = err.to_string();
        assert!(msg.contains("Failed to send request to InfluxDB"));
        assert!(msg.contains("connection refused"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        assert!(ServiceError::no_telemetry("THOR", "2025-02-10").is_not_found());
        assert!(ServiceError::insufficient_data("THOR", "a", "b").is_not_found());
        assert!(ServiceError::NoHistory { car: "HAYA".to_string() }.is_not_found());
        assert!(!ServiceError::UnknownMetric("x".to_string()).is_not_found());
        assert!(!ServiceError::UnknownView("pit".to_string()).is_not_found());
    }
}
