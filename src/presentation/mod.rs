// Presentation layer - HTTP routing and handlers
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::presentation::app_state::AppState;
use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS for the dashboard front-ends. No origins means no cross-origin access;
/// `"*"` anywhere in the list allows every origin.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new().allow_methods([Method::GET]);

    if origins.iter().any(|o| o.trim() == "*") {
        return Ok(cors.allow_origin(AllowOrigin::any()));
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/api/cars", get(handlers::list_cars))
        .route("/api/cars/:car/days/:date", get(handlers::day_summary))
        .route("/api/cars/:car/days/:date/insights", get(handlers::day_insights))
        .route("/api/cars/:car/days/:date/metrics/:metric", get(handlers::metric_series))
        .route("/api/cars/:car/days/:date/stream", get(handlers::stream_day))
        .route("/api/cars/:car/days/:date/report", get(handlers::day_report))
        .route("/api/cars/:car/history", get(handlers::car_history))
        .route("/api/cars/:car/compare/:date1/:date2", get(handlers::compare_days))
        .route(
            "/api/cars/:car/compare/:date1/:date2/report",
            get(handlers::comparison_report),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "http://localhost:5174".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_cors_wildcard_allows_any_origin() {
        assert!(cors_layer(&["*".to_string()]).is_ok());
        assert!(cors_layer(&["http://localhost:5173".to_string(), " * ".to_string()]).is_ok());
    }
}
