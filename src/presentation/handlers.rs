// HTTP request handlers
use crate::application::error::ServiceError;
use crate::domain::car::Car;
use crate::domain::telemetry::MetricView;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response, text_attachment_response};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ViewQuery {
    pub view: Option<String>,
}

impl ViewQuery {
    /// Missing or empty means `all`.
    fn metric_view(&self) -> Result<MetricView, ServiceError> {
        match self.view.as_deref().map(str::trim) {
            None | Some("") => Ok(MetricView::default()),
            Some(raw) => MetricView::from_key(&raw.to_ascii_lowercase())
                .ok_or_else(|| ServiceError::UnknownView(raw.to_string())),
        }
    }
}

fn respond(result: Result<Response<Body>, StatusCode>) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn json_or_error<T: Serialize>(
    result: Result<T, ServiceError>,
    headers: &HeaderMap,
) -> Response<Body> {
    match result {
        Ok(data) => respond(json_response(&data, accepts_brotli(headers)).await),
        Err(e) => e.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all cars
pub async fn list_cars(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let cars = match state.car_service.list_cars().await {
        Ok(cars) => cars,
        Err(e) => {
            tracing::error!("Error fetching cars: {:#}", e);
            // Return empty list on error
            Vec::<Car>::new()
        }
    };
    respond(json_response(&cars, accepts_brotli(&headers)).await)
}

pub async fn day_summary(
    Path((car, date)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    json_or_error(state.telemetry_service.day_summary(&car, &date).await, &headers).await
}

pub async fn day_insights(
    Path((car, date)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    json_or_error(state.telemetry_service.insights(&car, &date).await, &headers).await
}

pub async fn metric_series(
    Path((car, date, metric)): Path<(String, String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let result = state
        .telemetry_service
        .metric_series(&car, &date, &metric)
        .await;
    json_or_error(result, &headers).await
}

/// Stream the day dashboard (progressive loading)
pub async fn stream_day(
    Path((car, date)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.streaming_service.stream_day(&car, &date).await;
    stream_from_receiver(rx, accepts_brotli(&headers))
}

pub async fn car_history(
    Path(car): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    json_or_error(state.telemetry_service.history(&car).await, &headers).await
}

pub async fn compare_days(
    Path((car, date1, date2)): Path<(String, String, String)>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let view = match query.metric_view() {
        Ok(view) => view,
        Err(e) => return e.into_response(),
    };
    let result = state
        .telemetry_service
        .compare(&car, &date1, &date2, view)
        .await;
    json_or_error(result, &headers).await
}

pub async fn day_report(
    Path((car, date)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    match state.report_service.day_report(&car, &date).await {
        Ok(report) => respond(
            text_attachment_response(report.body, &report.filename, accepts_brotli(&headers))
                .await,
        ),
        Err(e) => e.into_response(),
    }
}

pub async fn comparison_report(
    Path((car, date1, date2)): Path<(String, String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    match state
        .report_service
        .comparison_report(&car, &date1, &date2)
        .await
    {
        Ok(report) => respond(
            text_attachment_response(report.body, &report.filename, accepts_brotli(&headers))
                .await,
        ),
        Err(e) => e.into_response(),
    }
}
