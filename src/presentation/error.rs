// Service errors as HTTP responses
use crate::application::error::ServiceError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            _ if self.is_not_found() => StatusCode::NOT_FOUND,
            Self::UnknownMetric(_) | Self::UnknownView(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
