use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chartboard_core::ChartError;
use serde_json::json;

/// Renders as `{"error": "..."}` with a status derived from the query failure.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ChartError> for ApiError {
    fn from(e: ChartError) -> Self {
        let status = match &e {
            ChartError::NotFound(_) => StatusCode::NOT_FOUND,
            ChartError::InvalidRange { .. }
            | ChartError::RangeTooLong { .. }
            | ChartError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ChartError::StoreUnavailable(cause) => {
                sentry_anyhow::capture_anyhow(cause);
                tracing::error!(error = %e, "chart query failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}
