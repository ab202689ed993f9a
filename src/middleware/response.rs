use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Successful JSON response. The body is the payload as-is, e.g. `{ "company": {...} }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => ApiError::internal_server_error(format!("Failed to serialize response data: {}", e))
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Attached to every error response so [`log_errors`] can report it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub status: u16,
    pub message: String,
}

/// Log failed requests with their message. Silent under the test environment.
pub async fn log_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if !state.config.environment.logs_errors() {
        return response;
    }

    if let Some(detail) = response.extensions().get::<ErrorDetail>() {
        if detail.status >= 500 {
            tracing::error!(status = detail.status, %method, %path, "{}", detail.message);
        } else {
            tracing::warn!(status = detail.status, %method, %path, "{}", detail.message);
        }
    }

    response
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
