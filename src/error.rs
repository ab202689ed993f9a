// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::middleware::response::ErrorDetail;

/// Message carried by an error envelope: a single string, or one entry per validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorMessage::Single(msg) => write!(f, "{}", msg),
            ErrorMessage::Many(msgs) => write!(f, "{}", msgs.join(", ")),
        }
    }
}

impl From<String> for ErrorMessage {
    fn from(msg: String) -> Self {
        ErrorMessage::Single(msg)
    }
}

impl From<&str> for ErrorMessage {
    fn from(msg: &str) -> Self {
        ErrorMessage::Single(msg.to_string())
    }
}

impl From<Vec<String>> for ErrorMessage {
    fn from(msgs: Vec<String>) -> Self {
        ErrorMessage::Many(msgs)
    }
}

/// HTTP API error; every failure a handler can produce ends up as one of these
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(ErrorMessage),

    // 401 Unauthorized (no identity presented)
    Unauthorized(String),

    // 403 Forbidden (identity presented, not allowed)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    pub fn message(&self) -> ErrorMessage {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg) => ErrorMessage::Single(msg.clone()),
        }
    }

    /// Convert to JSON response body: `{ "error": { "message": ..., "status": ... } }`
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "message": self.message(),
                "status": self.status_code(),
            }
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<ErrorMessage>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::services::ServiceError> for ApiError {
    fn from(err: crate::services::ServiceError) -> Self {
        use crate::services::ServiceError;

        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::InvalidReference(msg) | ServiceError::InvalidData(msg) => {
                ApiError::bad_request(msg)
            }
            ServiceError::NoData(e) => ApiError::bad_request(e.to_string()),
            ServiceError::InvalidCredentials => ApiError::unauthorized("Invalid username/password"),
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        use crate::auth::TokenError;

        match err {
            TokenError::MissingUsername => ApiError::bad_request(err.to_string()),
            TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed(_) => {
                ApiError::unauthorized(err.to_string())
            }
            TokenError::Encoding(_) => ApiError::internal_server_error(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::bad_request(crate::api::validation::messages(&errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.to_json())).into_response();
        // Picked up by the logging middleware so failures are reported in one place
        response.extensions_mut().insert(ErrorDetail {
            status: status.as_u16(),
            message: self.to_string(),
        });
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_message_and_status() {
        let err = ApiError::not_found("Not Found");
        assert_eq!(
            err.to_json(),
            json!({ "error": { "message": "Not Found", "status": 404 } })
        );
    }

    #[test]
    fn validation_messages_serialize_as_array() {
        let err = ApiError::bad_request(vec![
            "name is required".to_string(),
            "email is not a valid email address".to_string(),
        ]);
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json()["error"]["message"],
            json!(["name is required", "email is not a valid email address"])
        );
        assert_eq!(err.to_string(), "name is required, email is not a valid email address");
    }

    #[test]
    fn unauthenticated_and_forbidden_are_distinct() {
        assert_eq!(ApiError::unauthorized("Unauthorized").status_code(), 401);
        assert_eq!(ApiError::forbidden("Forbidden").status_code(), 403);
    }

    #[test]
    fn response_records_error_detail() {
        let response = ApiError::conflict("Duplicate company: c1").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let detail = response.extensions().get::<ErrorDetail>().cloned();
        assert_eq!(
            detail,
            Some(ErrorDetail { status: 409, message: "Duplicate company: c1".to_string() })
        );
    }
}
