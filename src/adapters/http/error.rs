//! HTTP error mapping.
//!
//! Converts domain errors into the wire error shape:
//! `{ error, code, message, details?, request_id, timestamp }`, with the
//! status code chosen per error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, ErrorKind, RequestId, Timestamp};

/// Wire shape of an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
    pub request_id: RequestId,
    pub timestamp: Timestamp,
}

/// API error carrying the request correlation id.
#[derive(Debug)]
pub struct ApiError {
    pub error: DomainError,
    pub request_id: RequestId,
}

impl ApiError {
    pub fn new(error: DomainError, request_id: RequestId) -> Self {
        Self { error, request_id }
    }
}

/// Maps an error kind to its HTTP status code.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ConfigurationError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ErrorKind::InvalidPayload => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidPayloadStructure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.error.kind);
        if status.is_server_error() {
            tracing::error!(request_id = %self.request_id, error = %self.error, "request failed");
        } else {
            tracing::debug!(request_id = %self.request_id, error = %self.error, "request rejected");
        }

        let body = ErrorBody {
            error: self.error.kind.as_str(),
            code: status.as_u16(),
            message: self.error.message,
            details: self.error.details,
            request_id: self.request_id,
            timestamp: Timestamp::now(),
        };
        (status, Json(body)).into_response()
    }
}
