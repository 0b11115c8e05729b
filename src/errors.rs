use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// How the error is laid out in the JSON response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{"message": ...}`
    Message,
    /// `{"message": ..., "error": detail}`
    MessageWithError(String),
    /// `{"error": ..., "details": detail}`
    ErrorWithDetails(String),
}

/// An error converted into an HTTP response at the handler boundary.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub body: ErrorBody,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            body: ErrorBody::Message,
        }
    }

    /// Missing or unusable input (400).
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// A dependency call failed (500); the cause is surfaced as `error`.
    pub fn dependency(msg: impl Into<String>, cause: &dyn std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            body: ErrorBody::MessageWithError(cause.to_string()),
        }
    }

    /// A dependency call failed (500); the cause is surfaced as `details`.
    pub fn dependency_details(msg: impl Into<String>, cause: &dyn std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            body: ErrorBody::ErrorWithDetails(cause.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ErrorBody::Message => write!(f, "{}", self.message),
            ErrorBody::MessageWithError(detail) | ErrorBody::ErrorWithDetails(detail) => {
                write!(f, "{}: {}", self.message, detail)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.body {
            ErrorBody::Message => json!({ "message": self.message }),
            ErrorBody::MessageWithError(detail) => json!({
                "message": self.message,
                "error": detail,
            }),
            ErrorBody::ErrorWithDetails(detail) => json!({
                "error": self.message,
                "details": detail,
            }),
        };

        (self.status, Json(body)).into_response()
    }
}
