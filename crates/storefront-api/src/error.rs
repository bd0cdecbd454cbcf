//! Storefront API: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storefront_core::error::DomainError;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection, pool or migration error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migrations could not be applied.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store (or another outbound dependency) is unreachable.
    #[error("dependency error: {0}")]
    Dependency(#[from] DomainError),

    /// Tracing or exporter setup failed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Result codes carried in every JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// The request succeeded.
    Success = 1,
    /// Input failed validation.
    Validation = 2,
    /// A business rule rejected the request, or the target does not exist.
    Other = 3,
    /// The endpoint requires a login.
    LoginRequired = 4,
    /// Another request changed the data first.
    Conflict = 5,
    /// Server-side failure.
    Internal = 6,
}

impl Serialize for ResultCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// JSON body of every non-data response: `{ "code": 1, "messages": [] }`.
#[derive(Debug, Serialize)]
pub struct ResultBody {
    /// Outcome code.
    pub code: ResultCode,
    /// User-facing messages.
    pub messages: Vec<String>,
}

impl ResultBody {
    /// The body of a successful command.
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: ResultCode::Success,
            messages: Vec::new(),
        }
    }
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, ResultCode::Validation),
            DomainError::Rejected(_) => (StatusCode::BAD_REQUEST, ResultCode::Other),
            DomainError::LoginRequired => (StatusCode::UNAUTHORIZED, ResultCode::LoginRequired),
            DomainError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, ResultCode::Other),
            DomainError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, ResultCode::Conflict),
            DomainError::NoSubscriber { .. }
            | DomainError::Inconsistency(_)
            | DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ResultCode::Internal)
            }
        };

        let mut messages = self.0.user_messages();
        if messages.is_empty() {
            if status == StatusCode::NOT_FOUND {
                messages.push("the requested resource was not found".to_owned());
            } else {
                tracing::error!(error = %self.0, "request failed");
                messages.push("an unexpected error occurred; please try again later".to_owned());
            }
        }

        (status, Json(ResultBody { code, messages })).into_response()
    }
}
