// src/error.rs
use axum::http::StatusCode as AxumStatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum PayrollError {
    #[error("Invalid year-month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Configuration error: {0}")]
    Config(#[from] envy::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    #[error("Failed to acquire lock")]
    LockError,
}

impl IntoResponse for PayrollError {
    fn into_response(self) -> axum::response::Response {
        error!("Error occurred: {:?}", self);
        let (status_code, error_message) = match &self {
            PayrollError::InvalidMonth(_)
            | PayrollError::InvalidDate(_)
            | PayrollError::InvalidTime(_) => (AxumStatusCode::BAD_REQUEST, self.to_string()),
            PayrollError::SerdeJson(_) => (
                AxumStatusCode::BAD_REQUEST,
                "Snapshot body is not valid JSON.".to_string(),
            ),
            PayrollError::Config(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error.".to_string(),
            ),
            PayrollError::Csv(_) | PayrollError::Io(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Export failed. Check logs.".to_string(),
            ),
            PayrollError::TlsConfig(_) => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Server TLS configuration error.".to_string(),
            ),
            PayrollError::LockError => (
                AxumStatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error (Concurrency).".to_string(),
            ),
        };
        (status_code, Json(json!({ "error": error_message }))).into_response()
    }
}
