use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::CertificateError;

pub const NOT_FOUND_MESSAGE: &str = "Certificate not found";
pub const LEDGER_FAILURE_MESSAGE: &str = "Blockchain read failed";

/// Errors returned by the HTTP read path. Ledger failure details are logged,
/// never sent to the client.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("certificate not found: {0}")]
    NotFound(String),

    #[error("ledger read failed: {0}")]
    LedgerUnavailable(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            Self::LedgerUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, LEDGER_FAILURE_MESSAGE),
        }
    }
}

impl From<CertificateError> for ApiError {
    fn from(err: CertificateError) -> Self {
        Self::LedgerUnavailable(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if let Self::LedgerUnavailable(detail) = &self {
            tracing::error!(error = %detail, "ledger read failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
