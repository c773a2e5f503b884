//! Engine error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors raised while loading description documents. All are fatal at startup.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Document folder missing or not a directory
    #[error("Folder not found: '{0}'")]
    FolderNotFound(String),

    /// No description files in the folder
    #[error("No valid .yaml, .yml or .json files found in folder '{0}'")]
    NoDocuments(String),

    /// Neither a `swagger: 2.x` nor an `openapi: 3.x` marker
    #[error("Unrecognized description dialect in '{0}'")]
    UnrecognizedDialect(String),

    #[error("Failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid folder pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Per-request failures while building a mock response.
#[derive(Debug, Error)]
pub enum MockError {
    /// Operation declares no responses at all
    #[error("No responses declared for operation {0}")]
    NoResponses(String),

    /// Response entry is a reference that does not resolve
    #[error("Response '{status}' of operation {operation} could not be resolved")]
    UnresolvedResponse { operation: String, status: String },

    /// Selected response declares neither schema nor example
    #[error("No response content found for operation {operation} ({status})")]
    MissingContent { operation: String, status: String },

    /// Top-level response schema reference does not resolve
    #[error("Dangling reference '{reference}' in operation {operation}")]
    DanglingReference { operation: String, reference: String },

    /// Declared status key does not map to an HTTP status
    #[error("Invalid declared status code '{0}'")]
    InvalidStatus(String),
}

impl MockError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
