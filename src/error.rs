// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Protected area {0} has no geometry")]
    MissingGeometry(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("No {table} entry for transition class {code}")]
    MissingLookup { table: &'static str, code: i64 },

    #[error("Protected Planet API error: {0}")]
    Registry(String),

    #[error("Earth Engine error: {0}")]
    Geospatial(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::MissingGeometry(_) => {
                tracing::warn!(error = %self, "Registry record without geometry");
                (StatusCode::BAD_GATEWAY, "missing_geometry", Some(self.to_string()))
            }
            AppError::DegenerateGeometry(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "degenerate_geometry",
                Some(msg.clone()),
            ),
            AppError::MissingLookup { .. } => {
                tracing::error!(error = %self, "Transition class lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_lookup", None)
            }
            AppError::Registry(msg) => {
                tracing::warn!(error = %msg, "Protected Planet request failed");
                (StatusCode::BAD_GATEWAY, "registry_error", Some(msg.clone()))
            }
            AppError::Geospatial(msg) => {
                tracing::warn!(error = %msg, "Earth Engine request failed");
                (StatusCode::BAD_GATEWAY, "earth_engine_error", Some(msg.clone()))
            }
            AppError::Auth(msg) => {
                tracing::error!(error = %msg, "Earth Engine authentication failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "auth_error", None)
            }
            AppError::Template(msg) => {
                tracing::error!(error = %msg, "Template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "template_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
