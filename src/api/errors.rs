// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! API error taxonomy
//!
//! Two client-caused validation errors and one catch-all for everything that
//! goes wrong after validation (storage writes, model invocation, rendering).
//! The catch-all deliberately does not discriminate between causes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use super::negotiation::ResponseFormat;

/// Generic message returned for every detection-side failure
pub const PREDICTION_ERROR_MESSAGE: &str = "An error occurred during prediction";

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Multipart request without a usable `file` field (400)
    #[error("{0}")]
    MissingFile(String),
    /// Upload with a filename extension outside the allow-list (400)
    #[error("{0}")]
    UnsupportedFileType(String),
    /// Any storage or model failure after validation (500)
    #[error("{0}")]
    Detection(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingFile(_) | ApiError::UnsupportedFileType(_) => 400,
            ApiError::Detection(_) => 500,
        }
    }

    fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn message(&self) -> &str {
        match self {
            ApiError::MissingFile(msg)
            | ApiError::UnsupportedFileType(msg)
            | ApiError::Detection(msg) => msg,
        }
    }

    /// Convert into an HTTP response shaped for the negotiated format.
    pub fn into_response_for(self, format: ResponseFormat) -> Response {
        let status = self.status();
        match (format, &self) {
            (ResponseFormat::Json, ApiError::Detection(details)) => (
                status,
                Json(json!({
                    "error": PREDICTION_ERROR_MESSAGE,
                    "details": details,
                })),
            )
                .into_response(),
            (ResponseFormat::Json, other) => {
                (status, Json(json!({ "error": other.message() }))).into_response()
            }
            (ResponseFormat::Html, ApiError::Detection(details)) => {
                (status, format!("Error: {}", details)).into_response()
            }
            (ResponseFormat::Html, other) => (status, other.message().to_string()).into_response(),
        }
    }
}
