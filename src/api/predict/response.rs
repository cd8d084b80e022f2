// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::stats::DetectionStats;
use crate::api::negotiation::ResponseFormat;
use crate::api::pages;

/// Successful prediction payload
///
/// Image references are public URLs under `/static`, never filesystem paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub uploaded_image: String,
    pub result_image: String,
    pub stats: DetectionStats,
}

impl PredictResponse {
    pub fn new(uploaded_image: String, result_image: String, stats: DetectionStats) -> Self {
        Self {
            success: true,
            uploaded_image,
            result_image,
            stats,
        }
    }

    /// Convert into an HTTP response shaped for the negotiated format.
    pub fn into_response_for(self, format: ResponseFormat) -> Response {
        match format {
            ResponseFormat::Json => Json(self).into_response(),
            ResponseFormat::Html => Html(pages::render_index(Some((
                &self.uploaded_image,
                &self.result_image,
            ))))
            .into_response(),
        }
    }
}
