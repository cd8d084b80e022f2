// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handler

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};

use super::request::validate_filename;
use super::response::PredictResponse;
use super::stats::DetectionStats;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::negotiation::ResponseFormat;
use crate::storage::UploadStore;

/// POST /predict - Run object detection on an uploaded image
///
/// Accepts a multipart form with a `file` field holding the image and
/// responds with either JSON or the HTML view, selected from the request
/// headers.
///
/// # Response
/// - JSON: `{success, uploaded_image, result_image, stats}`
/// - HTML: the index page with both image references bound in
///
/// # Errors
/// - 400 Bad Request: missing file field, empty filename, or an extension
///   outside the allow-list
/// - 500 Internal Server Error: storage or detection failure (generic
///   message, logged server-side)
pub async fn predict_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Option<Multipart>,
) -> Response {
    // Negotiate from headers only, before the body is touched, so error
    // responses are shaped correctly even for requests with no usable body.
    let format = ResponseFormat::negotiate(&headers);
    debug!("Prediction request received (format: {:?})", format);

    match run_pipeline(&state, multipart).await {
        Ok(response) => response.into_response_for(format),
        Err(error) => {
            warn!("Prediction failed: {}", error);
            error.into_response_for(format)
        }
    }
}

async fn run_pipeline(
    state: &AppState,
    multipart: Option<Multipart>,
) -> Result<PredictResponse, ApiError> {
    // 1. Extract the uploaded file from the multipart body
    let (filename, bytes) = read_file_field(multipart).await?;

    // 2. Validate the filename and its extension
    validate_filename(&filename)?;

    let name = UploadStore::sanitize_filename(&filename)
        .ok_or_else(|| ApiError::MissingFile("No selected file".to_string()))?;

    // 3. Persist the upload
    let upload_path = state
        .store
        .save_upload(&name, &bytes)
        .map_err(|e| ApiError::Detection(e.to_string()))?;

    // 4. Invoke the detection model and render the annotated output
    let result = state
        .detector
        .detect(&upload_path)
        .map_err(|e| ApiError::Detection(e.to_string()))?;

    let result_path = state.store.result_path(&name);
    result
        .render(&result_path)
        .map_err(|e| ApiError::Detection(e.to_string()))?;

    // 5. Derive summary statistics
    let stats = DetectionStats::from_regions(&result.regions);

    info!(
        "Prediction complete: {} regions for {}",
        result.regions.len(),
        name
    );

    Ok(PredictResponse::new(
        state.store.upload_url(&name),
        state.store.result_url(&name),
        stats,
    ))
}

/// Pull the `file` field out of the multipart body.
async fn read_file_field(multipart: Option<Multipart>) -> Result<(String, Vec<u8>), ApiError> {
    let mut multipart =
        multipart.ok_or_else(|| ApiError::MissingFile("No file part".to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MissingFile(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::MissingFile(format!("Unreadable file field: {}", e)))?;
            return Ok((filename, bytes.to_vec()));
        }
    }

    Err(ApiError::MissingFile("No file part".to_string()))
}
