// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload validation

use crate::api::errors::ApiError;

/// Accepted image filename extensions (case-insensitive)
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Validate a client-supplied upload filename.
///
/// Checks, in order: the filename is non-empty, and its extension is on the
/// allow-list. Byte content is never inspected here; undecodable uploads fail
/// later at inference time.
pub fn validate_filename(filename: &str) -> Result<(), ApiError> {
    if filename.is_empty() {
        return Err(ApiError::MissingFile("No selected file".to_string()));
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::UnsupportedFileType(format!(
            "Invalid file type: {}",
            if extension.is_empty() {
                filename
            } else {
                extension.as_str()
            }
        )));
    }

    Ok(())
}
