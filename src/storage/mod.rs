// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload and result image storage
//!
//! Uploads and their annotated results live under `<static root>/uploads` and
//! are served back to clients as `/static/uploads/...` URLs. Identical
//! sanitized filenames overwrite each other, last writer wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the static root holding uploads and results
const UPLOADS_SUBDIR: &str = "uploads";

/// Prefix applied to annotated output filenames
const RESULT_PREFIX: &str = "result_";

/// Filesystem store for uploaded and annotated images
#[derive(Debug, Clone)]
pub struct UploadStore {
    static_root: PathBuf,
    uploads_dir: PathBuf,
}

impl UploadStore {
    pub fn new(static_root: impl Into<PathBuf>) -> Self {
        let static_root = static_root.into();
        let uploads_dir = static_root.join(UPLOADS_SUBDIR);
        Self {
            static_root,
            uploads_dir,
        }
    }

    /// Create the storage directories if they do not exist. Idempotent.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.uploads_dir)
    }

    /// Root directory served under `/static`
    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    /// Reduce a client-supplied filename to a safe basename.
    ///
    /// Takes the final path component, replaces every character outside
    /// `[A-Za-z0-9._-]` with `_`, and strips leading dots. Returns `None`
    /// when nothing usable remains.
    pub fn sanitize_filename(name: &str) -> Option<String> {
        let basename = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();

        let cleaned: String = basename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let cleaned = cleaned.trim_start_matches('.').to_string();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    /// Persist an upload under its sanitized name, overwriting any previous
    /// file of the same name.
    pub fn save_upload(&self, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.upload_path(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.uploads_dir.join(name)
    }

    pub fn result_path(&self, name: &str) -> PathBuf {
        self.uploads_dir.join(format!("{}{}", RESULT_PREFIX, name))
    }

    /// Public URL of a stored upload
    pub fn upload_url(&self, name: &str) -> String {
        format!("/static/{}/{}", UPLOADS_SUBDIR, name)
    }

    /// Public URL of a stored result image
    pub fn result_url(&self, name: &str) -> String {
        format!("/static/{}/{}{}", UPLOADS_SUBDIR, RESULT_PREFIX, name)
    }
}
