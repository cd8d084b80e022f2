// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-output detector for tests and demos
//!
//! Serves the same role as the mock collaborators shipped elsewhere in the
//! library: it exercises the full upload/annotate/respond pipeline without
//! requiring a model artifact on disk.

use std::path::Path;

use anyhow::Result;

use super::labels::class_label;
use super::{DetectedRegion, DetectionResult, ObjectDetector};

/// Detector that returns a preconfigured region list for every image
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    regions: Vec<DetectedRegion>,
}

impl StaticDetector {
    pub fn new(regions: Vec<DetectedRegion>) -> Self {
        Self { regions }
    }

    /// Build a detector returning one synthetic region per confidence score.
    pub fn with_confidences(scores: &[f32]) -> Self {
        let regions = scores
            .iter()
            .enumerate()
            .map(|(i, &confidence)| {
                let offset = (i * 12) as f32;
                DetectedRegion {
                    x1: offset,
                    y1: offset,
                    x2: offset + 10.0,
                    y2: offset + 10.0,
                    confidence,
                    class_id: i,
                    label: class_label(i).to_string(),
                }
            })
            .collect();
        Self::new(regions)
    }
}

impl ObjectDetector for StaticDetector {
    fn detect(&self, image_path: &Path) -> Result<DetectionResult> {
        let image = super::load_image(image_path)?;
        Ok(DetectionResult::new(image, self.regions.clone()))
    }

    fn model_name(&self) -> &str {
        "static"
    }
}
