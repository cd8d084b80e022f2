// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summary statistics derived from a detection result

use serde::{Deserialize, Serialize};

use crate::detection::DetectedRegion;

/// Summary mapping returned alongside the annotated image
///
/// Every field is optional and omitted from the serialized form when absent:
/// with no regions only `detections` is present, and the default value
/// serializes to an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_confidence: Option<String>,
}

impl DetectionStats {
    /// Derive statistics from a possibly-empty region list.
    pub fn from_regions(regions: &[DetectedRegion]) -> Self {
        let mut stats = Self {
            detections: Some(regions.len()),
            ..Self::default()
        };

        if regions.is_empty() {
            return stats;
        }

        let scores: Vec<f32> = regions.iter().map(|r| r.confidence).collect();
        let sum: f32 = scores.iter().sum();
        let avg = sum / scores.len() as f32;
        let max = scores.iter().cloned().fold(0.0f32, f32::max);

        stats.avg_confidence = Some(format_percentage(avg));
        stats.max_confidence = Some(format_percentage(max));
        stats
    }
}

/// Format a [0,1] score as a percentage string with two decimals
fn format_percentage(score: f32) -> String {
    format!("{:.2}%", score * 100.0)
}
