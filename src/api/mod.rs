// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod negotiation;
pub mod pages;
pub mod predict;

pub use errors::{ApiError, PREDICTION_ERROR_MESSAGE};
pub use http_server::{build_router, start_server, AppState};
pub use negotiation::ResponseFormat;
pub use predict::{predict_handler, DetectionStats, PredictResponse, ALLOWED_EXTENSIONS};
