// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /predict
//!
//! These tests drive the full router with a fixed-output detector, so they
//! verify the whole upload → store → infer → annotate → respond pipeline
//! without needing a model artifact on disk.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use fabstir_vision_node::{
    api::{build_router, AppState},
    detection::{DetectionResult, ObjectDetector, StaticDetector},
    storage::UploadStore,
};

const BODY_LIMIT: usize = 10 * 1024 * 1024;
const BOUNDARY: &str = "x-test-boundary";

/// Detector that always fails, for exercising the error boundary
struct FailingDetector;

impl ObjectDetector for FailingDetector {
    fn detect(&self, _image_path: &Path) -> anyhow::Result<DetectionResult> {
        Err(anyhow::anyhow!("model exploded"))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Helper: state rooted in a fresh temp directory
fn setup_state(detector: Arc<dyn ObjectDetector>) -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let store = UploadStore::new(dir.path());
    store.ensure_dirs().unwrap();
    let state = AppState::new(detector, Arc::new(store));
    (dir, state)
}

fn app(state: AppState) -> Router {
    build_router(state, BODY_LIMIT)
}

/// Helper: a small valid PNG
fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        8,
        8,
        image::Rgb([180, 40, 40]),
    ));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// Helper: build a multipart body with a single form field
fn multipart_body(field_name: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn predict_request(body: Vec<u8>, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(accept) = accept {
        builder = builder.header("accept", accept);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_file_field_returns_400_json() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("other", "cat.jpg", b"bytes");
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file part");
}

#[tokio::test]
async fn test_non_multipart_request_returns_400() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("accept", "application/json")
        .body(Body::empty())
        .unwrap();
    let response = app(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file part");
}

#[tokio::test]
async fn test_empty_filename_returns_400() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("file", "", b"bytes");
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No selected file");
}

#[tokio::test]
async fn test_disallowed_extension_returns_400() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("file", "notes.txt", b"bytes");
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid file type"));
}

#[tokio::test]
async fn test_disallowed_extension_plain_text_when_html_wanted() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("file", "notes.txt", b"bytes");
    let response = app(state).oneshot(predict_request(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = body_string(response).await;
    assert!(text.contains("Invalid file type"));
}

#[tokio::test]
async fn test_successful_prediction_json() {
    let detector = StaticDetector::with_confidences(&[0.80, 0.95, 0.60]);
    let (dir, state) = setup_state(Arc::new(detector));

    let body = multipart_body("file", "cat.jpg", &png_bytes());
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["uploaded_image"], "/static/uploads/cat.jpg");
    assert_eq!(json["result_image"], "/static/uploads/result_cat.jpg");
    assert_eq!(json["stats"]["detections"], 3);
    assert_eq!(json["stats"]["avg_confidence"], "78.33%");
    assert_eq!(json["stats"]["max_confidence"], "95.00%");

    // Both artifacts exist on disk
    assert!(dir.path().join("uploads/cat.jpg").exists());
    assert!(dir.path().join("uploads/result_cat.jpg").exists());
}

#[tokio::test]
async fn test_successful_prediction_html() {
    let detector = StaticDetector::with_confidences(&[0.9]);
    let (_dir, state) = setup_state(Arc::new(detector));

    let body = multipart_body("file", "cat.jpg", &png_bytes());
    let response = app(state).oneshot(predict_request(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_string(response).await;
    assert!(html.contains(r#"alt="Uploaded Image""#));
    assert!(html.contains(r#"alt="Detected Result""#));
    assert!(html.contains("/static/uploads/cat.jpg"));
    assert!(html.contains("/static/uploads/result_cat.jpg"));
}

#[tokio::test]
async fn test_zero_detections_stats() {
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("file", "cat.png", &png_bytes());
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stats"]["detections"], 0);
    assert!(json["stats"].get("avg_confidence").is_none());
    assert!(json["stats"].get("max_confidence").is_none());
}

#[tokio::test]
async fn test_detection_failure_returns_500_json() {
    let (_dir, state) = setup_state(Arc::new(FailingDetector));

    let body = multipart_body("file", "cat.jpg", &png_bytes());
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An error occurred during prediction");
    assert!(json["details"].as_str().unwrap().contains("model exploded"));
}

#[tokio::test]
async fn test_detection_failure_returns_500_text() {
    let (_dir, state) = setup_state(Arc::new(FailingDetector));

    let body = multipart_body("file", "cat.jpg", &png_bytes());
    let response = app(state).oneshot(predict_request(body, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_string(response).await;
    assert!(text.starts_with("Error: "));
}

#[tokio::test]
async fn test_corrupt_image_bytes_fail_at_inference() {
    // Extension validation passes, decoding fails inside the detector
    let (_dir, state) = setup_state(Arc::new(StaticDetector::default()));

    let body = multipart_body("file", "cat.jpg", b"definitely not an image");
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An error occurred during prediction");
}

#[tokio::test]
async fn test_traversal_filename_is_sanitized() {
    let detector = StaticDetector::with_confidences(&[0.5]);
    let (dir, state) = setup_state(Arc::new(detector));

    let body = multipart_body("file", "../../etc/passwd.png", &png_bytes());
    let response = app(state)
        .oneshot(predict_request(body, Some("application/json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["uploaded_image"], "/static/uploads/passwd.png");

    // The file landed inside the uploads directory, nowhere else
    assert!(dir.path().join("uploads/passwd.png").exists());
    assert!(!dir.path().join("../etc/passwd.png").exists());
}
