// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Upload endpoint tests for POST /upload
//!
//! These tests verify that upload_handler correctly:
//! - Saves the image under its sanitised name
//! - Writes the extracted text next to it
//! - Rejects malformed requests with the expected JSON errors
//! - Reports OCR failures as `ocr_failed`

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fabstir_ocr_node::vision::ocr::DEBUG_DUMP_HEADER;
use serde_json::json;
use std::sync::Arc;

use crate::common::{
    app_with, body_json, multipart_body, send, tiny_png, upload_request, FailingEngine,
    StaticEngine,
};

const LIMIT: usize = 16 * 1024 * 1024;

fn predict_result(lines: &[&str]) -> serde_json::Value {
    let scores: Vec<f64> = lines.iter().map(|_| 0.95).collect();
    json!([{ "rec_texts": lines, "rec_scores": scores }])
}

// =============================================================================
// Success Cases
// =============================================================================

#[tokio::test]
async fn test_upload_extracts_text() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StaticEngine::new(predict_result(&["INVOICE #42", "  Total: 12.50  "]));
    let app = app_with(engine.clone(), dir.path(), LIMIT);

    let body = multipart_body("file", Some("samp1.png"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let image_path = dir.path().join("samp1.png");
    let txt_path = dir.path().join("samp1.txt");
    assert_eq!(json["image"], image_path.display().to_string());
    assert_eq!(json["txt_file"], txt_path.display().to_string());
    assert_eq!(json["text_lines_count"], 2);
    assert_eq!(json["text_preview"], "INVOICE #42\nTotal: 12.50");
    assert!(json.get("warning").is_none());

    assert_eq!(std::fs::read(&image_path).unwrap(), tiny_png());
    assert_eq!(
        std::fs::read_to_string(&txt_path).unwrap(),
        "INVOICE #42\nTotal: 12.50"
    );
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_upload_preview_limited_to_20_lines() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (1..=30).map(|i| format!("row {}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let app = app_with(StaticEngine::new(predict_result(&refs)), dir.path(), LIMIT);

    let body = multipart_body("file", Some("table.jpg"), &tiny_png());
    let json = body_json(send(app, upload_request(body)).await).await;

    assert_eq!(json["text_lines_count"], 30);
    let preview = json["text_preview"].as_str().unwrap();
    assert_eq!(preview.lines().count(), 20);
    assert!(preview.ends_with("row 20"));

    let full = std::fs::read_to_string(dir.path().join("table.txt")).unwrap();
    assert_eq!(full.lines().count(), 30);
}

#[tokio::test]
async fn test_upload_without_text_writes_debug_dump() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&[])), dir.path(), LIMIT);

    let body = multipart_body("file", Some("blank.bmp"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["text_lines_count"], 0);
    assert_eq!(json["text_preview"], "");
    assert!(json["warning"].as_str().unwrap().contains("debug dump"));

    let dump = std::fs::read_to_string(dir.path().join("blank.txt")).unwrap();
    assert!(dump.starts_with(DEBUG_DUMP_HEADER));
    assert!(dump.contains("rec_texts"));
}

#[tokio::test]
async fn test_upload_filename_is_sanitised() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["ok"])), dir.path(), LIMIT);

    let body = multipart_body("file", Some("../../my scan.PNG"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(dir.path().join("my_scan.PNG").exists());
    assert!(dir.path().join("my_scan.txt").exists());
}

#[tokio::test]
async fn test_upload_accented_name_folded() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["ok"])), dir.path(), LIMIT);

    let body = multipart_body("file", Some("r\u{e9}sum\u{e9} scan.png"), &tiny_png());
    let json = body_json(send(app, upload_request(body)).await).await;

    let image_path = dir.path().join("resume_scan.png");
    assert_eq!(json["image"], image_path.display().to_string());
    assert!(dir.path().join("resume_scan.txt").exists());
}

#[tokio::test]
async fn test_upload_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("samp1.png"), b"old").unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["new"])), dir.path(), LIMIT);

    let body = multipart_body("file", Some("samp1.png"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(std::fs::read(dir.path().join("samp1.png")).unwrap(), tiny_png());
}

// =============================================================================
// Validation Errors
// =============================================================================

#[tokio::test]
async fn test_missing_file_part() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StaticEngine::new(predict_result(&["x"]));
    let app = app_with(engine.clone(), dir.path(), LIMIT);

    let body = multipart_body("document", Some("samp1.png"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "no file part in request"})
    );
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_file_part_without_filename() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["x"])), dir.path(), LIMIT);

    let body = multipart_body("file", None, b"just a text field");
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "no file part in request");
}

#[tokio::test]
async fn test_not_multipart() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["x"])), dir.path(), LIMIT);

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "samp1.png"}"#))
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "no file part in request");
}

#[tokio::test]
async fn test_empty_filename() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["x"])), dir.path(), LIMIT);

    let body = multipart_body("file", Some(""), b"");
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "no selected file"}));
}

#[tokio::test]
async fn test_extension_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StaticEngine::new(predict_result(&["x"]));
    let app = app_with(engine.clone(), dir.path(), LIMIT);

    let body = multipart_body("file", Some("notes.txt"), b"hello");
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("file extension not allowed. Allowed:"));
    assert!(error.contains(".png"));
    assert!(!dir.path().join("notes.txt").exists());
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_name_sanitised_to_nothing_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(StaticEngine::new(predict_result(&["x"])), dir.path(), LIMIT);

    let body = multipart_body("file", Some("../.."), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StaticEngine::new(predict_result(&["x"]));
    let app = app_with(engine.clone(), dir.path(), 1024);

    let body = multipart_body("file", Some("huge.png"), &vec![0u8; 8 * 1024]);
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await, json!({"error": "file too large"}));
    assert_eq!(engine.calls(), 0);
    assert!(!dir.path().join("huge.png").exists());
}

// =============================================================================
// OCR Failures
// =============================================================================

#[tokio::test]
async fn test_ocr_failure_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(Arc::new(FailingEngine), dir.path(), LIMIT);

    let body = multipart_body("file", Some("samp1.gif"), &tiny_png());
    let response = send(app, upload_request(body)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "ocr_failed");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .contains("model weights missing"));

    // The saved image is kept, no text file is written
    assert!(dir.path().join("samp1.gif").exists());
    assert!(!dir.path().join("samp1.txt").exists());
}
