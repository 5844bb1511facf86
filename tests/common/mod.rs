// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use fabstir_ocr_node::{
    api::{create_router, AppState},
    OcrEngine, OcrError,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// 1x1 red PNG
pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

pub const BOUNDARY: &str = "fabstir-test-boundary";

pub fn tiny_png() -> Vec<u8> {
    STANDARD.decode(TINY_PNG_BASE64).unwrap()
}

/// Engine returning a canned result and counting calls
pub struct StaticEngine {
    result: Value,
    calls: AtomicUsize,
}

impl StaticEngine {
    pub fn new(result: Value) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for StaticEngine {
    fn name(&self) -> &str {
        "static"
    }

    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError> {
        assert!(image_path.exists(), "engine called with missing image");
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Engine that always fails
pub struct FailingEngine;

#[async_trait]
impl OcrEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    async fn predict(&self, _image_path: &Path) -> Result<Value, OcrError> {
        Err(OcrError::EngineFailed {
            engine: "failing".to_string(),
            message: "model weights missing".to_string(),
        })
    }
}

pub fn app_with(engine: Arc<dyn OcrEngine>, output_dir: &Path, max_upload_bytes: usize) -> Router {
    create_router(AppState::new(
        engine,
        PathBuf::from(output_dir),
        max_upload_bytes,
    ))
}

/// Build a multipart body with one part
pub fn multipart_body(field: &str, filename: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(filename) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                field, filename
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Engine that fails on one file name and reads `text` from every other image
pub struct FailOnEngine {
    pub fail_on: &'static str,
    pub text: &'static str,
}

#[async_trait]
impl OcrEngine for FailOnEngine {
    fn name(&self) -> &str {
        "fail-on"
    }

    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError> {
        if image_path.file_name().and_then(|n| n.to_str()) == Some(self.fail_on) {
            return Err(OcrError::EngineFailed {
                engine: "fail-on".to_string(),
                message: format!("cannot read {}", self.fail_on),
            });
        }
        Ok(Value::String(self.text.to_string()))
    }
}
