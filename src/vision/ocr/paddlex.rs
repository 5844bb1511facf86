// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR backend via PaddleX serving
//!
//! Posts the image to the `/ocr` route of a PaddleX pipeline server and returns
//! the recognition part of each page result, which has the same shape as a
//! local `PaddleOCR.predict()` result.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::engine::{OcrEngine, OcrError};

const ENGINE_NAME: &str = "paddlex";

/// `fileType` value for single images
const FILE_TYPE_IMAGE: u8 = 1;

/// Recognition fields kept from each page result
const RECOGNITION_FIELDS: &[&str] = &["rec_texts", "rec_scores", "rec_boxes", "rec_polys"];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequest {
    file: String,
    file_type: u8,
    use_textline_orientation: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
    #[serde(default)]
    result: Option<OcrResultBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OcrResultBody {
    ocr_results: Option<Vec<PageResult>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResult {
    #[serde(default)]
    pruned_result: Map<String, Value>,
}

/// Client for a PaddleX OCR pipeline server
pub struct PaddleXEngine {
    client: Client,
    endpoint: String,
    use_angle_cls: bool,
}

impl PaddleXEngine {
    pub fn new(endpoint: &str, use_angle_cls: bool, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "PaddleX client configured: endpoint={}, angle_cls={}",
            endpoint, use_angle_cls
        );

        Ok(Self {
            client,
            endpoint,
            use_angle_cls,
        })
    }

    fn http_error(source: reqwest::Error) -> OcrError {
        OcrError::Http {
            engine: ENGINE_NAME.to_string(),
            source,
        }
    }
}

#[async_trait]
impl OcrEngine for PaddleXEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError> {
        let bytes = tokio::fs::read(image_path).await?;
        debug!(
            "Sending {} ({} bytes) to {}/ocr",
            image_path.display(),
            bytes.len(),
            self.endpoint
        );

        let request = OcrRequest {
            file: STANDARD.encode(&bytes),
            file_type: FILE_TYPE_IMAGE,
            use_textline_orientation: self.use_angle_cls,
        };

        let response = self
            .client
            .post(format!("{}/ocr", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(Self::http_error)?;

        let envelope: Envelope = response.json().await.map_err(Self::http_error)?;
        pages_from_envelope(envelope)
    }
}

fn pages_from_envelope(envelope: Envelope) -> Result<Value, OcrError> {
    if envelope.error_code != 0 {
        return Err(OcrError::EngineFailed {
            engine: ENGINE_NAME.to_string(),
            message: format!("error {}: {}", envelope.error_code, envelope.error_msg),
        });
    }

    let body = envelope.result.ok_or_else(|| OcrError::InvalidOutput {
        engine: ENGINE_NAME.to_string(),
        message: "response has no result".to_string(),
    })?;

    let ocr_results = body.ocr_results.ok_or_else(|| OcrError::InvalidOutput {
        engine: ENGINE_NAME.to_string(),
        message: "response has no ocrResults".to_string(),
    })?;

    let pages = ocr_results
        .into_iter()
        .map(|page| {
            let mut kept = Map::new();
            for (key, value) in page.pruned_result {
                if RECOGNITION_FIELDS.contains(&key.as_str()) {
                    kept.insert(key, value);
                }
            }
            Value::Object(kept)
        })
        .collect();

    Ok(Value::Array(pages))
}
