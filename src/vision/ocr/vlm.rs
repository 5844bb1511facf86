// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM backend for OCR via an OpenAI-compatible API

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::engine::{OcrEngine, OcrError};
use crate::vision::image_utils::{detect_format, format_to_extension};

const ENGINE_NAME: &str = "vlm";

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: Value,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const OCR_PROMPT: &str = "Extract all text from this image. Return only the extracted text, preserving the original layout and formatting as much as possible. If no text is found, respond with an empty string.";

/// OCR engine that asks a vision-language model to transcribe the image
pub struct VlmEngine {
    client: Client,
    endpoint: String,
    model_name: String,
}

impl VlmEngine {
    /// Create a new VLM engine
    pub fn new(endpoint: &str, model_name: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client,
            endpoint,
            model_name: model_name.to_string(),
        })
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn http_error(source: reqwest::Error) -> OcrError {
        OcrError::Http {
            engine: ENGINE_NAME.to_string(),
            source,
        }
    }

    fn build_request(&self, data_url: String) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "text", "text": OCR_PROMPT},
                    {"type": "image_url", "image_url": {"url": data_url}}
                ]),
            }],
            max_tokens: 4096,
            temperature: 0.1,
        }
    }
}

/// Build a data URL, sniffing the MIME subtype from the image bytes
fn data_url(bytes: &[u8]) -> String {
    let subtype = match detect_format(bytes) {
        Ok(format) => format_to_extension(format),
        Err(_) => "png",
    };
    let subtype = if subtype == "jpg" { "jpeg" } else { subtype };
    format!("data:image/{};base64,{}", subtype, STANDARD.encode(bytes))
}

#[async_trait]
impl OcrEngine for VlmEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError> {
        let start = std::time::Instant::now();
        let bytes = tokio::fs::read(image_path).await?;
        let request = self.build_request(data_url(&bytes));

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(Self::http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::EngineFailed {
                engine: ENGINE_NAME.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(Self::http_error)?;
        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        debug!(
            "VLM OCR complete: {} chars, {}ms (model: {})",
            text.len(),
            start.elapsed().as_millis(),
            self.model_name
        );

        Ok(Value::String(text))
    }
}
