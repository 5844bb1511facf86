// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engine abstraction and backend selection

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::extract::extract_texts;
use super::paddlex::PaddleXEngine;
use super::tesseract::TesseractEngine;
use super::vlm::VlmEngine;
use crate::config::{ConfigError, EngineConfig};

/// Errors raised while running OCR on a single image
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Failed to launch {engine}: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{engine} failed: {message}")]
    EngineFailed { engine: String, message: String },

    #[error("Unexpected {engine} output: {message}")]
    InvalidOutput { engine: String, message: String },

    #[error("Request to {engine} failed: {source}")]
    Http {
        engine: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Available OCR backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Local `tesseract` executable
    Tesseract,
    /// PaddleOCR pipeline behind PaddleX serving
    PaddleX,
    /// Vision-language model behind an OpenAI-compatible API
    Vlm,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Tesseract => "tesseract",
            EngineKind::PaddleX => "paddlex",
            EngineKind::Vlm => "vlm",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tesseract" => Ok(EngineKind::Tesseract),
            "paddlex" | "paddleocr" | "paddle" => Ok(EngineKind::PaddleX),
            "vlm" => Ok(EngineKind::Vlm),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

/// A pre-trained OCR engine invoked on image files
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short engine name used in logs
    fn name(&self) -> &str;

    /// Run recognition and return the engine's raw, possibly nested result
    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError>;

    /// Run recognition and return plain text
    async fn image_to_string(&self, image_path: &Path) -> Result<String, OcrError> {
        let result = self.predict(image_path).await?;
        Ok(extract_texts(&result).join("\n"))
    }
}

/// Build the configured engine
pub fn build_engine(config: &EngineConfig) -> anyhow::Result<Arc<dyn OcrEngine>> {
    let engine: Arc<dyn OcrEngine> = match config.kind {
        EngineKind::Tesseract => Arc::new(TesseractEngine::new(
            config.tesseract_path.clone(),
            &config.lang,
        )),
        EngineKind::PaddleX => Arc::new(PaddleXEngine::new(
            &config.paddlex_endpoint,
            config.use_angle_cls,
            config.timeout,
        )?),
        EngineKind::Vlm => Arc::new(VlmEngine::new(
            &config.vlm_endpoint,
            &config.vlm_model,
            config.timeout,
        )?),
    };

    tracing::info!("OCR engine configured: {}", engine.name());
    Ok(engine)
}
