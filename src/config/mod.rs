// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration loaded from environment variables
//!
//! Every setting has a default so the node starts with no environment at all.
//! Malformed numeric or boolean values fall back to their default with a warning;
//! an unknown engine name is a hard error.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::vision::ocr::EngineKind;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port
pub const DEFAULT_PORT: u16 = 5000;
/// Default shared output directory for uploaded images and text files
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
/// 16 MB upload limit
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
/// Default language hint
pub const DEFAULT_OCR_LANG: &str = "en";
pub const DEFAULT_TESSERACT_PATH: &str = "tesseract";
pub const DEFAULT_PADDLEX_ENDPOINT: &str = "http://127.0.0.1:8080";
pub const DEFAULT_VLM_ENDPOINT: &str = "http://127.0.0.1:8081";
pub const DEFAULT_VLM_MODEL: &str = "qwen3-vl";
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown OCR engine '{0}', expected one of: tesseract, paddlex, vlm")]
    UnknownEngine(String),
}

/// Settings for the OCR engine backend
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Which backend to run
    pub kind: EngineKind,
    /// Language hint, e.g. "en" or "ch"
    pub lang: String,
    /// Enable the text-line orientation classifier (PaddleX only)
    pub use_angle_cls: bool,
    /// Tesseract executable
    pub tesseract_path: PathBuf,
    /// Base URL of a PaddleOCR serving instance
    pub paddlex_endpoint: String,
    /// Base URL of an OpenAI-compatible VLM server
    pub vlm_endpoint: String,
    /// Model name sent to the VLM server
    pub vlm_model: String,
    /// Request timeout for HTTP engines
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::Tesseract,
            lang: DEFAULT_OCR_LANG.to_string(),
            use_angle_cls: true,
            tesseract_path: PathBuf::from(DEFAULT_TESSERACT_PATH),
            paddlex_endpoint: DEFAULT_PADDLEX_ENDPOINT.to_string(),
            vlm_endpoint: DEFAULT_VLM_ENDPOINT.to_string(),
            vlm_model: DEFAULT_VLM_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_ENGINE_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Load engine settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load engine settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let kind = match lookup("OCR_ENGINE") {
            Some(name) => EngineKind::from_str(&name)?,
            None => defaults.kind,
        };

        Ok(Self {
            kind,
            lang: lookup("OCR_LANG").unwrap_or(defaults.lang),
            use_angle_cls: parse_bool(&lookup, "USE_ANGLE_CLS", defaults.use_angle_cls),
            tesseract_path: lookup("TESSERACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tesseract_path),
            paddlex_endpoint: lookup("PADDLEX_ENDPOINT").unwrap_or(defaults.paddlex_endpoint),
            vlm_endpoint: lookup("VLM_ENDPOINT").unwrap_or(defaults.vlm_endpoint),
            vlm_model: lookup("VLM_MODEL").unwrap_or(defaults.vlm_model),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "ENGINE_TIMEOUT_SECS",
                DEFAULT_ENGINE_TIMEOUT_SECS,
            )),
        })
    }
}

/// Settings for the upload service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Uploaded images and generated `.txt` files both land here
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load service settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load service settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let engine = EngineConfig::from_lookup(&lookup)?;

        Ok(Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "API_PORT", defaults.port),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            engine,
        })
    }

    /// Socket address string for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("Invalid {}='{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if v == "true" || v == "1" || v == "yes" => true,
        Some(v) if v == "false" || v == "0" || v == "no" => false,
        Some(v) => {
            warn!("Invalid {}='{}', using default {}", key, v, default);
            default
        }
        None => default,
    }
}
