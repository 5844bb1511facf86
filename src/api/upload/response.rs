// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload response types

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of lines included in `text_preview`
pub const PREVIEW_LINES: usize = 20;

/// Warning attached when the engine produced no text
pub const NO_TEXT_WARNING: &str = "No text extracted - debug dump saved in txt file.";

/// Response from a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    /// Where the uploaded image was saved
    pub image: String,
    /// Where the extracted text (or debug dump) was written
    pub txt_file: String,
    /// Number of extracted lines
    pub text_lines_count: usize,
    /// First lines of the extracted text
    pub text_preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl UploadResponse {
    pub fn new(image: &Path, txt_file: &Path, texts: &[String]) -> Self {
        let preview_end = texts.len().min(PREVIEW_LINES);

        Self {
            image: image.display().to_string(),
            txt_file: txt_file.display().to_string(),
            text_lines_count: texts.len(),
            text_preview: texts[..preview_end].join("\n"),
            warning: texts.is_empty().then(|| NO_TEXT_WARNING.to_string()),
        }
    }
}
