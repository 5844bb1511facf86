// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image-to-text-file pipeline

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::engine::{OcrEngine, OcrError};
use super::extract::extract_texts;

/// Header written in place of text when nothing could be extracted
pub const DEBUG_DUMP_HEADER: &str =
    "# No text extracted by parser. Raw predict() output below (JSON-ish):\n\n";

/// Run OCR on `image_path` and write the recognised lines to a text file.
///
/// The text file defaults to the image path with a `.txt` extension. When the
/// engine output yields no text, the file receives a pretty-printed dump of the
/// raw result instead so the output can be inspected.
///
/// Returns the written path and the extracted lines (empty for a dump).
pub async fn ocr_image_to_txt(
    engine: &dyn OcrEngine,
    image_path: &Path,
    out_path: Option<&Path>,
) -> Result<(PathBuf, Vec<String>), OcrError> {
    if !tokio::fs::try_exists(image_path).await.unwrap_or(false) {
        return Err(OcrError::ImageNotFound(image_path.to_path_buf()));
    }

    let start = std::time::Instant::now();
    let result = engine.predict(image_path).await?;
    let texts = extract_texts(&result);
    debug!(
        "{} returned {} lines for {} in {}ms",
        engine.name(),
        texts.len(),
        image_path.display(),
        start.elapsed().as_millis()
    );

    let out_path = match out_path {
        Some(path) => path.to_path_buf(),
        None => image_path.with_extension("txt"),
    };
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    if texts.is_empty() {
        warn!(
            "No text extracted from {}, writing debug dump to {}",
            image_path.display(),
            out_path.display()
        );
        tokio::fs::write(&out_path, debug_dump(&result)?).await?;
        return Ok((out_path, Vec::new()));
    }

    tokio::fs::write(&out_path, texts.join("\n")).await?;
    info!("Wrote {} lines to {}", texts.len(), out_path.display());
    Ok((out_path, texts))
}

/// Render the raw engine result for the no-text fallback file
pub fn debug_dump(result: &Value) -> Result<String, OcrError> {
    Ok(format!(
        "{}{}",
        DEBUG_DUMP_HEADER,
        serde_json::to_string_pretty(result)?
    ))
}
