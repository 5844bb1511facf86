// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Folder OCR runner
//!
//! Runs the configured engine over every PNG/JPEG image in a folder and
//! collects the text into one consolidated file, one section per image.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use crate::vision::image_utils::{decode_image_bytes, is_batch_image};
use crate::vision::ocr::OcrEngine;

/// Default folder scanned for images
pub const DEFAULT_INPUT_DIR: &str = "content/";

/// Default consolidated output file
pub const DEFAULT_OUTPUT_FILE: &str = "ocr_output.txt";

/// Outcome of a completed batch run
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// File the sections were written to
    pub output_file: PathBuf,
    /// Processed image names, in output order
    pub processed: Vec<String>,
}

/// Section header written before each image's text
pub fn section_header(image_name: &str) -> String {
    format!("--- Text from {} ---\n", image_name)
}

/// List the images in `input_dir` the batch runner picks up, sorted by name
pub fn list_batch_images(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input folder {}", input_dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if is_batch_image(name) && entry.file_type()?.is_file() {
            images.push(entry.path());
        }
    }

    images.sort();
    Ok(images)
}

/// OCR every image in `input_dir` and write all text to `output_file`.
///
/// Stops at the first image that cannot be read, decoded or recognised.
pub async fn run_batch(
    engine: &dyn OcrEngine,
    input_dir: &Path,
    output_file: &Path,
) -> Result<BatchSummary> {
    let images = list_batch_images(input_dir)?;
    info!(
        "Found {} images in {} (engine: {})",
        images.len(),
        input_dir.display(),
        engine.name()
    );

    let file = tokio::fs::File::create(output_file)
        .await
        .with_context(|| format!("failed to create {}", output_file.display()))?;
    let mut writer = BufWriter::new(file);
    let mut processed = Vec::with_capacity(images.len());

    // Sections written before a failure stay in the output file
    let outcome = write_sections(engine, &images, &mut writer, &mut processed).await;
    let flushed = writer.flush().await;
    outcome?;
    flushed.with_context(|| format!("failed to write {}", output_file.display()))?;

    Ok(BatchSummary {
        output_file: output_file.to_path_buf(),
        processed,
    })
}

async fn write_sections<W>(
    engine: &dyn OcrEngine,
    images: &[PathBuf],
    writer: &mut W,
    processed: &mut Vec<String>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for image_path in images {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("failed to read {}", image_path.display()))?;
        let image_info = decode_image_bytes(&bytes)
            .with_context(|| format!("failed to open image {}", image_path.display()))?;
        debug!(
            "Decoded {}: {}x{}, {} bytes",
            name, image_info.width, image_info.height, image_info.size_bytes
        );

        let text = engine
            .image_to_string(image_path)
            .await
            .with_context(|| format!("OCR failed for {}", image_path.display()))?;

        writer.write_all(section_header(&name).as_bytes()).await?;
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n\n").await?;

        info!("Extracted {} chars from {}", text.len(), name);
        processed.push(name);
    }
    Ok(())
}
