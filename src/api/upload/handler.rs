// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload endpoint handler

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use axum_extra::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use tracing::{debug, info, warn};

use super::response::UploadResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::utils::secure_filename;
use crate::vision::image_utils::{allowed_extensions_display, allowed_filename};
use crate::vision::ocr::ocr_image_to_txt;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

const NO_FILE_PART: &str = "no file part in request";
const NO_SELECTED_FILE: &str = "no selected file";

/// POST /upload - Save an image and extract its text
///
/// Accepts a multipart form with a `file` field. Example using curl:
/// `curl -X POST -F "file=@./images/samp1.png" http://127.0.0.1:5000/upload`
///
/// The image is stored in the output directory under its sanitised name and
/// the recognised lines are written next to it as `<stem>.txt`.
///
/// # Response (201 Created)
/// - `image`: Path of the saved image
/// - `txt_file`: Path of the written text file
/// - `text_lines_count`: Number of extracted lines
/// - `text_preview`: First 20 lines joined by newlines
/// - `warning`: Present when no text was extracted and a debug dump was written
///
/// # Errors
/// - 400 Bad Request: Missing `file` part, empty filename or disallowed extension
/// - 413 Payload Too Large: Body exceeds the configured upload limit
/// - 500 Internal Server Error: Saving the image or OCR failed
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    // 1. Locate the file part
    let mut multipart = multipart.map_err(|e| {
        warn!("Upload rejected, not a multipart request: {}", e);
        ApiError::InvalidRequest(NO_FILE_PART.to_string())
    })?;

    let (client_name, data) = read_file_field(&mut multipart).await?.ok_or_else(|| {
        warn!("Upload rejected: no '{}' part", FILE_FIELD);
        ApiError::InvalidRequest(NO_FILE_PART.to_string())
    })?;

    if client_name.is_empty() {
        warn!("Upload rejected: empty filename");
        return Err(ApiError::InvalidRequest(NO_SELECTED_FILE.to_string()));
    }

    // 2. Validate the sanitised name
    let filename = secure_filename(&client_name);
    if !allowed_filename(&filename) {
        warn!("Upload rejected: extension not allowed for '{}'", client_name);
        return Err(ApiError::InvalidRequest(format!(
            "file extension not allowed. Allowed: {}",
            allowed_extensions_display()
        )));
    }

    // 3. Save the image
    let saved_path = state.output_dir.join(&filename);
    tokio::fs::write(&saved_path, &data).await.map_err(|e| {
        warn!("Failed to save upload to {}: {}", saved_path.display(), e);
        ApiError::InternalError(format!("failed to save upload: {}", e))
    })?;
    debug!("Saved {} bytes to {}", data.len(), saved_path.display());

    // 4. Run OCR; the saved image is kept on failure
    let (txt_path, texts) = ocr_image_to_txt(state.engine.as_ref(), &saved_path, None)
        .await
        .map_err(|e| {
            warn!("OCR failed for {}: {}", saved_path.display(), e);
            ApiError::OcrFailed(e.to_string())
        })?;

    info!(
        "OCR complete for {}: {} lines -> {}",
        filename,
        texts.len(),
        txt_path.display()
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse::new(&saved_path, &txt_path, &texts)),
    ))
}

/// Read the first `file` part that carries a filename
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Bytes)>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some((name, data)));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload rejected: {}", e.body_text());
        ApiError::PayloadTooLarge("file too large".to_string())
    } else {
        warn!("Malformed multipart body: {}", e.body_text());
        ApiError::InvalidRequest(e.body_text())
    }
}
