// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::utils::secure_filename;
use crate::vision::image_utils::content_type_for;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// GET /download/<filename> - Stream a file from the output directory
///
/// The requested name goes through the same sanitiser as uploads, so only
/// files directly inside the output directory can be reached.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let safe = secure_filename(&filename);
    let file_path = state.output_dir.join(&safe);

    let metadata = match tokio::fs::metadata(&file_path).await {
        Ok(metadata) if !safe.is_empty() && metadata.is_file() => metadata,
        _ => {
            warn!("Download of '{}' rejected: not found", filename);
            return Err(ApiError::NotFound("not found".to_string()));
        }
    };

    let file = tokio::fs::File::open(&file_path).await.map_err(|e| {
        warn!("Failed to open {}: {}", file_path.display(), e);
        ApiError::NotFound("not found".to_string())
    })?;
    debug!("Streaming {} ({} bytes)", file_path.display(), metadata.len());

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&safe))
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", safe),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::InternalError(e.to_string()))
}
