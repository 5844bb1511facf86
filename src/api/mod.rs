// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod upload;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{download_handler, health_handler, HealthResponse};
pub use http_server::{create_router, prepare_output_dir, start_server, AppState};
pub use upload::{upload_handler, UploadResponse};
