// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod batch;
pub mod cli;
pub mod config;
pub mod utils;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_router, start_server, AppState};
pub use batch::{run_batch, BatchSummary};
pub use config::{ConfigError, EngineConfig, ServiceConfig};
pub use vision::ocr::{build_engine, extract_texts, ocr_image_to_txt, EngineKind, OcrEngine, OcrError};
