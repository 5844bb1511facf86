// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR engines and result handling
//!
//! Recognition itself is delegated to external engines. This module provides:
//! - `engine` - the `OcrEngine` trait and backend selection
//! - `tesseract`, `paddlex`, `vlm` - engine backends
//! - `extract` - flattening of nested engine results into text lines
//! - `pipeline` - image in, `.txt` file out

pub mod engine;
pub mod extract;
pub mod paddlex;
pub mod pipeline;
pub mod tesseract;
pub mod vlm;

pub use engine::{build_engine, EngineKind, OcrEngine, OcrError};
pub use extract::extract_texts;
pub use paddlex::PaddleXEngine;
pub use pipeline::{debug_dump, ocr_image_to_txt, DEBUG_DUMP_HEADER};
pub use tesseract::TesseractEngine;
pub use vlm::VlmEngine;
