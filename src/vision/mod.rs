// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module
//!
//! This module provides:
//! - OCR (Optical Character Recognition) through pluggable external engines
//! - Image file checks shared by the upload service and the batch runner

pub mod image_utils;
pub mod ocr;

pub use image_utils::{
    allowed_filename, decode_image_bytes, detect_format, is_batch_image, ImageError, ImageInfo,
};
