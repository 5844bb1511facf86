// Version information for the Fabstir OCR Node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-upload-ocr-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "upload-ocr",
    "text-download",
    "batch-folder-ocr",
    "tesseract-engine",
    "paddlex-engine",
    "vlm-engine",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir OCR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
