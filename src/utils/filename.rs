// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Filename sanitising for files written to the shared output directory

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Device names that cannot be used as file stems on Windows
const WINDOWS_DEVICE_FILES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn strip_re() -> &'static Regex {
    static STRIP_RE: OnceLock<Regex> = OnceLock::new();
    STRIP_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex is valid"))
}

/// Reduce a client-supplied filename to a safe, flat, ASCII-only name.
///
/// Accented letters are folded to their ASCII base (NFKD) and other non-ASCII
/// characters are dropped. `/` becomes a word break and whitespace runs become
/// `_`. Anything else outside `[A-Za-z0-9_.-]`, backslashes included, is
/// removed, then leading or trailing `.`/`_` are trimmed. The result never
/// contains a directory component but may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = strip_re().replace_all(&joined, "");
    let safe = stripped.trim_matches(|c| c == '.' || c == '_').to_string();

    let stem = safe.split('.').next().unwrap_or_default().to_uppercase();
    if !safe.is_empty() && WINDOWS_DEVICE_FILES.contains(&stem.as_str()) {
        return format!("_{}", safe);
    }

    safe
}
