// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tesseract CLI backend
//!
//! Runs the `tesseract` executable as a subprocess. Structured output comes
//! from the TSV renderer, with words grouped back into lines and reported in
//! the same `rec_texts` / `rec_scores` / `rec_boxes` layout PaddleOCR uses.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::debug;

use super::engine::{OcrEngine, OcrError};

const ENGINE_NAME: &str = "tesseract";

/// TSV `level` value for word rows
const WORD_LEVEL: &str = "5";

/// OCR engine backed by a local Tesseract install
pub struct TesseractEngine {
    executable: PathBuf,
    lang: String,
}

impl TesseractEngine {
    pub fn new(executable: PathBuf, lang: &str) -> Self {
        Self {
            executable,
            lang: tesseract_lang(lang),
        }
    }

    /// Tesseract language code in use, e.g. "eng+chi_sim"
    pub fn lang(&self) -> &str {
        &self.lang
    }

    async fn run(&self, image_path: &Path, config: Option<&str>) -> Result<String, OcrError> {
        let mut command = Command::new(&self.executable);
        command
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(config) = config {
            command.arg(config);
        }

        debug!(
            "Running {} on {} (lang={})",
            self.executable.display(),
            image_path.display(),
            self.lang
        );

        let output = command.output().await.map_err(|source| OcrError::Spawn {
            engine: ENGINE_NAME.to_string(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineFailed {
                engine: ENGINE_NAME.to_string(),
                message: stderr.trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| OcrError::InvalidOutput {
            engine: ENGINE_NAME.to_string(),
            message: format!("output is not UTF-8: {}", e),
        })
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    async fn predict(&self, image_path: &Path) -> Result<Value, OcrError> {
        let tsv = self.run(image_path, Some("tsv")).await?;
        Ok(Value::Array(vec![lines_from_tsv(&tsv)]))
    }

    async fn image_to_string(&self, image_path: &Path) -> Result<String, OcrError> {
        self.run(image_path, None).await
    }
}

/// Map short language hints onto Tesseract traineddata names.
///
/// Multiple languages may be joined with `|` or `+`.
pub fn tesseract_lang(lang: &str) -> String {
    lang.split(&['|', '+'][..])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| match l {
            "en" => "eng",
            "ch" => "chi_sim",
            "ch_tra" | "chinese_cht" => "chi_tra",
            "ja" | "japan" => "jpn",
            "ko" | "korean" => "kor",
            "fr" | "french" => "fra",
            "de" | "german" => "deu",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("+")
}

struct Line {
    key: (String, String, String, String),
    words: Vec<String>,
    confidences: Vec<f64>,
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

/// Group TSV word rows into lines
fn lines_from_tsv(tsv: &str) -> Value {
    let mut lines: Vec<Line> = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let text = cols[11..].join("\t");
        if text.trim().is_empty() {
            continue;
        }

        let key = (
            cols[1].to_string(),
            cols[2].to_string(),
            cols[3].to_string(),
            cols[4].to_string(),
        );
        let num = |i: usize| cols[i].trim().parse::<i64>().unwrap_or(0);
        let (left, top, width, height) = (num(6), num(7), num(8), num(9));
        let conf = cols[10].trim().parse::<f64>().unwrap_or(-1.0);

        let index = match lines.iter().position(|l| l.key == key) {
            Some(index) => index,
            None => {
                lines.push(Line {
                    key,
                    words: Vec::new(),
                    confidences: Vec::new(),
                    left,
                    top,
                    right: left + width,
                    bottom: top + height,
                });
                lines.len() - 1
            }
        };
        let line = &mut lines[index];

        line.words.push(text.trim().to_string());
        if conf >= 0.0 {
            line.confidences.push(conf);
        }
        line.left = line.left.min(left);
        line.top = line.top.min(top);
        line.right = line.right.max(left + width);
        line.bottom = line.bottom.max(top + height);
    }

    let mut texts = Vec::with_capacity(lines.len());
    let mut scores = Vec::with_capacity(lines.len());
    let mut boxes = Vec::with_capacity(lines.len());
    for line in lines {
        let score = if line.confidences.is_empty() {
            0.0
        } else {
            line.confidences.iter().sum::<f64>() / line.confidences.len() as f64 / 100.0
        };
        texts.push(line.words.join(" "));
        scores.push(score);
        boxes.push(json!([line.left, line.top, line.right, line.bottom]));
    }

    json!({
        "rec_texts": texts,
        "rec_scores": scores,
        "rec_boxes": boxes,
    })
}
