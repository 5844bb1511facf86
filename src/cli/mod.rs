// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser};

use crate::batch::{run_batch, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
use crate::config::{
    EngineConfig, DEFAULT_ENGINE_TIMEOUT_SECS, DEFAULT_OCR_LANG, DEFAULT_PADDLEX_ENDPOINT,
    DEFAULT_TESSERACT_PATH, DEFAULT_VLM_ENDPOINT, DEFAULT_VLM_MODEL,
};
use crate::version;
use crate::vision::ocr::{build_engine, EngineKind};

/// Fabstir OCR batch runner
#[derive(Parser, Debug)]
#[command(name = "fabstir-ocr-batch")]
#[command(version = version::VERSION_NUMBER)]
#[command(about = "Run OCR over a folder of images into one text file", long_about = None)]
pub struct Cli {
    /// Folder scanned for .png, .jpg and .jpeg images
    #[arg(long, env = "OCR_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Consolidated output file
    #[arg(long, env = "OCR_OUTPUT_FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Engine selection shared with the upload service's environment
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// OCR backend: tesseract, paddlex or vlm
    #[arg(long, env = "OCR_ENGINE", default_value = "tesseract")]
    pub engine: EngineKind,

    /// Language hint (e.g. en, ch, en|ch)
    #[arg(long, env = "OCR_LANG", default_value = DEFAULT_OCR_LANG)]
    pub lang: String,

    /// Disable the text-line orientation classifier (PaddleX)
    #[arg(long)]
    pub no_angle_cls: bool,

    /// Tesseract executable
    #[arg(long, env = "TESSERACT_PATH", default_value = DEFAULT_TESSERACT_PATH)]
    pub tesseract_path: PathBuf,

    /// PaddleX serving base URL
    #[arg(long, env = "PADDLEX_ENDPOINT", default_value = DEFAULT_PADDLEX_ENDPOINT)]
    pub paddlex_endpoint: String,

    /// OpenAI-compatible VLM base URL
    #[arg(long, env = "VLM_ENDPOINT", default_value = DEFAULT_VLM_ENDPOINT)]
    pub vlm_endpoint: String,

    /// VLM model name
    #[arg(long, env = "VLM_MODEL", default_value = DEFAULT_VLM_MODEL)]
    pub vlm_model: String,

    /// Timeout for HTTP engines, in seconds
    #[arg(long, env = "ENGINE_TIMEOUT_SECS", default_value_t = DEFAULT_ENGINE_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl From<EngineArgs> for EngineConfig {
    fn from(args: EngineArgs) -> Self {
        EngineConfig {
            kind: args.engine,
            lang: args.lang,
            use_angle_cls: !args.no_angle_cls,
            tesseract_path: args.tesseract_path,
            paddlex_endpoint: args.paddlex_endpoint,
            vlm_endpoint: args.vlm_endpoint,
            vlm_model: args.vlm_model,
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

/// Execute a batch run
pub async fn execute(cli: Cli) -> Result<()> {
    tracing::info!("{}", version::get_version_string());
    let engine = build_engine(&EngineConfig::from(cli.engine))?;
    let summary = run_batch(engine.as_ref(), &cli.input_dir, &cli.output_file).await?;

    println!(
        "✅ OCR complete! Extracted text saved to {}",
        summary.output_file.display()
    );
    Ok(())
}
