// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_ocr_node::{api::start_server, config::ServiceConfig, version};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir OCR Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();
    tracing::info!("{}", version::get_version_string());
    tracing::info!("Features: {}", version::FEATURES.join(", "));

    let config = ServiceConfig::from_env()?;

    println!("🔎 OCR engine: {} (lang: {})", config.engine.kind, config.engine.lang);
    println!("📂 Output directory: {}", config.output_dir.display());
    println!(
        "📏 Upload limit: {} MB",
        config.max_upload_bytes / (1024 * 1024)
    );
    println!("🌐 Listening on http://{}\n", config.listen_addr());

    start_server(config).await?;

    println!("👋 Fabstir OCR Node stopped");
    Ok(())
}
