//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::AIBackend;

use super::build_requestor;

pub async fn cmd_serve(
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
    model: Option<&str>,
) -> Result<()> {
    let requestor = build_requestor(model)?;

    println!("🚀 Starting FinSight web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   AI backend: {} ({})",
        requestor.client().backend_name(),
        requestor.client().model()
    );
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   🌍 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;

    let config = finsight_server::ServerConfig { allowed_origins };
    finsight_server::serve(requestor, host, port, static_dir_str, config).await?;

    Ok(())
}
