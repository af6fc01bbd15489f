//! Serve command - run the HTTP API.

use super::{load, open_ingestor};
use anyhow::{Context, Result};
use colored::Colorize;
use papyr_api::AppState;

pub fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let (mut config, paths) = load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let ingestor = open_ingestor(&config, &paths)?;
    let addr = config.server.bind_addr();

    if !papyr_process::all_tools_available() {
        println!(
            "{} Some OCR tools are missing; run 'papyr status' for details.",
            "Warning:".yellow().bold()
        );
    }

    let state = AppState::new(
        ingestor,
        config.processing.max_concurrent_jobs,
        config.server.max_upload_bytes(),
    )
    .shared();

    println!("{} http://{}", "Serving Papyr on".cyan().bold(), addr);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(papyr_api::serve(state, &addr))
        .with_context(|| format!("Server on {} failed", addr))?;

    Ok(())
}
