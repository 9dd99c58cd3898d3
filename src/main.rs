// src/main.rs
// =============================================================================
// This is the entry point of the sitemap generator.
//
// What happens here:
// 1. Read configuration from flags / environment using clap
// 2. Set up logging (tracing, filtered by RUST_LOG)
// 3. Build the shared App (HTTP client + compiled link pattern)
// 4. Run either the console prompt or the HTTP server
// 5. Exit with 0 on success, 1 on any error
//
// Every log line of the run carries the application name and the mode
// through a root span, so nothing below needs a global logger.
// =============================================================================

mod app;
mod cli;
mod console;
mod crawl;
mod error;
mod page;
mod render;
mod server;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::{Config, Mode};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("sitemap generation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    // Bad flags or env values exit here with clap's message
    let config = Config::parse();
    init_tracing()?;

    let span = tracing::info_span!("sitemaps", app = %config.app_name, mode = ?config.mode);

    async move {
        let app = App::new(config).context("loading configuration")?;

        match app.config().mode {
            Mode::Console => console::run(&app).await,
            Mode::Server => server::serve(Arc::new(app)).await,
        }
    }
    .instrument(span)
    .await
}

// Logs go to stderr so they never mix with the console prompts on stdout
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sitemap_tree=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}
