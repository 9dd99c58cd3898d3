// src/server/mod.rs
// =============================================================================
// Server mode: the same crawl as the console, triggered by HTTP requests and
// answered in the response body instead of a file.
//
// Routes:
// - GET /        build a sitemap (see handler.rs for the parameters)
// - GET /health  liveness probe
// =============================================================================

mod error;
mod handler;

use axum::{body::Body, extract::Request, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app::App;

pub fn router(app: Arc<App>) -> Router {
    // Connections run in their own tasks, outside the process root span, so
    // every request span carries the app name and mode itself
    let app_name = app.config().app_name.clone();
    let mode = app.config().mode;
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        tracing::info_span!(
            "request",
            app = %app_name,
            mode = ?mode,
            method = %request.method(),
            uri = %request.uri()
        )
    });

    Router::new()
        .route("/", get(handler::sitemap))
        .route("/health", get(handler::health))
        .layer(trace)
        .with_state(app)
}

/// Listens on the configured port until Ctrl-C or SIGTERM.
pub async fn serve(app: Arc<App>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], app.config().port));
    tracing::info!("starting http server...");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received shutdown signal");
}
