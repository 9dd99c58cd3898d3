// src/server/handler.rs
// =============================================================================
// GET /?url=<seed>&maxDepth=<n>&xmlFileName=<name>
//
// Crawls the seed and answers with the rendered sitemap:
// - 200 + document        the crawl produced a tree
// - 204                   the seed page has no links
// - 400 + explanation     a parameter is missing, empty or not a number
// - 500 + error text      the seed could not be crawled or rendered
// =============================================================================

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{Result, ServerError};
use crate::app::{parse_max_depth, App};

pub async fn sitemap(
    State(app): State<Arc<App>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let url = required(&params, "url")?;
    let raw_depth = required(&params, "maxDepth")?;
    let max_depth = parse_max_depth(raw_depth).ok_or_else(|| {
        tracing::warn!(max_depth = %raw_depth, "rejecting non-numeric maxDepth");
        ServerError::InvalidDepth
    })?;
    let name = required(&params, "xmlFileName")?;
    let file_name = attachment_name(&app.config().output_file_name(&format!("http_{}", name)));

    let Some(root) = app.sitemap(url, max_depth).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let format = app.config().format;
    let body = format.render(&root).map_err(|e| {
        tracing::error!(error = %e, "rendering sitemap failed");
        e
    })?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];

    Ok((StatusCode::OK, headers, body).into_response())
}

pub async fn health() -> &'static str {
    "ok"
}

// Quotes, backslashes and control characters cannot sit inside a quoted
// header parameter, so they become '_'
fn attachment_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c.is_control() || c == '"' || c == '\\' { '_' } else { c })
        .collect()
}

// Missing and empty parameters are treated the same
fn required<'a>(params: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str> {
    match params.get(name).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ServerError::MissingParam(name)),
    }
}
