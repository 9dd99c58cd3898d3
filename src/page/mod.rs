// src/page/mod.rs
// =============================================================================
// Everything that happens to a single page: download it, find its links.
//
// Submodules:
// - fetch: the PageFetcher trait and its HTTP implementation
// - links: regex-driven link extraction and resolution
// =============================================================================

mod fetch;
mod links;

pub use fetch::{HttpFetcher, PageFetcher};
pub use links::{LinkExtractor, DEFAULT_URL_PATTERN};
