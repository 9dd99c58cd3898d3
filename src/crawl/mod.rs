// src/crawl/mod.rs
// =============================================================================
// This module builds the sitemap tree.
//
// Features:
// - Recursive crawl from a seed URL, one tokio task per discovered link
// - Depth limit counted in link hops from the seed
// - Broken branches are dropped, a broken seed aborts the crawl
// - Optional cap on concurrent fetches
// =============================================================================

mod node;
mod tree;

pub use node::PageNode;
pub use tree::Crawler;
