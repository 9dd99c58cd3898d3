// src/crawl/node.rs
// =============================================================================
// The tree the crawler builds.
//
// A PageNode exists only for a page that was fetched, parsed and had at
// least one outbound link. Each node owns its children outright; nothing is
// shared between siblings, so a finished tree can be handed to a renderer
// by value.
// =============================================================================

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNode {
    /// Absolute URL of the page, exactly as it was crawled
    pub url: String,
    /// One entry per outbound link that produced a subtree
    #[serde(rename = "nodes")]
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn page_count(&self) -> usize {
        1 + self.children.iter().map(PageNode::page_count).sum::<usize>()
    }

    /// Longest chain of link hops below this node (0 for a node without children).
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }
}
