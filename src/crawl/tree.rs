// src/crawl/tree.rs
// =============================================================================
// This module implements the recursive, concurrent page crawler.
//
// How one step works:
// 1. Count one more step of depth
// 2. Parse the link, fetch the page, extract its links
// 3. No links -> the page is left out of the tree entirely
// 4. Past the depth limit -> return the node without children
// 5. Otherwise spawn one task per link, wait for all of them and keep the
//    subtrees that came back
//
// Failure policy:
// - the seed's own failure is returned to the caller (the run aborts)
// - a child's failure is logged and the branch is dropped; its siblings and
//   the parent carry on
//
// Children are collected in a buffer local to each step and attached once
// all of them have finished, so no node is ever written by two tasks. They
// end up in the order they finished, not the order they were found.
//
// There is no visited set: a page linked from several places is fetched
// once per place, and link cycles only stop at the depth limit.
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Instrument;
use url::Url;

use super::PageNode;
use crate::error::CrawlError;
use crate::page::{LinkExtractor, PageFetcher};

#[derive(Clone)]
pub struct Crawler {
    max_depth: u32,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<LinkExtractor>,
    // Caps in-flight fetches when set; unbounded otherwise
    permits: Option<Arc<Semaphore>>,
}

impl Crawler {
    /// `max_depth` is the number of link hops below the seed that get
    /// materialized. Nodes `max_depth` hops away are never expanded.
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: LinkExtractor, max_depth: u32) -> Self {
        Self {
            max_depth,
            fetcher,
            extractor: Arc::new(extractor),
            permits: None,
        }
    }

    /// Allows at most `limit` fetches in flight across the whole crawl.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.permits = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Crawls from `seed`. `Ok(None)` means the seed has no outbound links.
    pub async fn crawl(&self, seed: &str) -> Result<Option<PageNode>, CrawlError> {
        self.traverse(seed.to_string(), seed.to_string(), 0).await
    }

    /// One recursive step. `depth` is the caller's step count; the step for
    /// `link` is `depth + 1`, so the seed (called with 0) is step 1 and a
    /// node at step `max_depth + 1` is the boundary.
    pub fn traverse(
        &self,
        link: String,
        parent: String,
        depth: u32,
    ) -> BoxFuture<'static, Result<Option<PageNode>, CrawlError>> {
        let depth = depth + 1;
        let span = tracing::info_span!("page", url = %link, site = %parent, depth);
        let crawler = self.clone();

        async move { crawler.visit(link, depth).await }
            .instrument(span)
            .boxed()
    }

    async fn visit(self, link: String, depth: u32) -> Result<Option<PageNode>, CrawlError> {
        tracing::info!("reading page");

        let url = Url::parse(&link).map_err(|source| CrawlError::UrlParse {
            url: link.clone(),
            source,
        })?;

        let content = self.fetch(&url).await?;
        let links = self.extractor.extract(&url, &content)?;

        if links.is_empty() {
            tracing::debug!("page has no links, leaving it out");
            return Ok(None);
        }

        let mut node = PageNode::new(link.as_str());

        if depth > self.max_depth {
            return Ok(Some(node));
        }

        tracing::debug!(links = links.len(), "following links");

        let mut branches: FuturesUnordered<_> = links
            .into_iter()
            .map(|child| {
                let branch = tokio::spawn(self.traverse(child.clone(), link.clone(), depth));
                branch.map(move |joined| (child, joined))
            })
            .collect();

        while let Some((child, joined)) = branches.next().await {
            match joined {
                Ok(Ok(Some(subtree))) => node.children.push(subtree),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(link = %child, depth = depth + 1, error = %e, "dropping branch");
                }
                Err(e) => {
                    tracing::warn!(link = %child, depth = depth + 1, error = %e, "branch task panicked");
                }
            }
        }

        Ok(Some(node))
    }

    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        // The permit is held for the download only, never while waiting on
        // children, otherwise parents could starve their own branches
        let _permit = match &self.permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        };
        self.fetcher.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    enum FakePage {
        Body(String),
        Status(u16),
        Panic,
    }

    // An in-memory website. Unknown URLs fall back to `default_body` or 404.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, FakePage>,
        default_body: Option<String>,
        delay: Option<Duration>,
        fetches: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeSite {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), FakePage::Body(body.to_string()));
            self
        }

        fn status(mut self, url: &str, code: u16) -> Self {
            self.pages.insert(url.to_string(), FakePage::Status(code));
            self
        }

        fn panics(mut self, url: &str) -> Self {
            self.pages.insert(url.to_string(), FakePage::Panic);
            self
        }

        fn fetch_count(&self, url: &str) -> usize {
            self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
            *self.fetches.lock().unwrap().entry(url.to_string()).or_default() += 1;

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.pages.get(url.as_str()) {
                Some(FakePage::Body(body)) => Ok(body.clone()),
                Some(FakePage::Status(code)) => Err(CrawlError::UnexpectedStatus(*code)),
                Some(FakePage::Panic) => panic!("fetcher blew up on {}", url),
                None => match &self.default_body {
                    Some(body) => Ok(body.clone()),
                    None => Err(CrawlError::UnexpectedStatus(404)),
                },
            }
        }
    }

    fn crawler(site: Arc<FakeSite>, max_depth: u32) -> Crawler {
        Crawler::new(site, LinkExtractor::default(), max_depth)
    }

    fn child_urls(node: &PageNode) -> Vec<&str> {
        let mut urls: Vec<&str> = node.children.iter().map(|c| c.url.as_str()).collect();
        urls.sort();
        urls
    }

    // Walks the tree checking that nothing lies beyond `max_depth` hops and
    // that nodes exactly `max_depth` hops down have no children
    fn assert_depth_bound(node: &PageNode, hops: u32, max_depth: u32) {
        assert!(hops <= max_depth, "{} is {} hops deep", node.url, hops);
        if hops == max_depth {
            assert!(node.children.is_empty(), "{} was expanded", node.url);
        }
        for child in &node.children {
            assert_depth_bound(child, hops + 1, max_depth);
        }
    }

    #[tokio::test]
    async fn test_single_link_at_depth_one() {
        let site = Arc::new(FakeSite {
            default_body: Some(r#"<a href="/about">About</a>"#.to_string()),
            ..Default::default()
        });

        let tree = crawler(site, 1)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(tree.url, "https://example.com/");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].url, "https://example.com/about");
        assert!(tree.children[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_seed_404_fails_crawl() {
        let site = Arc::new(FakeSite::default().status("https://example.com/", 404));

        let err = crawler(site, 2)
            .crawl("https://example.com/")
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::UnexpectedStatus(404)));
    }

    #[tokio::test]
    async fn test_seed_without_links_yields_nothing() {
        let site = Arc::new(FakeSite::default().page("https://example.com/", "<p>hello</p>"));

        let tree = crawler(site, 3).crawl("https://example.com/").await.unwrap();
        assert!(tree.is_none());
    }

    #[tokio::test]
    async fn test_invalid_seed_is_parse_error() {
        let site = Arc::new(FakeSite::default());

        let err = crawler(site.clone(), 1).crawl("not a url").await.unwrap_err();
        assert!(matches!(err, CrawlError::UrlParse { .. }));
        assert_eq!(site.fetch_count("not a url"), 0);
    }

    #[tokio::test]
    async fn test_malformed_link_on_seed_fails_crawl() {
        let site = Arc::new(
            FakeSite::default().page("https://example.com/", r#"<a href="http://">x</a>"#),
        );

        let err = crawler(site, 1).crawl("https://example.com/").await.unwrap_err();
        assert!(matches!(err, CrawlError::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_leaf_pages_left_out() {
        let site = Arc::new(
            FakeSite::default()
                .page(
                    "https://example.com/",
                    r#"<a href="/leaf">Leaf</a><a href="/hub">Hub</a>"#,
                )
                .page("https://example.com/leaf", "<p>dead end</p>")
                .page("https://example.com/hub", r#"<a href="/">Home</a>"#),
        );

        let tree = crawler(site, 1)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(child_urls(&tree), vec!["https://example.com/hub"]);
    }

    #[tokio::test]
    async fn test_failed_branches_are_dropped() {
        let site = Arc::new(
            FakeSite::default()
                .page(
                    "https://example.com/",
                    r#"<a href="/one">1</a><a href="/broken">2</a><a href="/two">3</a><a href="/bad-link">4</a>"#,
                )
                .page("https://example.com/one", r#"<a href="/">Home</a>"#)
                .page("https://example.com/two", r#"<a href="/">Home</a>"#)
                .status("https://example.com/broken", 500)
                .page("https://example.com/bad-link", r#"<a href="http://">?</a>"#),
        );

        let tree = crawler(site, 1)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            child_urls(&tree),
            vec!["https://example.com/one", "https://example.com/two"]
        );
    }

    #[tokio::test]
    async fn test_panicking_branch_is_dropped() {
        let site = Arc::new(
            FakeSite::default()
                .page(
                    "https://example.com/",
                    r#"<a href="/boom">1</a><a href="/fine">2</a>"#,
                )
                .panics("https://example.com/boom")
                .page("https://example.com/fine", r#"<a href="/">Home</a>"#),
        );

        let tree = crawler(site.clone(), 1)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(child_urls(&tree), vec!["https://example.com/fine"]);
        assert_eq!(site.fetch_count("https://example.com/boom"), 1);
    }

    #[tokio::test]
    async fn test_depth_bound_on_cyclic_site() {
        let site = Arc::new(
            FakeSite::default()
                .page("https://example.com/", r#"<a href="/a">A</a><a href="/b">B</a>"#)
                .page("https://example.com/a", r#"<a href="/b">B</a><a href="/">Home</a>"#)
                .page("https://example.com/b", r#"<a href="/a">A</a>"#),
        );

        for max_depth in 1..=4 {
            let tree = crawler(site.clone(), max_depth)
                .crawl("https://example.com/")
                .await
                .unwrap()
                .unwrap();

            assert_depth_bound(&tree, 0, max_depth);
            assert_eq!(tree.height(), max_depth as usize);
        }
    }

    #[tokio::test]
    async fn test_pages_refetched_per_branch() {
        let site = Arc::new(
            FakeSite::default()
                .page("https://example.com/", r#"<a href="/b">B</a>"#)
                .page("https://example.com/b", r#"<a href="/">Home</a>"#),
        );

        let tree = crawler(site.clone(), 2)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        // seed -> /b -> seed again, no visited set
        assert_eq!(tree.page_count(), 3);
        assert_eq!(site.fetch_count("https://example.com/"), 2);
        assert_eq!(site.fetch_count("https://example.com/b"), 1);
    }

    #[tokio::test]
    async fn test_max_concurrency_caps_in_flight_fetches() {
        let site = Arc::new(FakeSite {
            default_body: Some(
                r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#.to_string(),
            ),
            delay: Some(Duration::from_millis(10)),
            ..Default::default()
        });

        let tree = crawler(site.clone(), 2)
            .with_max_concurrency(2)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        // 1 seed + 3 children + 9 grandchildren
        assert_eq!(tree.page_count(), 13);
        assert!(site.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_unbounded_fan_out_runs_siblings_together() {
        let site = Arc::new(FakeSite {
            default_body: Some(
                r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#.to_string(),
            ),
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });

        let tree = crawler(site.clone(), 1)
            .crawl("https://example.com/")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            child_urls(&tree),
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
        assert_eq!(site.peak_in_flight.load(Ordering::SeqCst), 3);
    }
}
