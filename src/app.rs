// src/app.rs
// =============================================================================
// The piece both entry points share: turn (seed URL, max depth) into a tree.
//
// App is built once at startup. It owns the HTTP client and the compiled
// link pattern; each request gets its own Crawler because the depth limit
// is chosen per request.
// =============================================================================

use std::sync::Arc;

use crate::cli::Config;
use crate::crawl::{Crawler, PageNode};
use crate::error::{ConfigError, CrawlError};
use crate::page::{HttpFetcher, LinkExtractor, PageFetcher};

pub struct App {
    config: Config,
    fetcher: Arc<dyn PageFetcher>,
    extractor: LinkExtractor,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher))?)
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ConfigError> {
        let extractor = config.link_extractor()?;
        Ok(Self {
            config,
            fetcher,
            extractor,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn crawler(&self, max_depth: u32) -> Crawler {
        let crawler = Crawler::new(self.fetcher.clone(), self.extractor.clone(), max_depth);
        match self.config.max_concurrency {
            Some(limit) => crawler.with_max_concurrency(limit),
            None => crawler,
        }
    }

    /// Crawls `seed` down to `max_depth` hops.
    pub async fn sitemap(&self, seed: &str, max_depth: u32) -> Result<Option<PageNode>, CrawlError> {
        let crawler = self.crawler(max_depth);
        tracing::info!(seed, max_depth = crawler.max_depth(), "crawling");

        let tree = crawler.crawl(seed).await.map_err(|e| {
            tracing::error!(seed, status = ?e.status(), error = %e, "crawl failed");
            e
        })?;

        match &tree {
            Some(root) => tracing::info!(
                seed,
                pages = root.page_count(),
                height = root.height(),
                "crawl finished"
            ),
            None => tracing::warn!(seed, "seed page has no links, no sitemap content"),
        }

        Ok(tree)
    }
}

/// Reads a user-supplied depth limit. Only positive integers are accepted.
pub fn parse_max_depth(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|depth| *depth > 0)
}
