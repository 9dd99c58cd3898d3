// src/page/links.rs
// =============================================================================
// This module extracts outbound links from a page's markup.
//
// Instead of parsing a DOM we scan the raw markup with a regular expression
// taken from configuration. Capture group 1 of every match is the link.
// This keeps the extractor usable for templated or non-HTML anchor syntaxes.
//
// For each match:
// - an empty path (a bare "#anchor", "?query" or mailto:-style link) is skipped
// - a relative link is rebuilt on the page's scheme and host
// - an absolute link is kept as it is
// - duplicates on the same page are dropped, first occurrence wins
//
// A link that does not parse fails the whole page. A page with one broken
// anchor yields no links at all rather than a partial set.
// =============================================================================

use regex::Regex;
use std::collections::HashSet;
use url::Url;

use crate::error::{ConfigError, CrawlError};

/// The unique absolute links found on one page, in discovery order.
///
/// Deduplication only ever covers a single page; the same URL can appear
/// in the link sets of many pages.
pub type LinkSet = Vec<String>;

/// Default href pattern: lazily match up to the first `href="..."` of an anchor.
pub const DEFAULT_URL_PATTERN: &str = r#"<a.*?href="(.*?)""#;

#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    /// Compiles `pattern`. It must have a capture group around the link.
    pub fn from_pattern(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len() counts the implicit whole-match group too
        if regex.captures_len() < 2 {
            return Err(ConfigError::MissingCaptureGroup(pattern.to_string()));
        }

        Ok(Self { pattern: regex })
    }

    /// Finds every link in `markup`, resolved against the page at `base`.
    pub fn extract(&self, base: &Url, markup: &str) -> Result<LinkSet, CrawlError> {
        let mut seen = HashSet::new();
        let mut links = LinkSet::new();

        for captures in self.pattern.captures_iter(markup) {
            let Some(raw) = captures.get(1).map(|m| m.as_str()) else {
                continue;
            };

            if let Some(link) = resolve_link(base, raw)? {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_URL_PATTERN).expect("default url pattern compiles"),
        }
    }
}

// Turns one raw match into an absolute link
//
// Returns:
//   Ok(Some(link)) - a navigable link
//   Ok(None)       - nothing to follow (empty path)
//   Err(..)        - the match is not a URL
fn resolve_link(base: &Url, raw: &str) -> Result<Option<String>, CrawlError> {
    match Url::parse(raw) {
        Ok(url) => {
            // mailto:, javascript:, data: have no hierarchical path
            if url.cannot_be_a_base() || absolute_path(raw).is_empty() {
                return Ok(None);
            }
            Ok(Some(url.into()))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            if path_only(raw).is_empty() {
                return Ok(None);
            }

            let joined = format!(
                "{}://{}/{}",
                base.scheme(),
                host_with_port(base),
                raw.trim_start_matches('/')
            );

            Url::parse(&joined)
                .map(|url| Some(url.into()))
                .map_err(|source| CrawlError::Extraction {
                    link: raw.to_string(),
                    source,
                })
        }
        Err(source) => Err(CrawlError::Extraction {
            link: raw.to_string(),
            source,
        }),
    }
}

// The path of an absolute link as written, e.g. "" for "https://example.com"
// (the url crate would report "/" there)
fn absolute_path(raw: &str) -> &str {
    let after_scheme = raw.split_once("//").map(|(_, rest)| rest).unwrap_or(raw);
    match after_scheme.find(['/', '?', '#']) {
        Some(index) => path_only(&after_scheme[index..]),
        None => "",
    }
}

fn path_only(reference: &str) -> &str {
    reference.split(['?', '#']).next().unwrap_or("")
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
