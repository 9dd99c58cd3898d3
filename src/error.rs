// src/error.rs
// =============================================================================
// Error types for the crawler, the renderers and the configuration.
//
// A crawl can fail in five ways (bad URL, network failure, non-200 status,
// truncated body, malformed link on a page). The crawler decides what is
// fatal: a failure at the seed aborts the run, a failure in a branch only
// drops that branch.
// =============================================================================

use thiserror::Error;

/// Everything that can go wrong while fetching and parsing one page.
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The link handed to the crawler is not a valid absolute URL
    #[error("invalid url '{url}': {source}")]
    UrlParse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// DNS, connection refused, timeout...
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Anything other than HTTP 200
    #[error("status code {0}")]
    UnexpectedStatus(u16),

    /// The body stream broke before it was fully read
    #[error("reading body of {url} failed: {source}")]
    Read {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A link matched on the page could not be parsed as a URL
    #[error("malformed link '{link}': {source}")]
    Extraction {
        link: String,
        #[source]
        source: url::ParseError,
    },
}

impl CrawlError {
    /// The HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrawlError::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Failures while turning a tree into a document or writing it out.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("writing sitemap failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding sitemap as xml failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("encoding sitemap as json failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sitemap xml is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Startup configuration problems. These always terminate the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("url pattern '{pattern}' does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("url pattern '{0}' needs a capture group around the link")]
    MissingCaptureGroup(String),
}
