// src/cli.rs
// =============================================================================
// This file defines the configuration surface using the `clap` crate.
//
// Every option is a long flag that can also come from an environment
// variable, so the same binary can be driven from a shell or from a
// container's environment:
//
//   EXECUTION_MODE=server HTTP_PORT=9000 sitemap-tree
//   sitemap-tree --mode console --output-dir ./maps
//
// Invalid values stop the program before anything starts.
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::page::{LinkExtractor, DEFAULT_URL_PATTERN};
use crate::render::{self, FileSink, OutputFormat};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sitemap-tree",
    version,
    about = "Crawl a website and write its page graph as a sitemap tree",
    long_about = "sitemap-tree follows the links of a website from a seed URL, up to a maximum depth, \
                  and writes the pages it found as a nested XML (or JSON) sitemap. It runs either as \
                  an interactive console prompt or as an HTTP server."
)]
pub struct Config {
    /// Interactive console prompt or HTTP server
    #[arg(long, env = "EXECUTION_MODE", value_enum, default_value_t = Mode::Console)]
    pub mode: Mode,

    /// Application name attached to every log line
    #[arg(long, env = "APP_NAME", default_value = "Sitemaps")]
    pub app_name: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "HTTP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Regular expression finding links in page markup; group 1 is the link
    #[arg(long, env = "URL_REG_EXPR", default_value = DEFAULT_URL_PATTERN)]
    pub url_pattern: String,

    /// Directory sitemap files are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// File name template; %s is replaced by the requested name
    #[arg(long, env = "OUTPUT_FILE", default_value = "%s.xml")]
    pub output_file: String,

    /// Document format of the sitemap
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,

    /// Seconds before a single page fetch is abandoned
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Maximum number of pages fetched at the same time (unlimited if unset)
    #[arg(long, env = "MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Ask for URL, depth and file name on the terminal
    #[value(alias = "1")]
    Console,
    /// Serve sitemaps over HTTP
    #[value(alias = "2")]
    Server,
}

impl Config {
    /// Compiles the configured href pattern.
    pub fn link_extractor(&self) -> Result<LinkExtractor, ConfigError> {
        LinkExtractor::from_pattern(&self.url_pattern)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn file_sink(&self) -> FileSink {
        FileSink::new(&self.output_dir, &self.output_file, self.format)
    }

    /// Bare file name for `name`, used when the sitemap is not written to disk.
    pub fn output_file_name(&self, name: &str) -> String {
        render::file_name(&self.output_file, name)
    }
}
