// src/render/mod.rs
// =============================================================================
// This module turns a finished tree into a document and puts it somewhere.
//
// Two formats:
// - xml (default): the nested <node>/<url>/<nodes> sitemap document
// - json: the same tree, pretty-printed with serde_json
//
// Two sinks:
// - FileSink writes the document under the output directory
// - the HTTP handler sends the rendered string as the response body
//
// Any failure here is fatal for the run that produced the tree.
// =============================================================================

mod xml;

use clap::ValueEnum;
use std::path::PathBuf;

use crate::crawl::PageNode;
use crate::error::RenderError;

pub use xml::render_xml;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl OutputFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Xml => "application/xml",
            OutputFormat::Json => "application/json",
        }
    }

    pub fn render(self, root: &PageNode) -> Result<String, RenderError> {
        match self {
            OutputFormat::Xml => render_xml(root),
            OutputFormat::Json => render_json(root),
        }
    }
}

pub fn render_json(root: &PageNode) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(root)?)
}

/// Fills the first `%s` of `template` with `name`.
///
/// A template without `%s` is used as a suffix, so "sitemap.xml" and "home"
/// give "homesitemap.xml".
pub fn file_name(template: &str, name: &str) -> String {
    if template.contains("%s") {
        template.replacen("%s", name, 1)
    } else {
        format!("{}{}", name, template)
    }
}

/// Writes rendered sitemaps to `<output_dir>/<template with name>`.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    file_template: String,
    format: OutputFormat,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>, file_template: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_template: file_template.into(),
            format,
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(file_name(&self.file_template, name))
    }

    /// Renders `root` and writes it out, creating the output directory if needed.
    pub async fn write(&self, root: &PageNode, name: &str) -> Result<PathBuf, RenderError> {
        tracing::info!("generating sitemap from nodes...");

        let document = self.format.render(root)?;
        let path = self.path_for(name);

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, document).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "could not write sitemap file");
            e
        })?;

        Ok(path)
    }
}
