// src/console.rs
// =============================================================================
// Interactive mode: ask for the site, the depth and a file name, crawl, and
// write the sitemap file.
//
// Any bad answer ends the program. There is nothing to recover to in a
// one-shot prompt.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::app::{parse_max_depth, App};

pub async fn run(app: &App) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    run_with(app, input, output).await
}

pub async fn run_with<R, W>(app: &App, mut input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tracing::info!("starting console...");

    let site_url = prompt(&mut input, &mut output, "Please provide the site URL: ")
        .await
        .context("reading site URL")?;

    let raw_depth = prompt(&mut input, &mut output, "Please provide max-depth: ")
        .await
        .context("reading max-depth")?;
    let max_depth = parse_max_depth(&raw_depth).ok_or_else(|| {
        tracing::error!(max_depth = %raw_depth, "max-depth is not a positive number");
        anyhow!("max-depth must be a positive number, got '{}'", raw_depth)
    })?;

    let file_name = prompt(&mut input, &mut output, "Please provide the xml file name: ")
        .await
        .context("reading file name")?;

    let Some(root) = app.sitemap(&site_url, max_depth).await? else {
        output
            .write_all(b"No sitemap content: the site URL has no links to follow\n")
            .await?;
        output.flush().await?;
        return Ok(());
    };

    let path = app.config().file_sink().write(&root, &file_name).await?;
    tracing::info!(path = %path.display(), "sitemap file generated successfully");

    output
        .write_all(format!("Sitemap written to {}\n", path.display()).as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}

// Prints `question` and reads one line, without its line ending
async fn prompt<R, W>(input: &mut R, output: &mut W, question: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(question.as_bytes()).await?;
    output.flush().await?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Err(anyhow!("input closed before an answer was given"));
    }

    Ok(line.trim().to_string())
}
