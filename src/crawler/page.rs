//! Page fetch and persistence
//!
//! Processes one indexed page end to end: reconstructs the canonical detail
//! URL from the title via the legacy codec, fetches the HTML, extracts the
//! content container, converts it to markdown (dropping non-content
//! markup), rewrites internal links against the page map, cleans up
//! whitespace, and writes the file with frontmatter.
//!
//! Every failure here is per-page: it is logged with the title and URL and
//! reported as [`SaveOutcome::Failed`] so the run continues.

use crate::client::RetryClient;
use crate::config::Config;
use crate::crawler::media;
use crate::crawler::pagemap::PageMap;
use crate::output::{clean_markdown, resolve_links, sanitize_filename, write_page};
use crate::url::codec;
use crate::{Result, WikivaultError};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

/// Content containers tried in order, first match wins
const CONTENT_CONTAINERS: &[&str] = &["div.user-area", "#page-body", "#content_block_main"];

/// Non-content elements dropped before conversion
const STRIP_TAGS: &[&str] = &["script", "style", "iframe", "form", "input", "button"];

/// Image references whose targets feed the media fetcher
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").expect("IMAGE_RE: hardcoded regex is valid")
});

/// Outcome of processing one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Markdown file written
    Written,
    /// Output file already existed and skip-existing mode is on
    Skipped,
    /// Fetch, extraction, or write failed; the run continues
    Failed,
}

/// Fetches one page by title and persists it as markdown.
///
/// In skip-existing mode an already-present output file short-circuits
/// before any network call.
pub async fn fetch_and_save(
    client: &RetryClient,
    title: &str,
    config: &Config,
    page_map: &PageMap,
) -> SaveOutcome {
    let filename = format!("{}.md", sanitize_filename(title));
    let path = config.output_dir.join(&filename);

    if config.skip_existing && path.exists() {
        tracing::info!("Skipping existing file: {}", title);
        return SaveOutcome::Skipped;
    }

    match save_page(client, title, &path, config, page_map).await {
        Ok(()) => SaveOutcome::Written,
        Err(e) => {
            tracing::warn!("Failed to save '{}': {}", title, e);
            SaveOutcome::Failed
        }
    }
}

async fn save_page(
    client: &RetryClient,
    title: &str,
    path: &Path,
    config: &Config,
    page_map: &PageMap,
) -> Result<()> {
    // Reconstruct the canonical fetch URL from the title; index URLs may
    // carry mixed encodings, the codec round-trip does not
    let target_url = config.detail_url(&codec::encode(title));
    tracing::info!("Downloading: {} ({})", title, target_url);

    let body = client.get_text(&target_url).await?;

    let content_html = extract_content(&body).ok_or_else(|| WikivaultError::ContentNotFound {
        url: target_url.clone(),
    })?;

    let markdown = convert_to_markdown(&content_html).map_err(|e| WikivaultError::Convert {
        url: target_url.clone(),
        message: e.to_string(),
    })?;
    let markdown = resolve_links(&markdown, page_map, &config.origin);
    let markdown = clean_markdown(&markdown);

    if config.fetch_media {
        fetch_referenced_media(client, &markdown, config).await;
    }

    write_page(path, &target_url, title, &markdown)?;
    Ok(())
}

/// Selects the page's content container and returns its outer HTML
fn extract_content(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    for selector in CONTENT_CONTAINERS {
        if let Ok(parsed) = Selector::parse(selector) {
            if let Some(element) = document.select(&parsed).next() {
                return Some(element.html());
            }
        }
    }

    None
}

/// Converts a content fragment to ATX-headed markdown, dropping
/// scripts, styles, frames, and form controls
fn convert_to_markdown(html: &str) -> std::io::Result<String> {
    HtmlToMarkdown::builder()
        .skip_tags(STRIP_TAGS.to_vec())
        .build()
        .convert(html)
}

/// Downloads every image referenced by the converted markdown.
///
/// Media failures are logged inside the fetcher and never fail the page.
async fn fetch_referenced_media(client: &RetryClient, markdown: &str, config: &Config) {
    let media_dir = config.media_dir();

    for captures in IMAGE_RE.captures_iter(markdown) {
        let target = captures[1].trim();
        let url = if target.starts_with('/') {
            format!("{}{}", config.origin, target)
        } else if target.starts_with("http") {
            target.to_string()
        } else {
            continue;
        };

        let _ = media::fetch_media(client, &url, &media_dir).await;
    }
}
