//! Paginated index crawl
//!
//! Walks the wiki's listing pages, following the "next page" navigation
//! anchor until the site stops offering one, and accumulates every
//! page-detail link into the raw page map. Each discovered page is recorded
//! under both its decoded canonical URL and its raw absolute URL.
//!
//! A fetch failure ends pagination (logged, not fatal to the run). A hard
//! page ceiling guards against malformed self-referential pagination.

use crate::client::RetryClient;
use crate::config::Config;
use crate::crawler::pagemap::PageMap;
use crate::url::codec;
use ::url::Url;
use scraper::{ElementRef, Html, Selector};

/// Index containers tried in order; the whole document is the fallback
const INDEX_CONTAINERS: &[&str] = &["#main", "#content_block_main"];

/// Selector identifying the pagination "next" anchor
const NEXT_PAGE_SELECTOR: &str = "li.next a";

/// Ceiling on listing pages, guarding malformed pagination loops
const MAX_INDEX_PAGES: usize = 1000;

/// Crawls the paginated listing and returns the raw page map.
///
/// The map contains two entries per discovered page: the canonical decoded
/// URL and the raw absolute URL, both mapping to the anchor's visible text.
pub async fn crawl_index(client: &RetryClient, config: &Config) -> PageMap {
    let mut map = PageMap::new();
    let mut current = Some(config.list_url());
    let mut visited = 0usize;

    while let Some(url) = current.take() {
        visited += 1;
        if visited > MAX_INDEX_PAGES {
            tracing::warn!(
                "Pagination exceeded {} pages, stopping index crawl",
                MAX_INDEX_PAGES
            );
            break;
        }

        tracing::info!("Fetching listing page: {}", url);
        let body = match client.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                // Treated as end of pagination, not fatal to the run
                tracing::warn!("Listing fetch failed, stopping index crawl: {}", e);
                break;
            }
        };

        let document = Html::parse_document(&body);
        collect_page_links(&document, config, &mut map);
        current = next_page_url(&document, &url, config);
    }

    tracing::info!("Indexed {} page map entries", map.len());
    map
}

/// Extracts page-detail anchors from the listing's content region
fn collect_page_links(document: &Html, config: &Config, map: &mut PageMap) {
    let scope = index_scope(document);
    let prefix = config.detail_prefix();

    if let Ok(anchors) = Selector::parse("a[href]") {
        for element in scope.select(&anchors) {
            let title = element.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let href = match element.value().attr("href") {
                Some(href) => href,
                None => continue,
            };

            let full_url = match absolutize(href, &config.origin) {
                Some(url) => url,
                None => continue,
            };

            if !full_url.starts_with(&prefix) {
                continue;
            }

            map.insert(codec::decode(&full_url), title.clone());
            map.insert(full_url, title);
        }
    }
}

/// Picks the primary content region, falling back to the whole document
fn index_scope(document: &Html) -> ElementRef<'_> {
    for selector in INDEX_CONTAINERS {
        if let Ok(parsed) = Selector::parse(selector) {
            if let Some(element) = document.select(&parsed).next() {
                return element;
            }
        }
    }
    document.root_element()
}

/// Resolves an anchor href to an absolute URL.
///
/// Root-relative paths are prefixed with the site origin; absolute http(s)
/// URLs pass through; anything else (fragments, mailto, path-relative) is
/// dropped.
fn absolutize(href: &str, origin: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with('/') {
        Some(format!("{}{}", origin, href))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

/// Finds the next listing page, resolving relative hrefs against the
/// current listing URL
fn next_page_url(document: &Html, current_url: &str, config: &Config) -> Option<String> {
    let selector = Selector::parse(NEXT_PAGE_SELECTOR).ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with('/') {
        Some(format!("{}{}", config.origin, href))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        Url::parse(current_url)
            .ok()?
            .join(href)
            .ok()
            .map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use std::path::PathBuf;

    fn test_config() -> Config {
        Config::load(&Overrides {
            base_url: Some("https://example.com/w".to_string()),
            output_dir: Some(PathBuf::from("out")),
            delay: Some(0.0),
            timeout: Some(5),
            skip_existing: false,
            fetch_media: false,
        })
        .unwrap()
    }

    #[test]
    fn test_collect_page_links_both_spellings() {
        let config = test_config();
        let html = Html::parse_document(
            r#"<html><body><div id="main">
            <a href="/w/d/%C6%FC%CB%DC%B8%EC">日本語のページ</a>
            </div></body></html>"#,
        );

        let mut map = PageMap::new();
        collect_page_links(&html, &config, &mut map);

        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("https://example.com/w/d/%C6%FC%CB%DC%B8%EC"),
            Some("日本語のページ")
        );
        assert_eq!(
            map.get("https://example.com/w/d/日本語"),
            Some("日本語のページ")
        );
    }

    #[test]
    fn test_collect_skips_anchors_without_text() {
        let config = test_config();
        let html = Html::parse_document(
            r#"<html><body><div id="main">
            <a href="/w/d/Empty"> </a>
            <a href="/w/d/Named">Named</a>
            </div></body></html>"#,
        );

        let mut map = PageMap::new();
        collect_page_links(&html, &config, &mut map);

        assert!(map.get("https://example.com/w/d/Empty").is_none());
        assert_eq!(map.get("https://example.com/w/d/Named"), Some("Named"));
    }

    #[test]
    fn test_collect_ignores_links_outside_detail_prefix() {
        let config = test_config();
        let html = Html::parse_document(
            r#"<html><body><div id="main">
            <a href="/w/l/">List</a>
            <a href="https://other.example.com/w/d/Foo">Elsewhere</a>
            <a href="relative/d/Foo">Relative</a>
            </div></body></html>"#,
        );

        let mut map = PageMap::new();
        collect_page_links(&html, &config, &mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn test_index_scope_prefers_main_container() {
        let config = test_config();
        let html = Html::parse_document(
            r#"<html><body>
            <a href="/w/d/Outside">Outside</a>
            <div id="main"><a href="/w/d/Inside">Inside</a></div>
            </body></html>"#,
        );

        let mut map = PageMap::new();
        collect_page_links(&html, &config, &mut map);

        assert!(map.get("https://example.com/w/d/Outside").is_none());
        assert_eq!(map.get("https://example.com/w/d/Inside"), Some("Inside"));
    }

    #[test]
    fn test_index_scope_falls_back_to_document() {
        let config = test_config();
        let html = Html::parse_document(
            r#"<html><body><a href="/w/d/Foo">Foo</a></body></html>"#,
        );

        let mut map = PageMap::new();
        collect_page_links(&html, &config, &mut map);
        assert_eq!(map.get("https://example.com/w/d/Foo"), Some("Foo"));
    }

    #[test]
    fn test_next_page_url_resolution() {
        let config = test_config();

        let html = Html::parse_document(
            r#"<ul><li class="next"><a href="/w/l/?page=2">next</a></li></ul>"#,
        );
        assert_eq!(
            next_page_url(&html, "https://example.com/w/l/", &config),
            Some("https://example.com/w/l/?page=2".to_string())
        );

        let html = Html::parse_document(
            r#"<ul><li class="next"><a href="?page=3">next</a></li></ul>"#,
        );
        assert_eq!(
            next_page_url(&html, "https://example.com/w/l/", &config),
            Some("https://example.com/w/l/?page=3".to_string())
        );

        let html = Html::parse_document(r#"<ul><li class="other"><a href="/x">x</a></li></ul>"#);
        assert_eq!(next_page_url(&html, "https://example.com/w/l/", &config), None);
    }
}
