//! Internal link resolution
//!
//! Rewrites inline markdown links that target known wiki pages into the
//! note-taking cross-reference notation: `[[Title]]` when the link text is
//! the title itself, `[[Title|text]]` otherwise. Links to unknown targets
//! are preserved verbatim.
//!
//! This is a pure, order-preserving, single-pass text transform. Lookup
//! uses the decoded canonical key first and the raw absolute URL as a
//! fallback, so it does not matter which spelling a page body happens to
//! use — both forms are in the raw page map.

use crate::crawler::PageMap;
use crate::url::codec;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Inline markdown link occurrence: `[text](target)`
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("LINK_RE: hardcoded regex is valid")
});

/// Rewrites internal links in `markdown` against the page map.
///
/// Relative targets are resolved against the site origin before lookup.
pub fn resolve_links(markdown: &str, page_map: &PageMap, origin: &str) -> String {
    LINK_RE
        .replace_all(markdown, |caps: &Captures| {
            let text = &caps[1];
            let target = &caps[2];

            let target_url = if target.starts_with('/') {
                format!("{}{}", origin, target)
            } else {
                target.to_string()
            };

            let decoded = codec::decode(&target_url);
            let title = page_map
                .get(&decoded)
                .or_else(|| page_map.get(&target_url));

            match title {
                Some(title) if text == title => format!("[[{}]]", title),
                Some(title) => format!("[[{}|{}]]", title, text),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
