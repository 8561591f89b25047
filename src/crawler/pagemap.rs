//! Page map: decoded URL → page title
//!
//! The raw map built during the index crawl keeps both the canonical
//! decoded spelling and the raw spelling of every page URL, so that later
//! link lookups succeed regardless of which form a link happens to use.
//! [`PageMap::normalize`] collapses it to exactly one title per canonical
//! key for fetch iteration. Once the crawl phase ends, the map is read-only.

use crate::url::codec;
use std::collections::BTreeMap;

/// Mapping of page URLs (decoded and raw) to display titles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMap {
    entries: BTreeMap<String, String>,
}

impl PageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, title: impl Into<String>) {
        self.entries.insert(url.into(), title.into());
    }

    /// Looks up the title for a URL spelling
    pub fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in deterministic (sorted) key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(url, title)| (url.as_str(), title.as_str()))
    }

    /// Canonicalizes the raw map built during the index crawl.
    ///
    /// Drops keys that are not absolute http(s) URLs (stray relative or
    /// malformed entries), re-decodes every surviving key through the URL
    /// codec, and collapses duplicates last-write-wins. The result has
    /// exactly one title per canonical decoded URL.
    pub fn normalize(&self) -> PageMap {
        let mut canonical = PageMap::new();
        for (url, title) in &self.entries {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                continue;
            }
            canonical.insert(codec::decode(url), title.clone());
        }
        canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_non_absolute_keys() {
        let mut raw = PageMap::new();
        raw.insert("https://example.com/w/d/Foo", "Foo");
        raw.insert("/w/d/Bar", "Bar");
        raw.insert("d/Baz", "Baz");

        let canonical = raw.normalize();
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical.get("https://example.com/w/d/Foo"), Some("Foo"));
    }

    #[test]
    fn test_normalize_collapses_encoded_and_decoded_spellings() {
        let mut raw = PageMap::new();
        raw.insert("https://example.com/w/d/%C6%FC%CB%DC%B8%EC", "日本語のページ");
        raw.insert("https://example.com/w/d/日本語", "日本語のページ");

        let canonical = raw.normalize();
        assert_eq!(canonical.len(), 1);
        assert_eq!(
            canonical.get("https://example.com/w/d/日本語"),
            Some("日本語のページ")
        );
    }

    #[test]
    fn test_normalize_one_title_per_key() {
        let mut raw = PageMap::new();
        raw.insert("https://example.com/w/d/Foo", "Old");
        let canonical = raw.normalize();
        assert_eq!(canonical.get("https://example.com/w/d/Foo"), Some("Old"));

        let mut raw = PageMap::new();
        raw.insert("https://example.com/w/d/Foo", "Old");
        raw.insert("https://example.com/w/d/Foo", "New");
        let canonical = raw.normalize();
        assert_eq!(canonical.len(), 1);
        assert_eq!(canonical.get("https://example.com/w/d/Foo"), Some("New"));
    }
}
