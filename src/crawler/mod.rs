//! Crawl pipeline
//!
//! This module contains the crawl logic:
//! - Paginated index discovery building the page map
//! - Page map normalization
//! - Per-page fetch, conversion, and persistence
//! - Opportunistic media downloads
//!
//! Execution is strictly sequential: the index crawl runs to completion
//! before any page fetch starts (link resolution must see all pages), and
//! page fetches are throttled one at a time by the caller.

mod index;
mod media;
mod page;
mod pagemap;

pub use index::crawl_index;
pub use media::fetch_media;
pub use page::{fetch_and_save, SaveOutcome};
pub use pagemap::PageMap;
