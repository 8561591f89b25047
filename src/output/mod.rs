//! Markdown output: link rewriting, cleanup, and persistence
//!
//! Everything that happens to a page after HTML conversion lives here:
//! internal links become `[[Title]]` cross-references, excess blank lines
//! collapse, and the result is written with a frontmatter header.

mod links;
mod markdown;

pub use links::resolve_links;
pub use markdown::{clean_markdown, sanitize_filename, write_page};
