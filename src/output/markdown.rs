//! Markdown cleanup and file persistence

use regex::Regex;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

/// Three or more consecutive newlines, i.e. two or more blank lines
static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("EXCESS_BLANK_LINES: hardcoded regex is valid"));

/// Characters that are illegal or hazardous in filenames
const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Longest filename stem written, in characters
const MAX_FILENAME_CHARS: usize = 100;

/// Collapses runs of blank lines to a single blank line and trims
/// surrounding whitespace
pub fn clean_markdown(text: &str) -> String {
    EXCESS_BLANK_LINES
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}

/// Makes a page title safe to use as a filename.
///
/// Illegal characters become `_`, embedded newlines are dropped, and the
/// result is trimmed and truncated to 100 characters.
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    replaced.trim().chars().take(MAX_FILENAME_CHARS).collect()
}

/// Writes one page file: a frontmatter block with the fetch URL and title,
/// a blank line, then the markdown body
pub fn write_page(path: &Path, url: &str, title: &str, body: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    write!(file, "---\nurl: {}\ntitle: {}\n---\n\n{}", url, title, body)?;
    Ok(())
}
