//! Legacy EUC-JP URL codec
//!
//! Page-detail URLs on the wiki are built by percent-escaping the EUC-JP
//! bytes of the page title, not its UTF-8 bytes. Decoding therefore has to
//! percent-unescape into raw octets first and only then interpret those
//! octets as EUC-JP. Both directions fall back to plain UTF-8 percent
//! coding when the legacy encoding cannot represent the input, so neither
//! function can fail.
//!
//! The round trip `decode(encode(title)) == title` holds for every title
//! representable in EUC-JP, and via the UTF-8 fallback for everything else.
//! That property is what makes differently-spelled references to the same
//! page collide on one canonical key.

use encoding_rs::EUC_JP;
use percent_encoding::{
    percent_decode_str, percent_encode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC,
};

/// Characters escaped when building a page path segment.
///
/// Everything except ASCII alphanumerics, `_ . - ~`, and a literal `/` —
/// wiki paths may contain meaningful slashes, so `/` stays unescaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Decodes a wiki URL (or path segment) to its canonical human-readable form.
///
/// Percent-escapes are unescaped into raw octets with no charset
/// interpretation, then the octet sequence is decoded as EUC-JP. If the
/// input contains characters that cannot be treated as octets, or the
/// octets are not valid EUC-JP, falls back to standard lossy UTF-8
/// percent-decoding of the original input.
///
/// Never panics and always returns some string.
pub fn decode(url: &str) -> String {
    if let Some(bytes) = unescape_octets(url) {
        if let Some(text) = EUC_JP.decode_without_bom_handling_and_without_replacement(&bytes) {
            return text.into_owned();
        }
    }

    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

/// Encodes a page title into the wiki's percent-escaped EUC-JP path segment.
///
/// The input may itself already carry percent-escapes (links copied out of
/// the site do), so it is fully percent-decoded as UTF-8 first to recover
/// the literal title text. Titles with characters outside EUC-JP fall back
/// to plain UTF-8 percent-escaping of the original input.
pub fn encode(title: &str) -> String {
    let text = percent_decode_str(title).decode_utf8_lossy();

    let (bytes, _, had_errors) = EUC_JP.encode(&text);
    if had_errors {
        return utf8_percent_encode(title, PATH_SEGMENT).to_string();
    }

    percent_encode(&bytes, PATH_SEGMENT).to_string()
}

/// Percent-unescapes `input` into raw octets without charset interpretation.
///
/// Characters above U+00FF cannot be treated as single octets; for such
/// input the byte-oriented reading is meaningless and `None` is returned.
/// Malformed escapes (a `%` not followed by two hex digits) are kept as a
/// literal `%` byte, matching lenient unescaping elsewhere.
fn unescape_octets(input: &str) -> Option<Vec<u8>> {
    let chars: Vec<char> = input.chars().collect();
    let mut bytes = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '%' {
            let high = chars.get(i + 1).and_then(|c| c.to_digit(16));
            let low = chars.get(i + 2).and_then(|c| c.to_digit(16));
            if let (Some(high), Some(low)) = (high, low) {
                bytes.push((high * 16 + low) as u8);
                i += 3;
                continue;
            }
        }

        let code = chars[i] as u32;
        if code > 0xFF {
            return None;
        }
        bytes.push(code as u8);
        i += 1;
    }

    Some(bytes)
}
