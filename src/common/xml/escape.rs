//! Entity handling for manifest XML.
//!
//! Only the five predefined XML entities and numeric character references are
//! ever expanded. Entities declared in a DOCTYPE internal subset, and external
//! entities, are never resolved: the reference text is kept literally. This
//! closes XXE and entity-expansion attacks regardless of what the manifest
//! declares.

use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Patterns and replacements are index-aligned.
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("predefined entity patterns are valid")
});

/// Resolve the name of a general entity reference (`amp`, `#169`, `#xA9`).
///
/// Returns `None` for anything that is not predefined or a valid character
/// reference.
pub fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let reference = name.strip_prefix('#')?;
            let code = match reference.strip_prefix('x').or_else(|| reference.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => reference.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        },
    }
}

/// Unescape XML special characters in attribute values and text.
///
/// Replaces the five standard XML entities and numeric character references.
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use elearning_module_parser::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&#169; &#xA9;"), "\u{a9} \u{a9}");
/// assert_eq!(unescape_xml("&xxe;"), "&xxe;"); // never expanded
/// assert_eq!(unescape_xml("&amp"), "&amp"); // incomplete, no semicolon
/// ```
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let named = XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"]);
    if !s.contains("&#") {
        return named;
    }
    // Character references are resolved on the original text so that
    // "&amp;#65;" stays "&#65;" instead of becoming "A".
    unescape_with_char_refs(s)
}

fn unescape_with_char_refs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        match candidate.find(';') {
            Some(end) if end > 0 => match resolve_entity(&candidate[..end]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &candidate[end + 1..];
                },
                None => {
                    out.push('&');
                    rest = candidate;
                },
            },
            _ => {
                out.push('&');
                rest = candidate;
            },
        }
    }
    out.push_str(rest);
    out
}
