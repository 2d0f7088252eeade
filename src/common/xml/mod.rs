//! XML reading shared by the SCORM, cmi5 and LOM decoders.

pub mod document;
pub mod element;
pub mod escape;

pub use document::XmlDocument;
pub use element::{XmlAttribute, XmlElement, XmlError, parse_document};
pub use escape::{resolve_entity, unescape_xml};

/// Parse a boolean attribute the way XML Schema `xs:boolean` does.
///
/// Returns `None` for anything other than `true`, `false`, `1` or `0`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
