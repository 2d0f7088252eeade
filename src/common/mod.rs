//! Common types, traits, and utilities shared across packaging standards.
//!
//! This module provides the error types, text decoding, XML reading and
//! duration parsing used by every manifest parser, ensuring consistent
//! behaviour between SCORM, AICC and cmi5 packages.

// Submodule declarations
pub mod bom;
pub mod detection;
pub mod duration;
pub mod encoding;
pub mod error;
pub mod options;
pub mod source;
pub mod xml;

// Re-exports for convenience
pub use bom::{BomKind, detect_bom};
pub use detection::{ModuleType, ModuleTypeDetector};
pub use encoding::{DecodedText, TextEncoding, decode_text, decode_xml};
pub use error::{AccessError, DetectionError, Error, ParseError, Result};
pub use options::ParseOptions;
pub use source::read_source;

/// Returns `true` when the value is absent or only whitespace.
#[inline]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
