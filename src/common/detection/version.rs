//! SCORM 1.2 / SCORM 2004 disambiguation.
//!
//! Both versions use `imsmanifest.xml`. Telling them apart does not need a
//! full parse: a SCORM 2004 manifest either binds the `adlcp_v1p3` schema
//! namespace or declares a `<schemaversion>` starting with `2004`. Anything
//! else is treated as SCORM 1.2.
//!
//! UTF-16 and UTF-32 manifests are decoded before the search; everything
//! else is searched as raw bytes.

use super::types::ModuleType;
use crate::common::encoding::{decode_xml, is_wide_unicode};
use memchr::memmem;
use std::borrow::Cow;

/// Namespace fragment of the SCORM 2004 ADL content packaging schema.
pub const SCORM_2004_NAMESPACE_MARKER: &[u8] = b"adlcp_v1p3";

const SCHEMA_VERSION_TAG: &[u8] = b"schemaversion>";

/// Longest namespace prefix looked at in front of `schemaversion>`.
const MAX_PREFIX_LEN: usize = 64;

/// Determine the SCORM version of raw manifest bytes.
///
/// # Examples
///
/// ```
/// use elearning_module_parser::detection::{ModuleType, detect_scorm_version};
///
/// let manifest = br#"<manifest><metadata><schemaversion>2004 4th Edition</schemaversion></metadata></manifest>"#;
/// assert_eq!(detect_scorm_version(manifest), ModuleType::Scorm2004);
/// assert_eq!(detect_scorm_version(b"<manifest/>"), ModuleType::Scorm12);
/// ```
pub fn detect_scorm_version(bytes: &[u8]) -> ModuleType {
    let decoded = searchable(bytes);
    let bytes = &*decoded;
    if memmem::find(bytes, SCORM_2004_NAMESPACE_MARKER).is_some() {
        return ModuleType::Scorm2004;
    }
    if schema_versions(bytes).any(|v| v.starts_with(b"2004")) {
        return ModuleType::Scorm2004;
    }
    ModuleType::Scorm12
}

fn searchable(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !is_wide_unicode(bytes) {
        return Cow::Borrowed(bytes);
    }
    match decode_xml(bytes, "imsmanifest.xml", false) {
        Ok(decoded) => Cow::Owned(decoded.text.into_bytes()),
        Err(e) => {
            tracing::debug!(error = %e, "could not decode wide manifest for version detection");
            Cow::Borrowed(bytes)
        },
    }
}

/// Trimmed contents of every `<schemaversion>` element (any prefix).
fn schema_versions(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    memmem::find_iter(bytes, SCHEMA_VERSION_TAG).filter_map(move |pos| {
        // Skip closing tags: the byte before the (optional) prefix must be '<'.
        let before = &bytes[pos.saturating_sub(MAX_PREFIX_LEN + 1)..pos];
        let tag_start = before.iter().rposition(|&b| b == b'<')?;
        let between = &before[tag_start + 1..];
        if between.first() == Some(&b'/') || !between.iter().all(|&b| b.is_ascii_alphanumeric() || b == b':' || b == b'_' || b == b'-') {
            return None;
        }
        let value_start = pos + SCHEMA_VERSION_TAG.len();
        let value_len = memchr::memchr(b'<', &bytes[value_start..])?;
        Some(bytes[value_start..value_start + value_len].trim_ascii())
    })
}
