//! Whole XML files: decoding plus tree building.

use super::element::{XmlElement, parse_document};
use crate::access::FileAccess;
use crate::common::encoding::{TextEncoding, decode_xml};
use crate::common::error::ParseResult;
use crate::common::options::ParseOptions;
use crate::common::source::read_source;

/// A decoded and parsed XML file.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Path of the file inside the package
    pub path: String,
    pub root: XmlElement,
    /// Encoding the bytes were decoded with
    pub encoding: TextEncoding,
}

impl XmlDocument {
    /// Decode and parse raw bytes.
    pub fn parse(bytes: &[u8], path: &str, options: &ParseOptions) -> ParseResult<Self> {
        let decoded = decode_xml(bytes, path, options.legacy_encoding_fallback)?;
        let root = parse_document(&decoded.text).map_err(|e| e.into_parse_error(path))?;
        Ok(Self {
            path: path.to_string(),
            root,
            encoding: decoded.encoding,
        })
    }

    /// Read, decode and parse a file of the package.
    pub fn load(access: &dyn FileAccess, path: &str, options: &ParseOptions) -> ParseResult<Self> {
        let bytes = read_source(access, path, options)?;
        tracing::trace!(path, size = bytes.len(), "parsing XML file");
        Self::parse(&bytes, path, options)
    }

    /// Whether the Windows-1252 compatibility fallback was used.
    pub fn used_fallback(&self) -> bool {
        self.encoding == TextEncoding::Windows1252Fallback
    }
}
