//! Character encoding detection and decoding for manifest files.
//!
//! Manifests arrive as raw bytes from a [`FileAccess`](crate::access::FileAccess)
//! backend. Before any XML or delimited-text parsing happens they are turned
//! into UTF-8 text using, in order:
//!
//! 1. a byte order mark (UTF-8, UTF-16 LE/BE, UTF-32 LE/BE);
//! 2. the byte pattern of an unmarked UTF-16/UTF-32 `<?xml` prolog;
//! 3. the `encoding="..."` attribute of the XML declaration;
//! 4. UTF-8.
//!
//! When step 4 fails and the legacy fallback is enabled, the bytes are decoded
//! as Windows-1252. Authoring tools that write Windows-1252 smart quotes under
//! a UTF-8 declaration produce such files. The fallback is reported through
//! [`TextEncoding::Windows1252Fallback`] and a `tracing` warning so callers can
//! tell it apart from a clean decode.

use crate::common::bom::{BomKind, detect_bom};
use crate::common::error::{ParseError, ParseResult};
use encoding_rs::Encoding;
use memchr::memmem;
use std::borrow::Cow;

/// How many leading bytes are searched for an XML declaration.
const DECLARATION_SNIFF_LEN: usize = 1024;

/// The encoding a text was decoded with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    /// UTF-8, with or without BOM
    Utf8,
    /// UTF-16 little-endian
    Utf16Le,
    /// UTF-16 big-endian
    Utf16Be,
    /// UTF-32 little-endian
    Utf32Le,
    /// UTF-32 big-endian
    Utf32Be,
    /// A legacy encoding named by the XML declaration
    Declared(&'static Encoding),
    /// UTF-8 failed and the bytes were read as Windows-1252
    Windows1252Fallback,
}

impl TextEncoding {
    /// Encoding name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf32Le => "UTF-32LE",
            TextEncoding::Utf32Be => "UTF-32BE",
            TextEncoding::Declared(encoding) => encoding.name(),
            TextEncoding::Windows1252Fallback => "windows-1252",
        }
    }
}

/// Decoded text together with the encoding that produced it.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl DecodedText {
    /// Whether the Windows-1252 compatibility fallback was used.
    #[inline]
    pub fn used_fallback(&self) -> bool {
        self.encoding == TextEncoding::Windows1252Fallback
    }
}

/// Decode the bytes of an XML document.
///
/// `path` is only used for error messages and diagnostics.
pub fn decode_xml(bytes: &[u8], path: &str, allow_fallback: bool) -> ParseResult<DecodedText> {
    if let Some(bom) = detect_bom(bytes) {
        return decode_with_bom(bytes, bom, path);
    }

    if let Some(kind) = sniff_unmarked_wide_prolog(bytes) {
        return decode_with_bom_kind_no_mark(bytes, kind, path);
    }

    if let Some(label) = sniff_declared_encoding(bytes)
        && let Some(encoding) = Encoding::for_label(label.as_bytes())
        && encoding != encoding_rs::UTF_8
        && encoding != encoding_rs::UTF_16LE
        && encoding != encoding_rs::UTF_16BE
    {
        // UTF-16 declared over ASCII-compatible bytes is a lie; the UTF-8 path handles it.
        return match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => Ok(DecodedText {
                text: text.into_owned(),
                encoding: TextEncoding::Declared(encoding),
            }),
            None => Err(ParseError::Encoding {
                path: path.to_string(),
                message: format!("content is not valid {}", encoding.name()),
            }),
        };
    }

    decode_utf8_or_fallback(bytes, path, allow_fallback)
}

/// Decode the bytes of a plain text file (AICC course files).
///
/// Same as [`decode_xml`] without the XML declaration sniffing.
pub fn decode_text(bytes: &[u8], path: &str, allow_fallback: bool) -> ParseResult<DecodedText> {
    if let Some(bom) = detect_bom(bytes) {
        return decode_with_bom(bytes, bom, path);
    }
    decode_utf8_or_fallback(bytes, path, allow_fallback)
}

/// Decode bytes as Windows-1252.
///
/// Windows-1252 maps every byte, so this never fails. It is the isolated
/// compatibility path used when UTF-8 decoding of legacy content fails.
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

fn decode_utf8_or_fallback(
    bytes: &[u8],
    path: &str,
    allow_fallback: bool,
) -> ParseResult<DecodedText> {
    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes)
    {
        return Ok(DecodedText {
            text: text.into_owned(),
            encoding: TextEncoding::Utf8,
        });
    }

    if !allow_fallback {
        return Err(ParseError::Encoding {
            path: path.to_string(),
            message: "content is not valid UTF-8".to_string(),
        });
    }

    tracing::warn!(
        path,
        "content is not valid UTF-8, decoding as windows-1252"
    );
    Ok(DecodedText {
        text: decode_windows_1252(bytes),
        encoding: TextEncoding::Windows1252Fallback,
    })
}

fn decode_with_bom(bytes: &[u8], bom: BomKind, path: &str) -> ParseResult<DecodedText> {
    decode_with_bom_kind_no_mark(&bytes[bom.len()..], bom, path)
}

fn decode_with_bom_kind_no_mark(
    payload: &[u8],
    kind: BomKind,
    path: &str,
) -> ParseResult<DecodedText> {
    let (text, encoding): (Option<Cow<'_, str>>, TextEncoding) = match kind {
        BomKind::Utf8 => (
            encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(payload),
            TextEncoding::Utf8,
        ),
        BomKind::Utf16Le => (
            encoding_rs::UTF_16LE.decode_without_bom_handling_and_without_replacement(payload),
            TextEncoding::Utf16Le,
        ),
        BomKind::Utf16Be => (
            encoding_rs::UTF_16BE.decode_without_bom_handling_and_without_replacement(payload),
            TextEncoding::Utf16Be,
        ),
        BomKind::Utf32Le => (
            decode_utf32(payload, false).map(Cow::Owned),
            TextEncoding::Utf32Le,
        ),
        BomKind::Utf32Be => (
            decode_utf32(payload, true).map(Cow::Owned),
            TextEncoding::Utf32Be,
        ),
    };

    match text {
        Some(text) => Ok(DecodedText {
            text: text.into_owned(),
            encoding,
        }),
        None => Err(ParseError::Encoding {
            path: path.to_string(),
            message: format!("content is not valid {}", encoding.name()),
        }),
    }
}

/// Decode UTF-32 code units, rejecting truncated input and invalid scalars.
fn decode_utf32(bytes: &[u8], big_endian: bool) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let unit = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let value = if big_endian {
                u32::from_be_bytes(unit)
            } else {
                u32::from_le_bytes(unit)
            };
            char::from_u32(value)
        })
        .collect()
}

/// Whether `bytes` are UTF-16 or UTF-32, announced by a byte order mark or
/// by the byte pattern of an XML prolog. ASCII byte searches miss such text.
pub fn is_wide_unicode(bytes: &[u8]) -> bool {
    match detect_bom(bytes) {
        Some(BomKind::Utf8) => false,
        Some(_) => true,
        None => sniff_unmarked_wide_prolog(bytes).is_some(),
    }
}

/// Recognise `<?` encoded as UTF-16 or UTF-32 without a byte order mark.
fn sniff_unmarked_wide_prolog(bytes: &[u8]) -> Option<BomKind> {
    const UTF32_BE: [u8; 8] = [0, 0, 0, b'<', 0, 0, 0, b'?'];
    const UTF32_LE: [u8; 8] = [b'<', 0, 0, 0, b'?', 0, 0, 0];
    const UTF16_BE: [u8; 4] = [0, b'<', 0, b'?'];
    const UTF16_LE: [u8; 4] = [b'<', 0, b'?', 0];

    if bytes.starts_with(&UTF32_BE) {
        Some(BomKind::Utf32Be)
    } else if bytes.starts_with(&UTF32_LE) {
        Some(BomKind::Utf32Le)
    } else if bytes.starts_with(&UTF16_BE) {
        Some(BomKind::Utf16Be)
    } else if bytes.starts_with(&UTF16_LE) {
        Some(BomKind::Utf16Le)
    } else {
        None
    }
}

/// Extract the `encoding` pseudo-attribute of a leading XML declaration.
pub fn sniff_declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(DECLARATION_SNIFF_LEN)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let end = memmem::find(head, b"?>")?;
    let declaration = &head[..end];
    let attr = memmem::find(declaration, b"encoding")?;
    let rest = &declaration[attr + b"encoding".len()..];

    let mut iter = rest.iter().copied().skip_while(|b| b.is_ascii_whitespace());
    if iter.next()? != b'=' {
        return None;
    }
    let mut iter = iter.skip_while(|b| b.is_ascii_whitespace());
    let quote = iter.next()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let label: Vec<u8> = iter.take_while(|&b| b != quote).collect();
    String::from_utf8(label).ok().map(|label| label.trim().to_string())
}
