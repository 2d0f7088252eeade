//! Byte order marks at the start of manifest and course files.

/// Unicode encodings announced by a byte order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomKind {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

/// Marks in detection order. UTF-32 LE must precede UTF-16 LE, whose mark is
/// a prefix of it.
const MARKS: [(BomKind, &[u8]); 5] = [
    (BomKind::Utf32Be, &[0x00, 0x00, 0xFE, 0xFF]),
    (BomKind::Utf32Le, &[0xFF, 0xFE, 0x00, 0x00]),
    (BomKind::Utf8, &[0xEF, 0xBB, 0xBF]),
    (BomKind::Utf16Be, &[0xFE, 0xFF]),
    (BomKind::Utf16Le, &[0xFF, 0xFE]),
];

impl BomKind {
    /// The mark itself.
    pub fn as_bytes(&self) -> &'static [u8] {
        MARKS
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or(&[][..], |(_, mark)| *mark)
    }

    /// Length of the mark in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }
}

/// The byte order mark `bytes` starts with, if any.
pub fn detect_bom(bytes: &[u8]) -> Option<BomKind> {
    MARKS
        .iter()
        .find(|(_, mark)| bytes.starts_with(*mark))
        .map(|(kind, _)| *kind)
}
