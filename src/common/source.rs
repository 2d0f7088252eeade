//! Reading manifest files through a [`FileAccess`] backend.

use super::error::{ParseError, ParseResult};
use super::options::ParseOptions;
use crate::access::FileAccess;

/// Read `path` in full, enforcing [`ParseOptions::max_manifest_size`].
///
/// Access faults are wrapped with the path and the failing operation.
pub fn read_source(access: &dyn FileAccess, path: &str, options: &ParseOptions) -> ParseResult<Vec<u8>> {
    let size = access
        .file_size(path)
        .map_err(|e| ParseError::read(path, e))?;
    if size > options.max_manifest_size {
        return Err(ParseError::TooLarge {
            path: path.to_string(),
            size,
            limit: options.max_manifest_size,
        });
    }
    access.read_file(path).map_err(|e| ParseError::read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::common::error::AccessError;

    #[test]
    fn test_size_limit() {
        let access = InMemoryFileAccess::new("mem").with_file("big.xml", vec![b'x'; 64]);
        let options = ParseOptions::default().with_max_manifest_size(16);
        let err = read_source(&access, "big.xml", &options).unwrap_err();
        assert!(matches!(err, ParseError::TooLarge { size: 64, limit: 16, .. }));
        assert_eq!(read_source(&access, "big.xml", &ParseOptions::default()).unwrap().len(), 64);
    }

    #[test]
    fn test_missing_file_keeps_context() {
        let access = InMemoryFileAccess::new("mem");
        let err = read_source(&access, "cmi5.xml", &ParseOptions::default()).unwrap_err();
        match err {
            ParseError::Access { path, operation, source } => {
                assert_eq!(path, "cmi5.xml");
                assert_eq!(operation, "read");
                assert!(matches!(source, AccessError::NotFound { .. }));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
