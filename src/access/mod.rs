//! Uniform byte-level access to the files of a content package.
//!
//! A package may live in a directory, a ZIP archive or memory. Parsers and
//! detector plugins only ever see the [`FileAccess`] trait, so every backend
//! behaves the same way from their point of view:
//!
//! - paths are relative to the package root and use `/` separators;
//! - a leading `/` means "from the package root" and is stripped;
//! - `.` and `..` segments are passed through verbatim, never resolved;
//! - listings are sorted and empty for a directory that does not exist.
//!
//! [`CachedFileAccess`] wraps any backend with selective memoization.

#[cfg(feature = "zip")]
pub mod archive;
pub mod cached;
pub mod local;
pub mod memory;

#[cfg(feature = "zip")]
pub use archive::ZipFileAccess;
pub use cached::CachedFileAccess;
pub use local::LocalFileAccess;
pub use memory::InMemoryFileAccess;

use crate::common::error::{AccessError, AccessResult};
use std::io::Read;

/// Byte-oriented view of a content package.
pub trait FileAccess: Send + Sync {
    /// Location of the package (directory, archive path or a label).
    fn root_path(&self) -> &str;

    /// Whether a regular file exists at `path`.
    ///
    /// An empty path is a caller error.
    fn file_exists(&self, path: &str) -> AccessResult<bool>;

    /// Files directly inside `directory` (`""` for the root), sorted.
    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>>;

    /// Every file in the package, sorted.
    fn list_all_files(&self) -> AccessResult<Vec<String>>;

    /// Stream over the contents of `path`.
    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>>;

    /// Size in bytes of the file at `path`.
    fn file_size(&self, path: &str) -> AccessResult<u64> {
        Ok(self.read_file(path)?.len() as u64)
    }

    /// Whole contents of `path`.
    fn read_file(&self, path: &str) -> AccessResult<Vec<u8>> {
        let mut reader = self.file_contents(path)?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| AccessError::io(path, e))?;
        Ok(buf)
    }

    /// `relative` prefixed with the root path. See [`full_path`].
    fn full_path(&self, relative: &str) -> String {
        full_path(self.root_path(), relative)
    }

    /// Sum of the sizes of all files.
    fn total_size(&self) -> AccessResult<u64> {
        self.list_all_files()?
            .iter()
            .try_fold(0u64, |acc, path| Ok(acc + self.file_size(path)?))
    }
}

impl<T: FileAccess + ?Sized> FileAccess for std::sync::Arc<T> {
    fn root_path(&self) -> &str {
        (**self).root_path()
    }
    fn file_exists(&self, path: &str) -> AccessResult<bool> {
        (**self).file_exists(path)
    }
    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
        (**self).list_files(directory)
    }
    fn list_all_files(&self) -> AccessResult<Vec<String>> {
        (**self).list_all_files()
    }
    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
        (**self).file_contents(path)
    }
    fn file_size(&self, path: &str) -> AccessResult<u64> {
        (**self).file_size(path)
    }
    fn read_file(&self, path: &str) -> AccessResult<Vec<u8>> {
        (**self).read_file(path)
    }
    fn total_size(&self) -> AccessResult<u64> {
        (**self).total_size()
    }
}

/// Prefix `relative` with `root`.
///
/// Leading slashes on `relative` are stripped, meaning "from the package
/// root". No other normalization happens: `.` and `..` segments are kept
/// verbatim, so `full_path("/pkg", "../x")` is `/pkg/../x`.
pub fn full_path(root: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    if root.is_empty() {
        relative.to_string()
    } else if root.ends_with('/') {
        format!("{}{}", root, relative)
    } else {
        format!("{}/{}", root, relative)
    }
}

/// Normalize a caller-supplied path to the relative form backends store.
pub(crate) fn relative_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches('/').to_string()
}

/// Normalize a directory argument: no leading or trailing slash, `""` for root.
pub(crate) fn directory_path(directory: &str) -> String {
    relative_path(directory).trim_end_matches('/').to_string()
}

/// Reject empty paths.
pub(crate) fn require_path(path: &str) -> AccessResult<()> {
    if path.trim().is_empty() {
        return Err(AccessError::InvalidArgument("path must not be empty".to_string()));
    }
    Ok(())
}

/// Directory part of a relative path, `""` for top-level files.
pub fn parent_directory(path: &str) -> &str {
    path.rfind('/').map_or("", |pos| &path[..pos])
}

/// Final segment of a relative path.
pub fn file_name(path: &str) -> &str {
    path.rfind('/').map_or(path, |pos| &path[pos + 1..])
}

/// Extension of the final segment, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    name.rfind('.').filter(|&pos| pos > 0).map(|pos| &name[pos + 1..])
}

/// Locate `path`, falling back to a case-insensitive match.
///
/// The fallback compares the whole relative path against the files of the
/// same directory, so `IMSMANIFEST.XML` at the root matches a request for
/// `imsmanifest.xml`, while `sub/imsmanifest.xml` never does.
pub fn find_file_ignore_case(access: &dyn FileAccess, path: &str) -> AccessResult<Option<String>> {
    require_path(path)?;
    let path = relative_path(path);
    if access.file_exists(&path)? {
        return Ok(Some(path));
    }
    Ok(access
        .list_files(parent_directory(&path))?
        .into_iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(&path)))
}

/// Near-miss candidates for a missing `path`: same name ignoring case.
pub(crate) fn similar_files<'a>(
    candidates: impl IntoIterator<Item = &'a String>,
    path: &str,
) -> Vec<String> {
    let wanted = file_name(path);
    candidates
        .into_iter()
        .filter(|candidate| {
            candidate.as_str() != path && file_name(candidate).eq_ignore_ascii_case(wanted)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_strips_leading_slash() {
        assert_eq!(full_path("/pkg", "/imsmanifest.xml"), "/pkg/imsmanifest.xml");
        assert_eq!(full_path("/pkg/", "a/b.html"), "/pkg/a/b.html");
        assert_eq!(full_path("", "/a.html"), "a.html");
    }

    // Current behaviour: dot segments are kept verbatim, not resolved.
    #[test]
    fn test_full_path_preserves_dot_segments() {
        assert_eq!(full_path("/pkg", "./a/../b.html"), "/pkg/./a/../b.html");
        assert_eq!(full_path("/pkg", "../outside.txt"), "/pkg/../outside.txt");
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(parent_directory("a/b/c.xml"), "a/b");
        assert_eq!(parent_directory("c.xml"), "");
        assert_eq!(file_name("a/b/c.xml"), "c.xml");
        assert_eq!(extension("a/course.AU"), Some("AU"));
        assert_eq!(extension(".hidden"), None);
        assert_eq!(extension("noext"), None);
        assert_eq!(directory_path("/sub/dir/"), "sub/dir");
        assert_eq!(relative_path("\\a\\b.txt"), "a/b.txt");
    }

    #[test]
    fn test_find_file_ignore_case_matches_whole_path() {
        let access = InMemoryFileAccess::new("mem")
            .with_file("IMSMANIFEST.XML", "<manifest/>")
            .with_file("sub/imsmanifest.xml", "<manifest/>");
        assert_eq!(
            find_file_ignore_case(&access, "imsmanifest.xml").unwrap(),
            Some("IMSMANIFEST.XML".to_string())
        );
        assert_eq!(
            find_file_ignore_case(&access, "sub/IMSManifest.xml").unwrap(),
            Some("sub/imsmanifest.xml".to_string())
        );

        let nested_only = InMemoryFileAccess::new("mem").with_file("sub/imsmanifest.xml", "<m/>");
        assert_eq!(find_file_ignore_case(&nested_only, "imsmanifest.xml").unwrap(), None);
    }

    #[test]
    fn test_find_file_rejects_empty_path() {
        let access = InMemoryFileAccess::new("mem");
        assert!(matches!(
            find_file_ignore_case(&access, ""),
            Err(AccessError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_total_size() {
        let access = InMemoryFileAccess::new("mem")
            .with_file("a.txt", "abc")
            .with_file("b/c.txt", "de");
        assert_eq!(access.total_size().unwrap(), 5);
    }
}
