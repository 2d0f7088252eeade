//! Package held entirely in memory.

use super::{FileAccess, directory_path, parent_directory, relative_path, require_path, similar_files};
use crate::common::error::{AccessError, AccessResult};
use bytes::{Buf, Bytes};
use std::collections::BTreeMap;
use std::io::Read;

/// In-memory package: a sorted map from relative path to contents.
///
/// # Example
///
/// ```
/// use elearning_module_parser::access::{FileAccess, InMemoryFileAccess};
///
/// let access = InMemoryFileAccess::new("memory://course")
///     .with_file("cmi5.xml", "<courseStructure/>");
/// assert!(access.file_exists("cmi5.xml").unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileAccess {
    root: String,
    files: BTreeMap<String, Bytes>,
}

impl InMemoryFileAccess {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: &str, contents: impl Into<Bytes>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: &str, contents: impl Into<Bytes>) {
        self.files.insert(relative_path(path), contents.into());
    }

    /// Remove a file, returning its contents.
    pub fn remove(&mut self, path: &str) -> Option<Bytes> {
        self.files.remove(&relative_path(path))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn get(&self, path: &str) -> AccessResult<&Bytes> {
        require_path(path)?;
        let path = relative_path(path);
        self.files.get(&path).ok_or_else(|| AccessError::NotFound {
            similar: similar_files(self.files.keys(), &path),
            path,
        })
    }
}

impl FileAccess for InMemoryFileAccess {
    fn root_path(&self) -> &str {
        &self.root
    }

    fn file_exists(&self, path: &str) -> AccessResult<bool> {
        require_path(path)?;
        Ok(self.files.contains_key(&relative_path(path)))
    }

    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
        let directory = directory_path(directory);
        Ok(self
            .files
            .keys()
            .filter(|path| parent_directory(path) == directory)
            .cloned()
            .collect())
    }

    fn list_all_files(&self) -> AccessResult<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(self.get(path)?.clone().reader()))
    }

    fn file_size(&self, path: &str) -> AccessResult<u64> {
        Ok(self.get(path)?.len() as u64)
    }

    fn read_file(&self, path: &str) -> AccessResult<Vec<u8>> {
        Ok(self.get(path)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryFileAccess {
        InMemoryFileAccess::new("memory://pkg")
            .with_file("imsmanifest.xml", "<manifest/>")
            .with_file("/content/index.html", "<html/>")
            .with_file("content/js/app.js", "var a;")
    }

    #[test]
    fn test_listing_is_per_directory() {
        let access = sample();
        assert_eq!(access.list_files("").unwrap(), vec!["imsmanifest.xml"]);
        assert_eq!(access.list_files("/content/").unwrap(), vec!["content/index.html"]);
        assert!(access.list_files("missing").unwrap().is_empty());
        assert_eq!(access.list_all_files().unwrap().len(), 3);
    }

    #[test]
    fn test_leading_slash_is_root_relative() {
        let access = sample();
        assert!(access.file_exists("/imsmanifest.xml").unwrap());
        assert_eq!(access.read_file("/content/index.html").unwrap(), b"<html/>");
    }

    #[test]
    fn test_missing_file_reports_similar_names() {
        let access = sample();
        let err = access.read_file("IMSManifest.xml").unwrap_err();
        match err {
            AccessError::NotFound { path, similar } => {
                assert_eq!(path, "IMSManifest.xml");
                assert_eq!(similar, vec!["imsmanifest.xml"]);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_path_is_invalid_argument() {
        assert!(matches!(
            sample().file_exists(""),
            Err(AccessError::InvalidArgument(_))
        ));
    }
}
