//! Package delivered as a ZIP archive.
//!
//! Authoring tools regularly zip the package folder itself rather than its
//! contents, leaving every file under one top-level directory. When the
//! archive has no files at its top level and a single top-level directory,
//! that directory becomes the internal root and all paths are relative to it.

use super::{FileAccess, directory_path, parent_directory, relative_path, require_path, similar_files};
use crate::common::error::{AccessError, AccessResult};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// macOS resource-fork folder added by Finder's "Compress".
const MACOS_METADATA_DIR: &str = "__MACOSX/";

/// ZIP-backed package.
pub struct ZipFileAccess {
    root_path: String,
    internal_root: String,
    /// Relative path → uncompressed size
    entries: BTreeMap<String, u64>,
    archive: Mutex<ZipArchive<Cursor<Bytes>>>,
}

impl std::fmt::Debug for ZipFileAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipFileAccess")
            .field("root_path", &self.root_path)
            .field("internal_root", &self.internal_root)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ZipFileAccess {
    /// Open an archive from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> AccessResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let data = std::fs::read(path).map_err(|e| AccessError::io(display.clone(), e))?;
        Self::from_bytes(display, data)
    }

    /// Open an archive already in memory. `root_path` labels the package.
    pub fn from_bytes(root_path: impl Into<String>, data: impl Into<Bytes>) -> AccessResult<Self> {
        let root_path = root_path.into();
        let mut archive = ZipArchive::new(Cursor::new(data.into()))?;

        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            names.push((file.name().replace('\\', "/"), file.size()));
        }

        let internal_root = detect_internal_root(names.iter().map(|(name, _)| name.as_str()));
        let entries = names
            .into_iter()
            .filter_map(|(name, size)| {
                name.strip_prefix(internal_root.as_str())
                    .map(|relative| (relative.to_string(), size))
            })
            .collect::<BTreeMap<_, _>>();

        tracing::debug!(
            root = %root_path,
            internal_root = %internal_root,
            files = entries.len(),
            "opened zip package"
        );

        Ok(Self {
            root_path,
            internal_root,
            entries,
            archive: Mutex::new(archive),
        })
    }

    /// Directory prefix inside the archive that acts as the package root.
    pub fn internal_root(&self) -> &str {
        &self.internal_root
    }

    fn lookup(&self, path: &str) -> AccessResult<(String, u64)> {
        require_path(path)?;
        let path = relative_path(path);
        match self.entries.get(&path) {
            Some(&size) => Ok((path, size)),
            None => Err(AccessError::NotFound {
                similar: similar_files(self.entries.keys(), &path),
                path,
            }),
        }
    }
}

/// Single wrapping folder shared by every file, with its trailing slash.
fn detect_internal_root<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut root: Option<&str> = None;
    for name in names.filter(|n| !n.starts_with(MACOS_METADATA_DIR)) {
        let Some((top, _)) = name.split_once('/') else {
            return String::new();
        };
        match root {
            None => root = Some(top),
            Some(existing) if existing == top => {},
            Some(_) => return String::new(),
        }
    }
    root.map(|top| format!("{}/", top)).unwrap_or_default()
}

impl FileAccess for ZipFileAccess {
    fn root_path(&self) -> &str {
        &self.root_path
    }

    fn file_exists(&self, path: &str) -> AccessResult<bool> {
        require_path(path)?;
        Ok(self.entries.contains_key(&relative_path(path)))
    }

    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
        let directory = directory_path(directory);
        Ok(self
            .entries
            .keys()
            .filter(|path| parent_directory(path) == directory)
            .cloned()
            .collect())
    }

    fn list_all_files(&self) -> AccessResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.read_file(path)?)))
    }

    fn file_size(&self, path: &str) -> AccessResult<u64> {
        Ok(self.lookup(path)?.1)
    }

    fn read_file(&self, path: &str) -> AccessResult<Vec<u8>> {
        let (relative, size) = self.lookup(path)?;
        let entry_name = format!("{}{}", self.internal_root, relative);
        let mut archive = self.archive.lock();
        let mut file = archive
            .by_name(&entry_name)
            .map_err(|e| match AccessError::from(e) {
                AccessError::Io { source, .. } => AccessError::io(relative.clone(), source),
                AccessError::NotFound { .. } => AccessError::not_found(relative.clone()),
                other => other,
            })?;
        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| AccessError::io(relative, e))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_entries() {
        let data = build_zip(&[("imsmanifest.xml", "<manifest/>"), ("a/b.html", "<html/>")]);
        let access = ZipFileAccess::from_bytes("course.zip", data).unwrap();
        assert_eq!(access.internal_root(), "");
        assert_eq!(access.list_files("").unwrap(), vec!["imsmanifest.xml"]);
        assert_eq!(access.read_file("/a/b.html").unwrap(), b"<html/>");
        assert_eq!(access.file_size("imsmanifest.xml").unwrap(), 11);
        assert_eq!(access.full_path("a/b.html"), "course.zip/a/b.html");
    }

    #[test]
    fn test_single_wrapping_folder_becomes_root() {
        let data = build_zip(&[
            ("Course/imsmanifest.xml", "<manifest/>"),
            ("Course/res/index.html", "<html/>"),
            ("__MACOSX/Course/._imsmanifest.xml", "junk"),
        ]);
        let access = ZipFileAccess::from_bytes("course.zip", data).unwrap();
        assert_eq!(access.internal_root(), "Course/");
        assert!(access.file_exists("imsmanifest.xml").unwrap());
        assert_eq!(access.read_file("res/index.html").unwrap(), b"<html/>");
        assert_eq!(access.list_all_files().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_entry() {
        let data = build_zip(&[("Index.html", "x"), ("other.txt", "y")]);
        let access = ZipFileAccess::from_bytes("course.zip", data).unwrap();
        let err = access.read_file("index.html").unwrap_err();
        assert!(matches!(err, AccessError::NotFound { ref similar, .. } if similar == &["Index.html"]));
    }

    #[test]
    fn test_invalid_archive() {
        let err = ZipFileAccess::from_bytes("broken.zip", b"not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, AccessError::Zip(_) | AccessError::Io { .. }));
    }
}
