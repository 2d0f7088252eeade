//! Package unpacked into a directory on the local filesystem.

use super::{FileAccess, directory_path, parent_directory, relative_path, require_path, similar_files};
use crate::common::error::{AccessError, AccessResult};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Directory-backed package.
#[derive(Debug, Clone)]
pub struct LocalFileAccess {
    root: PathBuf,
    root_display: String,
}

impl LocalFileAccess {
    /// Open the package rooted at `root`, which must be a directory.
    pub fn new<P: AsRef<Path>>(root: P) -> AccessResult<Self> {
        let root = root.as_ref();
        let root_display = root.display().to_string();
        if !root.is_dir() {
            return Err(AccessError::InvalidArgument(format!(
                "package root is not a directory: {}",
                root_display
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
            root_display,
        })
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let relative = relative_path(relative);
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    fn entries(&self, directory: &str) -> AccessResult<Vec<(String, bool)>> {
        let dir = self.resolve(directory);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let read_dir = fs::read_dir(&dir).map_err(|e| AccessError::io(directory, e))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| AccessError::io(directory, e))?;
            let file_type = entry.file_type().map_err(|e| AccessError::io(directory, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = if directory.is_empty() {
                name
            } else {
                format!("{}/{}", directory, name)
            };
            entries.push((relative, file_type.is_dir()));
        }
        Ok(entries)
    }

    fn not_found(&self, path: &str) -> AccessError {
        let siblings = self.list_files(parent_directory(path)).unwrap_or_default();
        AccessError::NotFound {
            similar: similar_files(&siblings, path),
            path: path.to_string(),
        }
    }
}

impl FileAccess for LocalFileAccess {
    fn root_path(&self) -> &str {
        &self.root_display
    }

    fn file_exists(&self, path: &str) -> AccessResult<bool> {
        require_path(path)?;
        Ok(self.resolve(path).is_file())
    }

    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
        let directory = directory_path(directory);
        let mut files: Vec<String> = self
            .entries(&directory)?
            .into_iter()
            .filter_map(|(path, is_dir)| (!is_dir).then_some(path))
            .collect();
        files.sort();
        Ok(files)
    }

    fn list_all_files(&self) -> AccessResult<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![String::new()];
        while let Some(directory) = pending.pop() {
            for (path, is_dir) in self.entries(&directory)? {
                if is_dir {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
        require_path(path)?;
        let relative = relative_path(path);
        match File::open(self.resolve(&relative)) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(self.not_found(&relative)),
            Err(e) => Err(AccessError::io(relative, e)),
        }
    }

    fn file_size(&self, path: &str) -> AccessResult<u64> {
        require_path(path)?;
        let relative = relative_path(path);
        match fs::metadata(self.resolve(&relative)) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(self.not_found(&relative)),
            Err(e) => Err(AccessError::io(relative, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn package() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("imsmanifest.xml"), "<manifest/>").unwrap();
        fs::create_dir_all(dir.path().join("content/js")).unwrap();
        fs::write(dir.path().join("content/index.html"), "<html/>").unwrap();
        fs::write(dir.path().join("content/js/app.js"), "var a;").unwrap();
        dir
    }

    #[test]
    fn test_listing() {
        let dir = package();
        let access = LocalFileAccess::new(dir.path()).unwrap();
        assert_eq!(access.list_files("").unwrap(), vec!["imsmanifest.xml"]);
        assert_eq!(access.list_files("content").unwrap(), vec!["content/index.html"]);
        assert!(access.list_files("nope").unwrap().is_empty());
        assert_eq!(
            access.list_all_files().unwrap(),
            vec!["content/index.html", "content/js/app.js", "imsmanifest.xml"]
        );
    }

    #[test]
    fn test_reading() {
        let dir = package();
        let access = LocalFileAccess::new(dir.path()).unwrap();
        assert!(access.file_exists("/content/index.html").unwrap());
        assert!(!access.file_exists("content").unwrap());
        assert_eq!(access.read_file("content/js/app.js").unwrap(), b"var a;");
        assert_eq!(access.file_size("imsmanifest.xml").unwrap(), 11);
        assert_eq!(access.total_size().unwrap(), 11 + 7 + 6);
    }

    #[test]
    fn test_not_found_hint() {
        let dir = package();
        let access = LocalFileAccess::new(dir.path()).unwrap();
        let err = access.read_file("IMSMANIFEST.xml").unwrap_err();
        assert!(err.to_string().contains("similar files found: imsmanifest.xml"));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = package();
        assert!(LocalFileAccess::new(dir.path().join("imsmanifest.xml")).is_err());
    }
}
