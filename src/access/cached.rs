//! Memoizing wrapper around any [`FileAccess`] backend.
//!
//! File contents are stored once as immutable [`Bytes`]; every reader gets
//! its own cursor over a cheap clone of that buffer, so concurrent readers of
//! the same path never share stream state. Invalidation is per path.

use super::{FileAccess, directory_path, parent_directory, relative_path, require_path};
use crate::common::error::AccessResult;
use bytes::{Buf, Bytes};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Read;

/// Caching decorator for a package backend.
#[derive(Debug)]
pub struct CachedFileAccess<A> {
    inner: A,
    contents: RwLock<HashMap<String, Bytes>>,
    existence: RwLock<HashMap<String, bool>>,
    listings: RwLock<HashMap<String, Vec<String>>>,
    all_files: RwLock<Option<Vec<String>>>,
}

impl<A: FileAccess> CachedFileAccess<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            contents: RwLock::new(HashMap::new()),
            existence: RwLock::new(HashMap::new()),
            listings: RwLock::new(HashMap::new()),
            all_files: RwLock::new(None),
        }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Drop cached state for one path: its contents and existence, its own
    /// listing if it is a directory, the listing of its parent directory and
    /// the full file list. Contents of other paths stay cached.
    pub fn clear_path(&self, path: &str) {
        let file = relative_path(path);
        let directory = directory_path(path);
        self.contents.write().remove(&file);
        self.existence.write().remove(&file);
        {
            let mut listings = self.listings.write();
            listings.remove(&directory);
            listings.remove(parent_directory(&directory));
        }
        *self.all_files.write() = None;
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.contents.write().clear();
        self.existence.write().clear();
        self.listings.write().clear();
        *self.all_files.write() = None;
    }

    /// Whether the contents of `path` are currently cached.
    pub fn is_cached(&self, path: &str) -> bool {
        self.contents.read().contains_key(&relative_path(path))
    }

    fn cached_bytes(&self, path: &str) -> AccessResult<Bytes> {
        require_path(path)?;
        let key = relative_path(path);
        if let Some(bytes) = self.contents.read().get(&key) {
            return Ok(bytes.clone());
        }

        let loaded = Bytes::from(self.inner.read_file(&key)?);
        // A racing reader may have filled the slot first; keep the stored buffer.
        let mut contents = self.contents.write();
        Ok(contents.entry(key).or_insert(loaded).clone())
    }
}

impl<A: FileAccess> FileAccess for CachedFileAccess<A> {
    fn root_path(&self) -> &str {
        self.inner.root_path()
    }

    fn file_exists(&self, path: &str) -> AccessResult<bool> {
        require_path(path)?;
        let key = relative_path(path);
        if let Some(&exists) = self.existence.read().get(&key) {
            return Ok(exists);
        }
        let exists = self.inner.file_exists(&key)?;
        self.existence.write().insert(key, exists);
        Ok(exists)
    }

    fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
        let key = directory_path(directory);
        if let Some(files) = self.listings.read().get(&key) {
            return Ok(files.clone());
        }
        let files = self.inner.list_files(&key)?;
        self.listings.write().insert(key, files.clone());
        Ok(files)
    }

    fn list_all_files(&self) -> AccessResult<Vec<String>> {
        if let Some(files) = self.all_files.read().as_ref() {
            return Ok(files.clone());
        }
        let files = self.inner.list_all_files()?;
        *self.all_files.write() = Some(files.clone());
        Ok(files)
    }

    fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
        Ok(Box::new(self.cached_bytes(path)?.reader()))
    }

    fn file_size(&self, path: &str) -> AccessResult<u64> {
        self.inner.file_size(path)
    }

    fn read_file(&self, path: &str) -> AccessResult<Vec<u8>> {
        Ok(self.cached_bytes(path)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;
    use crate::common::error::AccessError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads reaching the wrapped backend.
    struct CountingAccess {
        inner: InMemoryFileAccess,
        reads: AtomicUsize,
    }

    impl FileAccess for CountingAccess {
        fn root_path(&self) -> &str {
            self.inner.root_path()
        }
        fn file_exists(&self, path: &str) -> AccessResult<bool> {
            self.inner.file_exists(path)
        }
        fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
            self.inner.list_files(directory)
        }
        fn list_all_files(&self) -> AccessResult<Vec<String>> {
            self.inner.list_all_files()
        }
        fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.file_contents(path)
        }
    }

    fn cached() -> CachedFileAccess<CountingAccess> {
        CachedFileAccess::new(CountingAccess {
            inner: InMemoryFileAccess::new("mem")
                .with_file("a.txt", "alpha")
                .with_file("b.txt", "beta"),
            reads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_contents_are_memoized() {
        let access = cached();
        assert_eq!(access.read_file("a.txt").unwrap(), b"alpha");
        assert_eq!(access.read_file("/a.txt").unwrap(), b"alpha");
        assert_eq!(access.inner().reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_path_is_selective() {
        let access = cached();
        access.read_file("a.txt").unwrap();
        access.read_file("b.txt").unwrap();
        access.clear_path("a.txt");
        assert!(!access.is_cached("a.txt"));
        assert!(access.is_cached("b.txt"));

        access.read_file("b.txt").unwrap();
        assert_eq!(access.inner().reads.load(Ordering::SeqCst), 2);
        access.read_file("a.txt").unwrap();
        assert_eq!(access.inner().reads.load(Ordering::SeqCst), 3);

        access.clear();
        assert!(!access.is_cached("b.txt"));
    }

    /// Backend whose files can change behind the cache.
    struct SharedAccess(Arc<parking_lot::RwLock<InMemoryFileAccess>>);

    impl FileAccess for SharedAccess {
        fn root_path(&self) -> &str {
            "shared"
        }
        fn file_exists(&self, path: &str) -> AccessResult<bool> {
            self.0.read().file_exists(path)
        }
        fn list_files(&self, directory: &str) -> AccessResult<Vec<String>> {
            self.0.read().list_files(directory)
        }
        fn list_all_files(&self) -> AccessResult<Vec<String>> {
            self.0.read().list_all_files()
        }
        fn file_contents(&self, path: &str) -> AccessResult<Box<dyn Read + Send + '_>> {
            let bytes = self.0.read().read_file(path)?;
            Ok(Box::new(std::io::Cursor::new(bytes)))
        }
    }

    #[test]
    fn test_clear_path_refreshes_listings() {
        let files = Arc::new(parking_lot::RwLock::new(
            InMemoryFileAccess::new("mem").with_file("course/a.html", "a"),
        ));
        let access = CachedFileAccess::new(SharedAccess(Arc::clone(&files)));
        assert_eq!(access.list_files("course").unwrap().len(), 1);
        assert_eq!(access.list_all_files().unwrap().len(), 1);
        assert!(!access.file_exists("course/b.html").unwrap());

        files.write().insert("course/b.html", "b");
        assert_eq!(access.list_files("course").unwrap().len(), 1);

        access.clear_path("course/b.html");
        let mut listed = access.list_files("course").unwrap();
        listed.sort();
        assert_eq!(listed, vec!["course/a.html", "course/b.html"]);
        assert_eq!(access.list_all_files().unwrap().len(), 2);
        assert!(access.file_exists("course/b.html").unwrap());
    }

    #[test]
    fn test_readers_are_independent() {
        let access = cached();
        let mut first = access.file_contents("a.txt").unwrap();
        let mut second = access.file_contents("a.txt").unwrap();

        let mut head = [0u8; 2];
        first.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"al");

        let mut all = String::new();
        second.read_to_string(&mut all).unwrap();
        assert_eq!(all, "alpha");

        let mut rest = String::new();
        first.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "pha");
    }

    #[test]
    fn test_concurrent_reads_share_one_buffer() {
        let access = Arc::new(cached());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let access = Arc::clone(&access);
                std::thread::spawn(move || access.read_file("b.txt").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), b"beta");
        }
        assert!(access.inner().reads.load(Ordering::SeqCst) <= 8);
        assert!(access.is_cached("b.txt"));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let access = cached();
        assert!(matches!(
            access.read_file("missing.txt"),
            Err(AccessError::NotFound { .. })
        ));
        assert!(!access.is_cached("missing.txt"));
    }
}
