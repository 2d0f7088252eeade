//! Normalized module metadata.

use super::PackageManifest;
use crate::access::{FileAccess, file_name};
use crate::common::error::{ParseError, ParseResult};
use crate::detection::ModuleType;
use serde::Serialize;
use std::time::Duration;

/// Scripts whose presence marks a package as xAPI-aware.
const XAPI_MARKERS: [&str; 2] = ["xAPI.js", "sendStatement.js"];

/// A parsed package: the normalized fields plus the standard-specific manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleMetadata<M> {
    pub module_type: ModuleType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub identifier: Option<String>,
    pub version: Option<String>,
    pub launch_url: Option<String>,
    pub duration: Option<Duration>,
    /// Package emits xAPI statements (always true for cmi5)
    pub xapi_enabled: bool,
    /// Sum of the sizes of all files in the package
    pub size_on_disk: u64,
    /// The standard-specific object graph
    pub manifest: M,
}

impl<M: PackageManifest> ModuleMetadata<M> {
    /// Project `manifest` and inspect the package files.
    pub fn from_manifest(manifest: M, access: &dyn FileAccess) -> ParseResult<Self> {
        let files = access.list_all_files().map_err(|e| ParseError::list("", e))?;
        let xapi_enabled = manifest.module_type() == ModuleType::Cmi5
            || files.iter().any(|f| {
                let name = file_name(f);
                XAPI_MARKERS.iter().any(|m| name.eq_ignore_ascii_case(m))
            });
        let size_on_disk = access.total_size().map_err(|e| ParseError::read("", e))?;

        Ok(Self {
            module_type: manifest.module_type(),
            title: manifest.title().map(str::to_string),
            description: manifest.description().map(str::to_string),
            identifier: manifest.identifier().map(str::to_string),
            version: manifest.version().map(str::to_string),
            launch_url: manifest.launch_url().map(str::to_string),
            duration: manifest.duration(),
            xapi_enabled,
            size_on_disk,
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;

    struct Stub(ModuleType);

    impl PackageManifest for Stub {
        fn module_type(&self) -> ModuleType {
            self.0
        }
        fn title(&self) -> Option<&str> {
            Some("Stub")
        }
        fn description(&self) -> Option<&str> {
            None
        }
        fn launch_url(&self) -> Option<&str> {
            Some("index.html")
        }
        fn identifier(&self) -> Option<&str> {
            Some("ID")
        }
        fn version(&self) -> Option<&str> {
            None
        }
        fn duration(&self) -> Option<Duration> {
            Some(Duration::from_secs(60))
        }
    }

    #[test]
    fn test_projection_and_package_facts() {
        let access = InMemoryFileAccess::new("mem")
            .with_file("index.html", "12345")
            .with_file("lib/xapi.js", "123");
        let metadata = ModuleMetadata::from_manifest(Stub(ModuleType::Scorm12), &access).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Stub"));
        assert_eq!(metadata.launch_url.as_deref(), Some("index.html"));
        assert_eq!(metadata.duration, Some(Duration::from_secs(60)));
        assert!(metadata.xapi_enabled);
        assert_eq!(metadata.size_on_disk, 8);
    }

    #[test]
    fn test_cmi5_is_always_xapi() {
        let access = InMemoryFileAccess::new("mem").with_file("cmi5.xml", "");
        assert!(ModuleMetadata::from_manifest(Stub(ModuleType::Cmi5), &access).unwrap().xapi_enabled);
        let plain = InMemoryFileAccess::new("mem").with_file("index.html", "");
        assert!(!ModuleMetadata::from_manifest(Stub(ModuleType::Aicc), &plain).unwrap().xapi_enabled);
    }
}
