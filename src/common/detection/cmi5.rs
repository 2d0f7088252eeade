//! cmi5 detection.

use super::plugin::DetectorPlugin;
use super::types::ModuleType;
use crate::access::{FileAccess, find_file_ignore_case};
use crate::common::error::AccessResult;

/// Priority of [`Cmi5DetectorPlugin`].
pub const CMI5_PRIORITY: i32 = 70;

/// Name of the cmi5 course structure file.
pub const CMI5_MANIFEST: &str = "cmi5.xml";

/// Recognizes cmi5 packages by a root-level `cmi5.xml` (any letter case).
#[derive(Debug, Default, Clone, Copy)]
pub struct Cmi5DetectorPlugin;

impl DetectorPlugin for Cmi5DetectorPlugin {
    fn name(&self) -> &str {
        "cmi5"
    }

    fn priority(&self) -> i32 {
        CMI5_PRIORITY
    }

    fn detect(&self, access: &dyn FileAccess) -> AccessResult<Option<ModuleType>> {
        Ok(find_file_ignore_case(access, CMI5_MANIFEST)?.map(|_| ModuleType::Cmi5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;

    #[test]
    fn test_detects_cmi5_xml() {
        let access = InMemoryFileAccess::new("mem").with_file("cmi5.xml", "<courseStructure/>");
        assert_eq!(Cmi5DetectorPlugin.detect(&access).unwrap(), Some(ModuleType::Cmi5));
        let empty = InMemoryFileAccess::new("mem");
        assert_eq!(Cmi5DetectorPlugin.detect(&empty).unwrap(), None);
    }

    #[test]
    fn test_cmi5_name_ignores_case() {
        let access = InMemoryFileAccess::new("mem").with_file("CMI5.XML", "<courseStructure/>");
        assert_eq!(Cmi5DetectorPlugin.detect(&access).unwrap(), Some(ModuleType::Cmi5));
    }
}
