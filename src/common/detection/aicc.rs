//! AICC detection.

use super::plugin::DetectorPlugin;
use super::types::ModuleType;
use crate::access::{FileAccess, extension};
use crate::common::error::AccessResult;

/// Priority of [`AiccDetectorPlugin`].
pub const AICC_PRIORITY: i32 = 80;

/// Recognizes AICC packages by a root-level `.au` and `.crs` file.
///
/// The extension comparison is case-sensitive: a package containing only
/// `COURSE.AU` and `COURSE.CRS` is not recognized. The AICC parser itself
/// locates files case-insensitively, so such packages still parse when
/// handed to it directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiccDetectorPlugin;

impl DetectorPlugin for AiccDetectorPlugin {
    fn name(&self) -> &str {
        "AICC"
    }

    fn priority(&self) -> i32 {
        AICC_PRIORITY
    }

    fn detect(&self, access: &dyn FileAccess) -> AccessResult<Option<ModuleType>> {
        let files = access.list_files("")?;
        let has = |ext: &str| files.iter().any(|f| extension(f) == Some(ext));
        Ok((has("au") && has("crs")).then_some(ModuleType::Aicc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::InMemoryFileAccess;

    #[test]
    fn test_detects_lowercase_extensions() {
        let access = InMemoryFileAccess::new("mem")
            .with_file("course.au", "")
            .with_file("course.crs", "");
        assert_eq!(AiccDetectorPlugin.detect(&access).unwrap(), Some(ModuleType::Aicc));
    }

    #[test]
    fn test_uppercase_extensions_are_not_detected() {
        let access = InMemoryFileAccess::new("mem")
            .with_file("course.AU", "")
            .with_file("course.CRS", "");
        assert_eq!(AiccDetectorPlugin.detect(&access).unwrap(), None);
    }

    #[test]
    fn test_requires_both_files_at_root() {
        let only_au = InMemoryFileAccess::new("mem").with_file("course.au", "");
        assert_eq!(AiccDetectorPlugin.detect(&only_au).unwrap(), None);

        let nested = InMemoryFileAccess::new("mem")
            .with_file("sub/course.au", "")
            .with_file("sub/course.crs", "");
        assert_eq!(AiccDetectorPlugin.detect(&nested).unwrap(), None);
    }
}
