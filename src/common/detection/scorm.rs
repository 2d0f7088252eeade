//! SCORM detection.

use super::plugin::DetectorPlugin;
use super::types::ModuleType;
use super::version::detect_scorm_version;
use crate::access::{FileAccess, find_file_ignore_case};
use crate::common::error::AccessResult;

/// Priority of [`ScormDetectorPlugin`].
pub const SCORM_PRIORITY: i32 = 60;

/// Name of the IMS content packaging manifest.
pub const SCORM_MANIFEST: &str = "imsmanifest.xml";

/// Recognizes SCORM packages by a root-level `imsmanifest.xml` (any letter
/// case) and picks the version with [`detect_scorm_version`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScormDetectorPlugin;

impl DetectorPlugin for ScormDetectorPlugin {
    fn name(&self) -> &str {
        "SCORM"
    }

    fn priority(&self) -> i32 {
        SCORM_PRIORITY
    }

    fn detect(&self, access: &dyn FileAccess) -> AccessResult<Option<ModuleType>> {
        let Some(path) = find_file_ignore_case(access, SCORM_MANIFEST)? else {
            return Ok(None);
        };
        let bytes = access.read_file(&path)?;
        Ok(Some(detect_scorm_version(&bytes)))
    }
}
