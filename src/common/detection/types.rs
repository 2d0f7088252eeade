//! Packaging standard enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Packaging standards that can be detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleType {
    /// SCORM 1.2 (`imsmanifest.xml`, ADL CP 1.2 schemas)
    #[serde(rename = "SCORM_12")]
    Scorm12,
    /// SCORM 2004, any edition (`imsmanifest.xml`, `adlcp_v1p3`)
    #[serde(rename = "SCORM_2004")]
    Scorm2004,
    /// AICC HACP course files (`.crs`, `.au`, `.des`, `.cst`)
    Aicc,
    /// cmi5 (`cmi5.xml`)
    Cmi5,
}

impl ModuleType {
    /// All types, in declaration order.
    pub const ALL: [ModuleType; 4] = [
        ModuleType::Scorm12,
        ModuleType::Scorm2004,
        ModuleType::Aicc,
        ModuleType::Cmi5,
    ];

    /// Canonical identifier (`SCORM_12`, `SCORM_2004`, `AICC`, `CMI5`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Scorm12 => "SCORM_12",
            ModuleType::Scorm2004 => "SCORM_2004",
            ModuleType::Aicc => "AICC",
            ModuleType::Cmi5 => "CMI5",
        }
    }

    /// Whether this is one of the two SCORM flavours.
    pub const fn is_scorm(&self) -> bool {
        matches!(self, ModuleType::Scorm12 | ModuleType::Scorm2004)
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
