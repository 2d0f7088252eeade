//! `<metadata>` blocks.

use crate::lom::Lom;
use serde::{Deserialize, Serialize};

/// Metadata attached to a manifest, organization, item, resource or file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpMetadata {
    /// `<schema>`, e.g. `ADL SCORM`
    pub schema: Option<String>,
    /// `<schemaversion>`, e.g. `1.2` or `2004 4th Edition`
    pub schema_version: Option<String>,
    /// `<adlcp:location>` of an external LOM file
    pub location: Option<String>,
    /// Inline LOM, or the external one when it was resolved
    pub lom: Option<Lom>,
}

impl CpMetadata {
    pub fn title(&self) -> Option<&str> {
        self.lom.as_ref().and_then(Lom::title)
    }

    pub fn description(&self) -> Option<&str> {
        self.lom.as_ref().and_then(Lom::description)
    }
}
