//! IMS Content Packaging structures shared by SCORM 1.2 and SCORM 2004.
//!
//! Both SCORM versions use the same `<manifest>` skeleton: metadata, a set
//! of organizations and a flat list of resources. The organizations differ
//! between versions and live in [`scorm12`](crate::scorm12) and
//! [`scorm2004`](crate::scorm2004); metadata, resources and manifest loading
//! live here.

pub mod context;
pub mod metadata;
pub mod resource;

pub use context::{MANIFEST_FILE, PackageContext, load_manifest_document};
pub use metadata::CpMetadata;
pub use resource::{Resource, ResourceFile, Resources, ScormType};
