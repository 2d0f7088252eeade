//! Module type detection.
//!
//! Detection looks at as little of a package as possible: a root directory
//! listing for AICC, a file existence check for cmi5 and a byte scan of
//! `imsmanifest.xml` for SCORM. Each check is a [`DetectorPlugin`]; the
//! [`ModuleTypeDetector`] runs them by descending priority and returns the
//! first answer.

// Submodule declarations
pub mod aicc;
pub mod cmi5;
pub mod detector;
pub mod plugin;
pub mod scorm;
pub mod types;
pub mod version;

// Re-exports
pub use aicc::AiccDetectorPlugin;
pub use cmi5::Cmi5DetectorPlugin;
pub use detector::ModuleTypeDetector;
pub use plugin::DetectorPlugin;
pub use scorm::ScormDetectorPlugin;
pub use types::ModuleType;
pub use version::detect_scorm_version;
