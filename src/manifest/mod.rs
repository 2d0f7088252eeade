//! The normalized view every manifest type is projected into.
//!
//! Each standard has its own manifest object graph. [`PackageManifest`] is
//! the common capability set; [`ModuleMetadata`] is the normalized output
//! record; [`ModuleParser`] and [`ParsedModule`] let callers work with a
//! package whose standard is only known at run time.

pub mod metadata;
pub mod parsed;

pub use metadata::ModuleMetadata;
pub use parsed::{ModuleParser, ParsedModule};

use crate::detection::ModuleType;
use std::time::Duration;

/// Fields every manifest exposes regardless of its standard.
pub trait PackageManifest {
    fn module_type(&self) -> ModuleType;

    fn title(&self) -> Option<&str>;

    fn description(&self) -> Option<&str>;

    /// Entry point of the content, relative to the package root.
    fn launch_url(&self) -> Option<&str>;

    fn identifier(&self) -> Option<&str>;

    fn version(&self) -> Option<&str>;

    /// Typical or maximum learning time, when the manifest declares one.
    fn duration(&self) -> Option<Duration>;
}
