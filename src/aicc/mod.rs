//! AICC (HACP) course packages.
//!
//! An AICC course is described by four sibling files at the package root:
//!
//! | File   | Format              | Content                                   |
//! |--------|---------------------|-------------------------------------------|
//! | `.crs` | INI-like            | course, behavior and free-text description |
//! | `.des` | quoted CSV          | title and description per system ID       |
//! | `.au`  | quoted CSV          | launch data per assignable unit           |
//! | `.cst` | quoted CSV          | block/member edges rooted at `ROOT`       |
//!
//! Parsing joins the files and resolves the root assignable unit; a course
//! whose structure cannot be resolved is a parse failure rather than a
//! validation issue.

pub mod csv;
pub mod ini;
pub mod model;
pub mod parser;

pub use model::{
    AiccManifest, AssignableUnit, Course, CourseBehavior, CourseStructure, Descriptor, ROOT_BLOCK,
};
pub use parser::{AiccParser, CourseFiles};
