//! SCORM 1.2 content packages.
//!
//! # Example
//!
//! ```
//! use elearning_module_parser::access::InMemoryFileAccess;
//! use elearning_module_parser::manifest::PackageManifest;
//! use elearning_module_parser::scorm12::Scorm12Parser;
//!
//! let access = InMemoryFileAccess::new("pkg").with_file(
//!     "imsmanifest.xml",
//!     r#"<manifest identifier="COURSE-1" version="1.0">
//!          <organizations default="ORG">
//!            <organization identifier="ORG">
//!              <title>Safety Basics</title>
//!              <item identifier="I1" identifierref="R1"><title>Lesson 1</title></item>
//!            </organization>
//!          </organizations>
//!          <resources>
//!            <resource identifier="R1" type="webcontent" adlcp:scormtype="sco" href="lesson1/index.html"/>
//!          </resources>
//!        </manifest>"#,
//! );
//! let manifest = Scorm12Parser::new(access).parse_manifest().unwrap();
//! assert_eq!(manifest.title(), Some("Safety Basics"));
//! assert_eq!(manifest.launch_url(), Some("lesson1/index.html"));
//! ```

pub mod model;
pub mod parser;

pub use model::{Item, Organization, Organizations, Scorm12Manifest};
pub use parser::Scorm12Parser;
