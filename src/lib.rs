//! elearning-module-parser - detection, parsing and validation of e-learning
//! content packages.
//!
//! This library reads the four packaging standards found in learning
//! management systems and projects each of them into a common metadata
//! record.
//!
//! # Features
//!
//! - **Detection**: decide whether a package is SCORM 1.2, SCORM 2004, AICC
//!   or cmi5 through a priority-ordered plugin chain
//! - **SCORM 1.2 / 2004**: `imsmanifest.xml` with organizations, resources,
//!   LOM metadata and, for 2004, the full IMS Simple Sequencing model
//! - **AICC**: the `.crs`, `.des`, `.au` and `.cst` course files
//! - **cmi5**: `cmi5.xml` course structures
//! - **Validation**: rule sets per standard that report every problem in a
//!   single pass
//! - **Safe XML**: entities declared in a DOCTYPE are never expanded
//! - **File access**: directories, ZIP archives, in-memory packages and a
//!   content cache behind one trait
//!
//! # Example - Parsing any package
//!
//! ```no_run
//! use elearning_module_parser::access::LocalFileAccess;
//! use elearning_module_parser::factory::ModuleParserFactory;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let access = Arc::new(LocalFileAccess::new("course/")?);
//! let factory = ModuleParserFactory::with_default_parsers();
//! let module = factory.parse_module(access)?;
//!
//! println!("{} package: {:?}", module.module_type(), module.title());
//! println!("Launch: {:?}", module.launch_url());
//!
//! for issue in module.validate().issues() {
//!     println!("{}", issue);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Parsing a known standard
//!
//! ```no_run
//! use elearning_module_parser::access::ZipFileAccess;
//! use elearning_module_parser::manifest::PackageManifest;
//! use elearning_module_parser::scorm2004::Scorm2004Parser;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let parser = Scorm2004Parser::new(ZipFileAccess::open("course.zip")?);
//! let manifest = parser.parse_manifest()?;
//!
//! for organization in &manifest.organizations.organizations {
//!     for item in organization.all_items() {
//!         println!("{:?}: {:?}", item.identifier, item.title);
//!     }
//! }
//! println!("Duration: {:?}", manifest.duration());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Detection only
//!
//! ```
//! use elearning_module_parser::access::InMemoryFileAccess;
//! use elearning_module_parser::detection::{ModuleType, ModuleTypeDetector};
//!
//! let access = InMemoryFileAccess::new("pkg")
//!     .with_file("course.crs", "[Course]\nCourse_Title=Intro\n")
//!     .with_file("course.au", "\"system_id\",\"file_name\"\n\"A1\",\"index.html\"\n");
//! let detector = ModuleTypeDetector::with_default_plugins();
//! assert_eq!(detector.detect(&access).unwrap(), ModuleType::Aicc);
//! ```

pub mod access;
pub mod aicc;
pub mod cmi5;
pub mod common;
pub mod cp;
pub mod factory;
pub mod lom;
pub mod manifest;
pub mod scorm12;
pub mod scorm2004;
pub mod validation;

pub use common::detection;

pub use common::{DetectionError, Error, ParseError, ParseOptions, Result};
pub use detection::{ModuleType, ModuleTypeDetector};
pub use factory::ModuleParserFactory;
pub use manifest::{ModuleMetadata, ModuleParser, PackageManifest, ParsedModule};
pub use validation::{Severity, ValidationIssue, ValidationResult};
