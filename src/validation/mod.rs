//! Rule-based validation of parsed manifests.
//!
//! A [`ValidationRule`] inspects one manifest and reports problems as
//! [`ValidationIssue`]s; a [`Validator`] runs an ordered list of rules and
//! merges everything they report. Invalid content never produces an error
//! value here: a manifest that parsed is always validated to completion.
//!
//! Default validators for each standard are built once and shared:
//!
//! | Standard  | Rules |
//! |-----------|-------|
//! | AICC      | course, title and launch URL present |
//! | SCORM 1.2 | [shared SCORM rules](scorm), mastery score range |
//! | SCORM 2004| shared SCORM rules, objective references, duplicate objectives, `IDRef` resolution, value ranges |
//! | cmi5      | title, launch URL, AU URLs, unique IDs, objective references, mastery score range |

pub mod aicc;
pub mod cmi5;
pub mod result;
pub mod rule;
pub mod scorm;
pub mod scorm12;
pub mod scorm2004;

pub use result::{Severity, ValidationIssue, ValidationResult};
pub use rule::{ValidationRule, Validator};
pub use scorm::ContentPackage;

use crate::aicc::AiccManifest;
use crate::cmi5::Cmi5Manifest;
use crate::scorm12::Scorm12Manifest;
use crate::scorm2004::Scorm2004Manifest;
use once_cell::sync::Lazy;

static AICC_VALIDATOR: Lazy<Validator<AiccManifest>> = Lazy::new(aicc::default_validator);
static SCORM12_VALIDATOR: Lazy<Validator<Scorm12Manifest>> = Lazy::new(scorm12::default_validator);
static SCORM2004_VALIDATOR: Lazy<Validator<Scorm2004Manifest>> = Lazy::new(scorm2004::default_validator);
static CMI5_VALIDATOR: Lazy<Validator<Cmi5Manifest>> = Lazy::new(cmi5::default_validator);

pub fn aicc_validator() -> &'static Validator<AiccManifest> {
    &AICC_VALIDATOR
}

pub fn scorm12_validator() -> &'static Validator<Scorm12Manifest> {
    &SCORM12_VALIDATOR
}

pub fn scorm2004_validator() -> &'static Validator<Scorm2004Manifest> {
    &SCORM2004_VALIDATOR
}

pub fn cmi5_validator() -> &'static Validator<Cmi5Manifest> {
    &CMI5_VALIDATOR
}
