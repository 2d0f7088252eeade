//! AICC course rules.

use super::{ValidationIssue, ValidationResult, ValidationRule, Validator};
use crate::aicc::AiccManifest;
use crate::common::is_blank;
use crate::manifest::PackageManifest;

pub const AICC_MISSING_COURSE: &str = "AICC_MISSING_COURSE";
pub const AICC_MISSING_TITLE: &str = "AICC_MISSING_TITLE";
pub const AICC_MISSING_LAUNCH_URL: &str = "AICC_MISSING_LAUNCH_URL";

/// The `[Course]` section must be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseRequiredRule;

impl ValidationRule<AiccManifest> for CourseRequiredRule {
    fn validate(&self, manifest: &AiccManifest) -> ValidationResult {
        if manifest.course.is_some() {
            return ValidationResult::valid();
        }
        ValidationIssue::error(AICC_MISSING_COURSE, "AICC manifest must have a course", "course")
            .with_remediation("Add a [Course] section to the .crs file")
            .into()
    }

    fn rule_name(&self) -> &str {
        "CourseRequired"
    }

    fn spec_reference(&self) -> &str {
        "AICC CMI001 5.1.1 Course Description File"
    }
}

/// The course needs a non-blank `Course_Title`.
///
/// A missing course is reported by [`CourseRequiredRule`] alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleRequiredRule;

impl ValidationRule<AiccManifest> for TitleRequiredRule {
    fn validate(&self, manifest: &AiccManifest) -> ValidationResult {
        let Some(course) = &manifest.course else {
            return ValidationResult::valid();
        };
        if !is_blank(course.course_title.as_deref()) {
            return ValidationResult::valid();
        }
        ValidationIssue::error(AICC_MISSING_TITLE, "AICC course must have a title", "course/Course_Title")
            .with_remediation("Set Course_Title in the [Course] section")
            .into()
    }

    fn rule_name(&self) -> &str {
        "TitleRequired"
    }

    fn spec_reference(&self) -> &str {
        "AICC CMI001 5.1.1 Course_Title"
    }
}

/// The root assignable unit needs a non-blank `File_Name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchUrlRequiredRule;

impl ValidationRule<AiccManifest> for LaunchUrlRequiredRule {
    fn validate(&self, manifest: &AiccManifest) -> ValidationResult {
        if !is_blank(manifest.launch_url()) {
            return ValidationResult::valid();
        }
        let location = match &manifest.root_system_id {
            Some(id) => format!("au[{}]/File_Name", id),
            None => "au".to_string(),
        };
        ValidationIssue::error(AICC_MISSING_LAUNCH_URL, "AICC course must have a launch URL", location)
            .with_remediation("Set File_Name of the root assignable unit in the .au file")
            .into()
    }

    fn rule_name(&self) -> &str {
        "LaunchUrlRequired"
    }

    fn spec_reference(&self) -> &str {
        "AICC CMI001 5.1.3 Assignable Unit File"
    }
}

pub fn default_validator() -> Validator<AiccManifest> {
    Validator::new()
        .with_rule(CourseRequiredRule)
        .with_rule(TitleRequiredRule)
        .with_rule(LaunchUrlRequiredRule)
}
