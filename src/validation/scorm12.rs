//! SCORM 1.2 rules.

use super::scorm::{add_common_rules, organization_location, visit_items};
use super::{ValidationIssue, ValidationResult, ValidationRule, Validator};
use crate::scorm12::Scorm12Manifest;

pub const SCORM12_INVALID_MASTERY_SCORE: &str = "SCORM12_INVALID_MASTERY_SCORE";

/// `adlcp:masteryscore` must be a number from 0 to 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasteryScoreRule;

impl ValidationRule<Scorm12Manifest> for MasteryScoreRule {
    fn validate(&self, manifest: &Scorm12Manifest) -> ValidationResult {
        let mut issues = Vec::new();
        for organization in &manifest.organizations.organizations {
            visit_items(
                &organization.items,
                &organization_location(&organization.identifier),
                |item| item.identifier.as_str(),
                |item| item.items.as_slice(),
                &mut |item, location| {
                    let Some(raw) = item.mastery_score.as_deref() else {
                        return;
                    };
                    let in_range = item.mastery_score_value().is_some_and(|v| (0.0..=100.0).contains(&v));
                    if !in_range {
                        issues.push(
                            ValidationIssue::error(
                                SCORM12_INVALID_MASTERY_SCORE,
                                format!("Mastery score '{}' is not a number from 0 to 100", raw),
                                format!("{}/adlcp:masteryscore", location),
                            )
                            .with_remediation("Use a value between 0 and 100"),
                        );
                    }
                },
            );
        }
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "MasteryScore"
    }

    fn spec_reference(&self) -> &str {
        "SCORM 1.2 CAM 2.3.4 adlcp:masteryscore"
    }
}

pub fn default_validator() -> Validator<Scorm12Manifest> {
    add_common_rules(Validator::new()).with_rule(MasteryScoreRule)
}
