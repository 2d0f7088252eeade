//! SCORM 2004 rules.
//!
//! Sequencing checks look at the sequencing in effect for each activity,
//! that is the local declaration with any `IDRef` collection entry applied.

use super::scorm::{add_common_rules, organization_location, visit_items};
use super::{ValidationIssue, ValidationResult, ValidationRule, Validator};
use crate::scorm2004::{CompletionThreshold, Scorm2004Manifest, Sequencing};
use std::collections::HashSet;
use std::ops::RangeInclusive;

pub const SCORM2004_UNDECLARED_OBJECTIVE: &str = "SCORM2004_UNDECLARED_OBJECTIVE";
pub const SCORM2004_DUPLICATE_OBJECTIVE: &str = "SCORM2004_DUPLICATE_OBJECTIVE";
pub const SCORM2004_UNRESOLVED_SEQUENCING_REF: &str = "SCORM2004_UNRESOLVED_SEQUENCING_REF";
pub const SCORM2004_VALUE_OUT_OF_RANGE: &str = "SCORM2004_VALUE_OUT_OF_RANGE";

const UNIT: RangeInclusive<f64> = 0.0..=1.0;
const SIGNED_UNIT: RangeInclusive<f64> = -1.0..=1.0;

/// An organization or item, as an activity of the activity tree.
struct Activity<'a> {
    location: String,
    sequencing: Option<&'a Sequencing>,
    completion_threshold: Option<&'a CompletionThreshold>,
}

fn activities(manifest: &Scorm2004Manifest) -> Vec<Activity<'_>> {
    let mut out = Vec::new();
    for organization in &manifest.organizations.organizations {
        let location = organization_location(&organization.identifier);
        out.push(Activity {
            location: location.clone(),
            sequencing: organization.sequencing.as_ref(),
            completion_threshold: organization.completion_threshold.as_ref(),
        });
        visit_items(
            &organization.items,
            &location,
            |item| item.identifier.as_str(),
            |item| item.items.as_slice(),
            &mut |item, location| {
                out.push(Activity {
                    location: location.to_string(),
                    sequencing: item.sequencing.as_ref(),
                    completion_threshold: item.completion_threshold.as_ref(),
                })
            },
        );
    }
    out
}

/// Rule conditions may only reference objectives declared for the activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveReferenceRule;

impl ValidationRule<Scorm2004Manifest> for ObjectiveReferenceRule {
    fn validate(&self, manifest: &Scorm2004Manifest) -> ValidationResult {
        let mut issues = Vec::new();
        for activity in activities(manifest) {
            let Some(sequencing) = activity.sequencing else {
                continue;
            };
            let effective = manifest.effective_sequencing(sequencing);
            let declared = |id: &str| effective.objectives.as_ref().is_some_and(|o| o.declares(id));
            let mut reported = HashSet::new();
            for id in effective.referenced_objectives() {
                if declared(id) || !reported.insert(id) {
                    continue;
                }
                issues.push(
                    ValidationIssue::error(
                        SCORM2004_UNDECLARED_OBJECTIVE,
                        format!("Rule condition references undeclared objective '{}'", id),
                        format!("{}/sequencing", activity.location),
                    )
                    .with_remediation("Declare the objective in <imsss:objectives> of the same activity"),
                );
            }
        }
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "ObjectiveReference"
    }

    fn spec_reference(&self) -> &str {
        "SCORM 2004 SN 5.1.2 referencedObjective"
    }
}

/// Objective IDs must be unique within an activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateObjectiveRule;

impl ValidationRule<Scorm2004Manifest> for DuplicateObjectiveRule {
    fn validate(&self, manifest: &Scorm2004Manifest) -> ValidationResult {
        let mut issues = Vec::new();
        for activity in activities(manifest) {
            let Some(sequencing) = activity.sequencing else {
                continue;
            };
            let effective = manifest.effective_sequencing(sequencing);
            let Some(objectives) = &effective.objectives else {
                continue;
            };
            let mut seen = HashSet::new();
            for id in objectives.all().filter_map(|o| o.objective_id.as_deref()) {
                if !seen.insert(id) {
                    issues.push(ValidationIssue::error(
                        SCORM2004_DUPLICATE_OBJECTIVE,
                        format!("Objective '{}' is declared more than once", id),
                        format!("{}/sequencing/objectives", activity.location),
                    ));
                }
            }
        }
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "DuplicateObjective"
    }

    fn spec_reference(&self) -> &str {
        "SCORM 2004 CAM 5.1.6 objectiveID"
    }
}

/// `IDRef` must name an entry of `<imsss:sequencingCollection>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequencingReferenceRule;

impl ValidationRule<Scorm2004Manifest> for SequencingReferenceRule {
    fn validate(&self, manifest: &Scorm2004Manifest) -> ValidationResult {
        activities(manifest)
            .into_iter()
            .filter_map(|activity| {
                let id_ref = activity.sequencing?.id_ref.as_deref()?;
                if manifest.collection_entry(id_ref).is_some() {
                    return None;
                }
                Some(
                    ValidationIssue::error(
                        SCORM2004_UNRESOLVED_SEQUENCING_REF,
                        format!("Sequencing IDRef '{}' does not match any collection entry", id_ref),
                        format!("{}/sequencing@IDRef", activity.location),
                    )
                    .with_remediation("Add the entry to <imsss:sequencingCollection> or fix the IDRef"),
                )
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "SequencingReference"
    }

    fn spec_reference(&self) -> &str {
        "SCORM 2004 CAM 5.1.1 <sequencingCollection>"
    }
}

/// Measures, weights and percentages must lie in their defined ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueRangeRule;

fn check_range(
    issues: &mut Vec<ValidationIssue>,
    value: f64,
    range: &RangeInclusive<f64>,
    name: &str,
    location: &str,
) {
    if !range.contains(&value) {
        issues.push(ValidationIssue::error(
            SCORM2004_VALUE_OUT_OF_RANGE,
            format!(
                "{} is {}, expected {} to {}",
                name,
                value,
                range.start(),
                range.end()
            ),
            location.to_string(),
        ));
    }
}

fn check_sequencing(issues: &mut Vec<ValidationIssue>, sequencing: &Sequencing, location: &str) {
    if let Some(objectives) = &sequencing.objectives {
        for objective in objectives.all() {
            check_range(
                issues,
                objective.min_normalized_measure,
                &SIGNED_UNIT,
                "minNormalizedMeasure",
                &format!(
                    "{}/objective[{}]",
                    location,
                    objective.objective_id.as_deref().unwrap_or_default()
                ),
            );
        }
    }
    if let Some(rules) = &sequencing.sequencing_rules {
        for condition in rules.all().flat_map(|rule| &rule.conditions.conditions) {
            check_range(issues, condition.measure_threshold, &SIGNED_UNIT, "measureThreshold", location);
        }
    }
    if let Some(rollup) = &sequencing.rollup_rules {
        check_range(issues, rollup.objective_measure_weight, &UNIT, "objectiveMeasureWeight", location);
        for rule in &rollup.rules {
            check_range(issues, rule.minimum_percent, &UNIT, "minimumPercent", location);
        }
    }
}

impl ValidationRule<Scorm2004Manifest> for ValueRangeRule {
    fn validate(&self, manifest: &Scorm2004Manifest) -> ValidationResult {
        let mut issues = Vec::new();
        for activity in activities(manifest) {
            if let Some(threshold) = activity.completion_threshold {
                let location = format!("{}/completionThreshold", activity.location);
                check_range(&mut issues, threshold.min_progress_measure, &UNIT, "minProgressMeasure", &location);
                check_range(&mut issues, threshold.progress_weight, &UNIT, "progressWeight", &location);
            }
            if let Some(sequencing) = activity.sequencing {
                check_sequencing(&mut issues, sequencing, &format!("{}/sequencing", activity.location));
            }
        }
        for entry in &manifest.sequencing_collection {
            let location = format!(
                "sequencingCollection/sequencing[{}]",
                entry.id.as_deref().unwrap_or_default()
            );
            check_sequencing(&mut issues, entry, &location);
        }
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "ValueRange"
    }

    fn spec_reference(&self) -> &str {
        "SCORM 2004 CAM 5.1 value spaces"
    }
}

pub fn default_validator() -> Validator<Scorm2004Manifest> {
    add_common_rules(Validator::new())
        .with_rule(ObjectiveReferenceRule)
        .with_rule(DuplicateObjectiveRule)
        .with_rule(SequencingReferenceRule)
        .with_rule(ValueRangeRule)
}
