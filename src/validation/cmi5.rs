//! cmi5 course structure rules.

use super::{ValidationIssue, ValidationResult, ValidationRule, Validator};
use crate::cmi5::{AssignableUnit, Cmi5Manifest, CourseNode};
use crate::common::is_blank;
use crate::manifest::PackageManifest;
use std::collections::HashMap;

pub const CMI5_MISSING_TITLE: &str = "CMI5_MISSING_TITLE";
pub const CMI5_MISSING_LAUNCH_URL: &str = "CMI5_MISSING_LAUNCH_URL";
pub const CMI5_MISSING_AU_URL: &str = "CMI5_MISSING_AU_URL";
pub const CMI5_DUPLICATE_ID: &str = "CMI5_DUPLICATE_ID";
pub const CMI5_UNDECLARED_OBJECTIVE: &str = "CMI5_UNDECLARED_OBJECTIVE";
pub const CMI5_INVALID_MASTERY_SCORE: &str = "CMI5_INVALID_MASTERY_SCORE";

/// Blocks and AUs with their locations, depth first.
fn walk<'a>(nodes: &'a [CourseNode], parent: &str, visit: &mut dyn FnMut(&'a CourseNode, &str)) {
    for node in nodes {
        let location = match node {
            CourseNode::Au(au) => format!("{}au[{}]", parent, au.id),
            CourseNode::Block(block) => format!("{}block[{}]", parent, block.id),
        };
        visit(node, &location);
        if let CourseNode::Block(block) = node {
            walk(&block.children, &format!("{}/", location), visit);
        }
    }
}

fn located_aus(manifest: &Cmi5Manifest) -> Vec<(&AssignableUnit, String)> {
    let mut out = Vec::new();
    walk(&manifest.children, "", &mut |node, location| {
        if let CourseNode::Au(au) = node {
            out.push((au, location.to_string()));
        }
    });
    out
}

/// The course needs a non-blank title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleRequiredRule;

impl ValidationRule<Cmi5Manifest> for TitleRequiredRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        if !is_blank(manifest.title()) {
            return ValidationResult::valid();
        }
        ValidationIssue::error(CMI5_MISSING_TITLE, "cmi5 course must have a title", "course/title")
            .with_remediation("Add a <langstring> to the course <title>")
            .into()
    }

    fn rule_name(&self) -> &str {
        "TitleRequired"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.2 Course Metadata"
    }
}

/// The course needs at least one AU to launch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchUrlRequiredRule;

impl ValidationRule<Cmi5Manifest> for LaunchUrlRequiredRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        if !is_blank(manifest.launch_url()) {
            return ValidationResult::valid();
        }
        ValidationIssue::error(CMI5_MISSING_LAUNCH_URL, "cmi5 course must have a launch URL", "course")
            .with_remediation("Give the first AU a <url>")
            .into()
    }

    fn rule_name(&self) -> &str {
        "LaunchUrlRequired"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.4 AU Metadata"
    }
}

/// Every AU needs a `<url>`.
///
/// The first AU is covered by [`LaunchUrlRequiredRule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AuUrlRule;

impl ValidationRule<Cmi5Manifest> for AuUrlRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        located_aus(manifest)
            .into_iter()
            .skip(1)
            .filter(|(au, _)| is_blank(au.url.as_deref()))
            .map(|(au, location)| {
                ValidationIssue::error(CMI5_MISSING_AU_URL, format!("AU '{}' has no url", au.id), location)
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "AuUrl"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.4 AU Metadata url"
    }
}

/// IDs of the course, objectives, blocks and AUs must be unique.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateIdRule;

impl ValidationRule<Cmi5Manifest> for DuplicateIdRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        let mut declared: Vec<(&str, String)> = Vec::new();
        if let Some(id) = manifest.course.id.as_deref() {
            declared.push((id, "course".to_string()));
        }
        declared.extend(
            manifest
                .objectives
                .iter()
                .map(|o| (o.id.as_str(), format!("objective[{}]", o.id))),
        );
        walk(&manifest.children, "", &mut |node, location| {
            declared.push((node.id(), location.to_string()))
        });

        let mut first_seen: HashMap<&str, String> = HashMap::new();
        let mut issues = Vec::new();
        for (id, location) in declared {
            if id.trim().is_empty() {
                continue;
            }
            if let Some(first) = first_seen.get(id) {
                issues.push(ValidationIssue::error(
                    CMI5_DUPLICATE_ID,
                    format!("ID '{}' is already used at {}", id, first),
                    location,
                ));
            } else {
                first_seen.insert(id, location);
            }
        }
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "DuplicateId"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.1 Course Structure identifiers"
    }
}

/// Objective references of blocks and AUs must name a course objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveReferenceRule;

impl ValidationRule<Cmi5Manifest> for ObjectiveReferenceRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        let mut issues = Vec::new();
        walk(&manifest.children, "", &mut |node, location| {
            let refs = match node {
                CourseNode::Au(au) => &au.objectives,
                CourseNode::Block(block) => &block.objectives,
            };
            for idref in refs.iter().filter(|id| !manifest.declares_objective(id)) {
                issues.push(ValidationIssue::error(
                    CMI5_UNDECLARED_OBJECTIVE,
                    format!("Objective '{}' is not declared by the course", idref),
                    format!("{}/objectives", location),
                ));
            }
        });
        ValidationResult::from_issues(issues)
    }

    fn rule_name(&self) -> &str {
        "ObjectiveReference"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.3 Objective Metadata"
    }
}

/// `masteryScore` must lie between 0 and 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasteryScoreRule;

impl ValidationRule<Cmi5Manifest> for MasteryScoreRule {
    fn validate(&self, manifest: &Cmi5Manifest) -> ValidationResult {
        located_aus(manifest)
            .into_iter()
            .filter_map(|(au, location)| {
                let score = au.mastery_score?;
                if (0.0..=1.0).contains(&score) {
                    return None;
                }
                Some(
                    ValidationIssue::error(
                        CMI5_INVALID_MASTERY_SCORE,
                        format!("Mastery score {} is outside 0 to 1", score),
                        format!("{}@masteryScore", location),
                    )
                    .with_remediation("Express the mastery score as a fraction, e.g. 0.8"),
                )
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "MasteryScore"
    }

    fn spec_reference(&self) -> &str {
        "cmi5 13.1.4 AU Metadata masteryScore"
    }
}

pub fn default_validator() -> Validator<Cmi5Manifest> {
    Validator::new()
        .with_rule(TitleRequiredRule)
        .with_rule(LaunchUrlRequiredRule)
        .with_rule(AuUrlRule)
        .with_rule(DuplicateIdRule)
        .with_rule(ObjectiveReferenceRule)
        .with_rule(MasteryScoreRule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmi5::{Block, Cmi5Course, Cmi5Objective};
    use crate::lom::LangString;

    fn au(id: &str, url: Option<&str>) -> AssignableUnit {
        AssignableUnit {
            id: id.to_string(),
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    fn course(children: Vec<CourseNode>) -> Cmi5Manifest {
        Cmi5Manifest {
            course: Cmi5Course {
                id: Some("course".to_string()),
                title: vec![LangString::new("Course")],
                description: Vec::new(),
            },
            objectives: vec![Cmi5Objective {
                id: "obj".to_string(),
                ..Default::default()
            }],
            children,
        }
    }

    #[test]
    fn test_valid_course() {
        let mut first = au("au1", Some("a.html"));
        first.objectives = vec!["obj".to_string()];
        first.mastery_score = Some(0.75);
        let manifest = course(vec![CourseNode::Au(first), CourseNode::Au(au("au2", Some("b.html")))]);
        assert!(default_validator().validate(&manifest).is_empty());
    }

    #[test]
    fn test_missing_urls() {
        let manifest = course(vec![CourseNode::Au(au("au1", None)), CourseNode::Au(au("au2", Some(" ")))]);
        let result = default_validator().validate(&manifest);
        assert_eq!(result.count(CMI5_MISSING_LAUNCH_URL), 1);
        assert_eq!(result.count(CMI5_MISSING_AU_URL), 1);
        assert_eq!(result.issues()[1].location, "au[au2]");
    }

    #[test]
    fn test_nested_problems_are_located() {
        let mut inner = au("course", Some("c.html"));
        inner.objectives = vec!["nope".to_string()];
        inner.mastery_score = Some(80.0);
        let manifest = course(vec![
            CourseNode::Au(au("au1", Some("a.html"))),
            CourseNode::Block(Block {
                id: "b1".to_string(),
                children: vec![CourseNode::Au(inner)],
                ..Default::default()
            }),
        ]);
        let result = default_validator().validate(&manifest);
        let locations: Vec<_> = result.issues().iter().map(|i| (i.code.as_str(), i.location.as_str())).collect();
        assert_eq!(
            locations,
            [
                (CMI5_DUPLICATE_ID, "block[b1]/au[course]"),
                (CMI5_UNDECLARED_OBJECTIVE, "block[b1]/au[course]/objectives"),
                (CMI5_INVALID_MASTERY_SCORE, "block[b1]/au[course]@masteryScore"),
            ]
        );
    }

    #[test]
    fn test_missing_title() {
        let mut manifest = course(vec![CourseNode::Au(au("au1", Some("a.html")))]);
        manifest.course.title = vec![LangString::new("  ")];
        let result = default_validator().validate(&manifest);
        assert_eq!(result.len(), 1);
        assert!(result.has_code(CMI5_MISSING_TITLE));
    }
}
