//! Rules shared by SCORM 1.2 and SCORM 2004.
//!
//! Both flavors build on IMS content packaging, so the structural checks
//! run against [`ContentPackage`], which each manifest type implements.

use super::{ValidationIssue, ValidationResult, ValidationRule};
use crate::common::is_blank;
use crate::cp::Resources;
use crate::scorm12::Scorm12Manifest;
use crate::scorm2004::Scorm2004Manifest;
use std::collections::{HashMap, HashSet};

pub const SCORM_MISSING_ORGANIZATION: &str = "SCORM_MISSING_ORGANIZATION";
pub const SCORM_INVALID_DEFAULT_ORGANIZATION: &str = "SCORM_INVALID_DEFAULT_ORGANIZATION";
pub const SCORM_DUPLICATE_IDENTIFIER: &str = "SCORM_DUPLICATE_IDENTIFIER";
pub const SCORM_PATH_TRAVERSAL: &str = "SCORM_PATH_TRAVERSAL";
pub const SCORM_ABSOLUTE_PATH: &str = "SCORM_ABSOLUTE_PATH";
pub const SCORM_ORPHANED_REFERENCE: &str = "SCORM_ORPHANED_REFERENCE";
pub const SCORM_UNREFERENCED_RESOURCE: &str = "SCORM_UNREFERENCED_RESOURCE";
pub const SCORM_MISSING_DEPENDENCY: &str = "SCORM_MISSING_DEPENDENCY";
pub const SCORM_MISSING_LAUNCH_HREF: &str = "SCORM_MISSING_LAUNCH_HREF";

/// An item of an organization tree, with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry<'a> {
    pub identifier: &'a str,
    pub identifier_ref: Option<&'a str>,
    pub location: String,
}

/// The content packaging structure common to both SCORM flavors.
pub trait ContentPackage: Send + Sync {
    fn manifest_identifier(&self) -> &str;

    /// The `default` attribute of `<organizations>`.
    fn default_organization_ref(&self) -> Option<&str>;

    fn organization_ids(&self) -> Vec<&str>;

    /// Every item of every organization, depth first.
    fn item_entries(&self) -> Vec<ItemEntry<'_>>;

    fn package_resources(&self) -> &Resources;
}

pub(crate) fn organization_location(identifier: &str) -> String {
    format!("organization[{}]", identifier)
}

pub(crate) fn resource_location(identifier: &str) -> String {
    format!("resource[{}]", identifier)
}

/// Visit `items` and their descendants depth first, with the location of each.
pub(crate) fn visit_items<'a, T>(
    items: &'a [T],
    parent: &str,
    identifier: fn(&T) -> &str,
    children: fn(&T) -> &[T],
    visit: &mut dyn FnMut(&'a T, &str),
) {
    for item in items {
        let location = format!("{}/item[{}]", parent, identifier(item));
        visit(item, &location);
        visit_items(children(item), &location, identifier, children, visit);
    }
}

macro_rules! impl_content_package {
    ($manifest:ty) => {
        impl ContentPackage for $manifest {
            fn manifest_identifier(&self) -> &str {
                &self.identifier
            }

            fn default_organization_ref(&self) -> Option<&str> {
                self.organizations.default.as_deref()
            }

            fn organization_ids(&self) -> Vec<&str> {
                self.organizations
                    .organizations
                    .iter()
                    .map(|o| o.identifier.as_str())
                    .collect()
            }

            fn item_entries(&self) -> Vec<ItemEntry<'_>> {
                let mut entries = Vec::new();
                for organization in &self.organizations.organizations {
                    visit_items(
                        &organization.items,
                        &organization_location(&organization.identifier),
                        |item| item.identifier.as_str(),
                        |item| item.items.as_slice(),
                        &mut |item, location| {
                            entries.push(ItemEntry {
                                identifier: &item.identifier,
                                identifier_ref: item.identifier_ref.as_deref(),
                                location: location.to_string(),
                            })
                        },
                    );
                }
                entries
            }

            fn package_resources(&self) -> &Resources {
                &self.resources
            }
        }
    };
}

impl_content_package!(Scorm12Manifest);
impl_content_package!(Scorm2004Manifest);

/// At least one `<organization>` must be declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizationRequiredRule;

impl<P: ContentPackage> ValidationRule<P> for OrganizationRequiredRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        if !manifest.organization_ids().is_empty() {
            return ValidationResult::valid();
        }
        ValidationIssue::error(
            SCORM_MISSING_ORGANIZATION,
            "Manifest must declare at least one organization",
            "organizations",
        )
        .with_remediation("Add an <organization> describing the course structure")
        .into()
    }

    fn rule_name(&self) -> &str {
        "OrganizationRequired"
    }

    fn spec_reference(&self) -> &str {
        "SCORM CAM 3.4.1.6 <organizations>"
    }
}

/// `<organizations default>` must name a declared organization.
///
/// Packages without organizations are left to [`OrganizationRequiredRule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOrganizationRule;

impl<P: ContentPackage> ValidationRule<P> for DefaultOrganizationRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let ids = manifest.organization_ids();
        let default = manifest.default_organization_ref();
        if ids.is_empty() || is_blank(default) {
            return ValidationResult::valid();
        }
        let default = default.unwrap_or_default().trim();
        if ids.contains(&default) {
            return ValidationResult::valid();
        }
        ValidationIssue::error(
            SCORM_INVALID_DEFAULT_ORGANIZATION,
            format!("Default organization '{}' is not declared", default),
            "organizations@default",
        )
        .with_remediation(format!("Use one of: {}", ids.join(", ")))
        .into()
    }

    fn rule_name(&self) -> &str {
        "DefaultOrganization"
    }

    fn spec_reference(&self) -> &str {
        "SCORM CAM 3.4.1.6 <organizations> default attribute"
    }
}

/// Identifiers of the manifest, organizations, items and resources must be
/// unique across the manifest.
///
/// One issue is reported per repeated occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateIdentifierRule;

impl<P: ContentPackage> ValidationRule<P> for DuplicateIdentifierRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let mut declared: Vec<(&str, String)> = vec![(manifest.manifest_identifier(), "manifest".to_string())];
        declared.extend(
            manifest
                .organization_ids()
                .into_iter()
                .map(|id| (id, organization_location(id))),
        );
        declared.extend(
            manifest
                .item_entries()
                .into_iter()
                .map(|entry| (entry.identifier, entry.location)),
        );
        declared.extend(
            manifest
                .package_resources()
                .iter()
                .map(|r| (r.identifier.as_str(), resource_location(&r.identifier))),
        );

        let mut first_seen: HashMap<&str, String> = HashMap::new();
        let mut result = ValidationResult::valid();
        for (identifier, location) in declared {
            if identifier.trim().is_empty() {
                continue;
            }
            match first_seen.get(identifier) {
                Some(first) => {
                    result = result.merge(
                        ValidationIssue::error(
                            SCORM_DUPLICATE_IDENTIFIER,
                            format!("Identifier '{}' is already declared at {}", identifier, first),
                            location,
                        )
                        .with_remediation("Give every element a unique identifier")
                        .into(),
                    );
                },
                None => {
                    first_seen.insert(identifier, location);
                },
            }
        }
        result
    }

    fn rule_name(&self) -> &str {
        "DuplicateIdentifier"
    }

    fn spec_reference(&self) -> &str {
        "IMS CP 1.1.4 identifier uniqueness"
    }
}

/// Classification of a package-relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathProblem {
    Traversal,
    Absolute,
}

fn has_uri_scheme(path: &str) -> Option<&str> {
    let (scheme, _) = path.split_once(':')?;
    let valid = scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn check_path(path: &str) -> Option<PathProblem> {
    let path = path.trim();
    if let Some(scheme) = has_uri_scheme(path) {
        // Remote content is not part of the package.
        return scheme.eq_ignore_ascii_case("file").then_some(PathProblem::Absolute);
    }
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || path.starts_with('\\') || drive {
        return Some(PathProblem::Absolute);
    }
    let decoded = path.replace("%2e", ".").replace("%2E", ".");
    decoded
        .split(['/', '\\'])
        .any(|segment| segment == "..")
        .then_some(PathProblem::Traversal)
}

/// Resource and file paths must stay inside the package.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSecurityRule;

impl<P: ContentPackage> ValidationRule<P> for PathSecurityRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let mut result = ValidationResult::valid();
        for resource in manifest.package_resources() {
            let base = resource_location(&resource.identifier);
            let paths = resource
                .href
                .iter()
                .map(|href| (href.as_str(), format!("{}@href", base)))
                .chain(
                    resource
                        .files
                        .iter()
                        .map(|file| (file.href.as_str(), format!("{}/file[{}]", base, file.href))),
                );
            for (path, location) in paths {
                let issue = match check_path(path) {
                    Some(PathProblem::Traversal) => ValidationIssue::error(
                        SCORM_PATH_TRAVERSAL,
                        format!("Path '{}' escapes the package root", path),
                        location,
                    ),
                    Some(PathProblem::Absolute) => ValidationIssue::error(
                        SCORM_ABSOLUTE_PATH,
                        format!("Path '{}' is absolute", path),
                        location,
                    ),
                    None => continue,
                };
                result = result.merge(issue.with_remediation("Use a path relative to the package root").into());
            }
        }
        result
    }

    fn rule_name(&self) -> &str {
        "PathSecurity"
    }

    fn spec_reference(&self) -> &str {
        "IMS CP 1.1.4 <file> href"
    }
}

/// Every item `identifierref` must name a declared resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanedReferenceRule;

impl<P: ContentPackage> ValidationRule<P> for OrphanedReferenceRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let resources = manifest.package_resources();
        manifest
            .item_entries()
            .into_iter()
            .filter_map(|entry| {
                let target = entry.identifier_ref?;
                if resources.get(target).is_some() {
                    return None;
                }
                Some(
                    ValidationIssue::error(
                        SCORM_ORPHANED_REFERENCE,
                        format!("Item '{}' references missing resource '{}'", entry.identifier, target),
                        entry.location,
                    )
                    .with_remediation("Declare the resource or fix the identifierref"),
                )
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "OrphanedReference"
    }

    fn spec_reference(&self) -> &str {
        "SCORM CAM 3.4.1.12 <item> identifierref"
    }
}

/// Resources that no item or dependency refers to.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreferencedResourceRule;

impl<P: ContentPackage> ValidationRule<P> for UnreferencedResourceRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let resources = manifest.package_resources();
        let mut referenced: HashSet<&str> = manifest
            .item_entries()
            .into_iter()
            .filter_map(|entry| entry.identifier_ref)
            .collect();
        referenced.extend(resources.iter().flat_map(|r| r.dependencies.iter().map(String::as_str)));

        resources
            .iter()
            .filter(|r| !referenced.contains(r.identifier.as_str()))
            .map(|r| {
                ValidationIssue::warning(
                    SCORM_UNREFERENCED_RESOURCE,
                    format!("Resource '{}' is not referenced by any item", r.identifier),
                    resource_location(&r.identifier),
                )
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "UnreferencedResource"
    }

    fn spec_reference(&self) -> &str {
        "SCORM CAM 3.4.1.16 <resource>"
    }
}

/// Every `<dependency identifierref>` must name a declared resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyRule;

impl<P: ContentPackage> ValidationRule<P> for DependencyRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        let resources = manifest.package_resources();
        resources
            .iter()
            .flat_map(|r| r.dependencies.iter().map(move |d| (r, d)))
            .filter(|(_, dependency)| resources.get(dependency).is_none())
            .map(|(resource, dependency)| {
                ValidationIssue::error(
                    SCORM_MISSING_DEPENDENCY,
                    format!("Resource '{}' depends on missing resource '{}'", resource.identifier, dependency),
                    format!("{}/dependency[{}]", resource_location(&resource.identifier), dependency),
                )
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "Dependency"
    }

    fn spec_reference(&self) -> &str {
        "IMS CP 1.1.4 <dependency>"
    }
}

/// SCO resources must have an `href` to launch.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchHrefRule;

impl<P: ContentPackage> ValidationRule<P> for LaunchHrefRule {
    fn validate(&self, manifest: &P) -> ValidationResult {
        manifest
            .package_resources()
            .iter()
            .filter(|r| r.is_sco() && is_blank(r.href.as_deref()))
            .map(|r| {
                ValidationIssue::error(
                    SCORM_MISSING_LAUNCH_HREF,
                    format!("SCO resource '{}' has no href", r.identifier),
                    resource_location(&r.identifier),
                )
                .with_remediation("Set href to the launch page of the SCO")
            })
            .collect()
    }

    fn rule_name(&self) -> &str {
        "LaunchHref"
    }

    fn spec_reference(&self) -> &str {
        "SCORM CAM 3.4.1.16 <resource> href"
    }
}

/// Add the shared rules to a validator.
pub fn add_common_rules<P: ContentPackage + 'static>(validator: super::Validator<P>) -> super::Validator<P> {
    validator
        .with_rule(OrganizationRequiredRule)
        .with_rule(DefaultOrganizationRule)
        .with_rule(DuplicateIdentifierRule)
        .with_rule(PathSecurityRule)
        .with_rule(OrphanedReferenceRule)
        .with_rule(UnreferencedResourceRule)
        .with_rule(DependencyRule)
        .with_rule(LaunchHrefRule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path() {
        assert_eq!(check_path("index.html"), None);
        assert_eq!(check_path("lessons/one/index.html"), None);
        assert_eq!(check_path("https://cdn.example.com/lib.js"), None);
        assert_eq!(check_path("a..b/c.html"), None);
        assert_eq!(check_path("../secret.html"), Some(PathProblem::Traversal));
        assert_eq!(check_path("lessons\\..\\..\\x"), Some(PathProblem::Traversal));
        assert_eq!(check_path("a/%2e%2e/b"), Some(PathProblem::Traversal));
        assert_eq!(check_path("/etc/passwd"), Some(PathProblem::Absolute));
        assert_eq!(check_path("C:\\course\\index.html"), Some(PathProblem::Absolute));
        assert_eq!(check_path("file:///etc/passwd"), Some(PathProblem::Absolute));
    }
}
