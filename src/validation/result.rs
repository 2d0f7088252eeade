//! Validation issues and their aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious an issue is.
///
/// Only errors make a result invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single problem found in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `AICC_MISSING_TITLE`
    pub code: String,
    pub message: String,
    /// Where in the manifest, e.g. `organization[ORG]/item[I1]`
    pub location: String,
    /// Hint on how to fix the problem
    pub remediation: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: impl Into<String>, message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            location: location.into(),
            remediation: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, location)
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}: {}", self.severity, self.code, self.location, self.message)?;
        if let Some(remediation) = &self.remediation {
            write!(f, " ({})", remediation)?;
        }
        Ok(())
    }
}

/// Issues found by one or more rules, in the order they were reported.
///
/// [`ValidationResult::valid`] is the identity of [`ValidationResult::merge`],
/// and merging is associative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// A result without issues.
    pub fn valid() -> Self {
        Self::default()
    }

    /// A result holding a single issue.
    pub fn of(issue: ValidationIssue) -> Self {
        Self { issues: vec![issue] }
    }

    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Concatenate the issues of both results.
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.issues.extend(other.issues);
        self
    }

    /// `true` when no issue has error severity.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Number of issues carrying `code`.
    pub fn count(&self, code: &str) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl From<ValidationIssue> for ValidationResult {
    fn from(issue: ValidationIssue) -> Self {
        Self::of(issue)
    }
}

impl FromIterator<ValidationIssue> for ValidationResult {
    fn from_iter<T: IntoIterator<Item = ValidationIssue>>(iter: T) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<T: IntoIterator<Item = ValidationResult>>(iter: T) -> Self {
        iter.into_iter().fold(ValidationResult::valid(), ValidationResult::merge)
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn issue_strategy() -> impl Strategy<Value = ValidationIssue> {
        ("[A-Z_]{3,12}", "[a-z ]{0,20}", any::<bool>()).prop_map(|(code, message, error)| {
            if error {
                ValidationIssue::error(code, message, "manifest")
            } else {
                ValidationIssue::warning(code, message, "manifest")
            }
        })
    }

    fn result_strategy() -> impl Strategy<Value = ValidationResult> {
        prop::collection::vec(issue_strategy(), 0..5).prop_map(ValidationResult::from_issues)
    }

    proptest! {
        #[test]
        fn prop_merge_is_associative(a in result_strategy(), b in result_strategy(), c in result_strategy()) {
            let left = a.clone().merge(b.clone()).merge(c.clone());
            let right = a.merge(b.merge(c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_valid_is_identity(x in result_strategy()) {
            prop_assert_eq!(ValidationResult::valid().merge(x.clone()), x.clone());
            prop_assert_eq!(x.clone().merge(ValidationResult::valid()), x);
        }
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let result = ValidationResult::of(ValidationIssue::warning("W", "just a warning", "manifest"));
        assert!(result.is_valid());
        assert_eq!(result.warnings().count(), 1);

        let result = result.merge(ValidationIssue::error("E", "broken", "manifest").into());
        assert!(!result.is_valid());
        assert_eq!(result.errors().count(), 1);
        assert!(result.has_code("E"));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_merge_keeps_insertion_order() {
        let result: ValidationResult = ["A", "B", "C"]
            .into_iter()
            .map(|code| ValidationResult::of(ValidationIssue::error(code, "", "")))
            .collect();
        let codes: Vec<_> = result.issues().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, ["A", "B", "C"]);
    }

    #[test]
    fn test_display() {
        let issue = ValidationIssue::error("AICC_MISSING_TITLE", "AICC course must have a title", "course")
            .with_remediation("Set Course_Title in the .crs file");
        assert_eq!(
            issue.to_string(),
            "[error] AICC_MISSING_TITLE at course: AICC course must have a title (Set Course_Title in the .crs file)"
        );
    }
}
