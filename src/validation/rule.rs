//! Rules and the validators that fold them.

use super::result::ValidationResult;
use std::fmt;

/// A stateless check over one kind of manifest.
///
/// Rules report problems through the returned [`ValidationResult`] and never
/// fail. A rule whose precondition is covered by another rule returns
/// [`ValidationResult::valid`] when that precondition does not hold.
pub trait ValidationRule<M: ?Sized>: Send + Sync {
    fn validate(&self, manifest: &M) -> ValidationResult;

    /// Short name used in logs.
    fn rule_name(&self) -> &str;

    /// The section of the packaging standard the rule enforces.
    fn spec_reference(&self) -> &str;
}

/// An ordered list of rules for one kind of manifest.
///
/// Every rule runs on every call; issues accumulate in rule order.
pub struct Validator<M: ?Sized> {
    rules: Vec<Box<dyn ValidationRule<M>>>,
}

impl<M: ?Sized> Validator<M> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ValidationRule<M> + 'static) -> Self {
        self.add_rule(rule);
        self
    }

    pub fn add_rule(&mut self, rule: impl ValidationRule<M> + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn ValidationRule<M>> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate(&self, manifest: &M) -> ValidationResult {
        let result = self.rules.iter().fold(ValidationResult::valid(), |acc, rule| {
            let found = rule.validate(manifest);
            if !found.is_empty() {
                tracing::trace!(rule = rule.rule_name(), issues = found.len(), "rule reported issues");
            }
            acc.merge(found)
        });
        tracing::debug!(rules = self.rules.len(), issues = result.len(), valid = result.is_valid(), "validated manifest");
        result
    }
}

impl<M: ?Sized> Default for Validator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> fmt::Debug for Validator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter().map(|r| r.rule_name())).finish()
    }
}
