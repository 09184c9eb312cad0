//! Validation results.

use crate::core::field::{FieldId, FieldRef};
use crate::core::rule::RuleInstance;
use std::fmt;
use std::sync::Arc;

/// A failed rule on a field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    field: FieldRef,
    rule: Arc<RuleInstance>,
}

impl ValidationError {
    pub fn new(field: FieldRef, rule: Arc<RuleInstance>) -> Self {
        Self { field, rule }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn rule(&self) -> &RuleInstance {
        &self.rule
    }

    /// Message of the failed rule.
    pub fn message(&self) -> &str {
        self.rule.message()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.name(), self.rule.message())
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Failures up to the requested boundary, in evaluation order.
    pub errors: Vec<ValidationError>,
    /// Some field past the boundary also failed.
    pub has_more_errors: bool,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// No failures anywhere.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.has_more_errors
    }

    /// Failures of one field.
    pub fn errors_for(&self, id: FieldId) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |error| error.field.id() == id)
    }

    /// Messages of one field's failures joined by newlines.
    pub fn collated_message(&self, id: FieldId) -> Option<String> {
        let messages: Vec<&str> = self.errors_for(id).map(ValidationError::message).collect();
        if messages.is_empty() {
            None
        } else {
            Some(messages.join("\n"))
        }
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        match (self.errors.len(), self.has_more_errors) {
            (0, false) => "✓ All fields are valid".to_string(),
            (0, true) => "✗ Fields after the boundary are invalid".to_string(),
            (n, false) => format!("✗ Validation failed with {} error(s)", n),
            (n, true) => format!(
                "✗ Validation failed with {} error(s), more after the boundary",
                n
            ),
        }
    }

    /// One line per failure.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, error)| format!("{}. {}", i + 1, error))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::HeadlessField;
    use crate::core::rule::QuickRule;

    fn failure(field: &FieldRef, message: &str) -> ValidationError {
        let rule = QuickRule::new(message, |_| false).into_instance();
        ValidationError::new(field.clone(), Arc::new(rule))
    }

    #[test]
    fn test_success_requires_no_hidden_errors() {
        let mut report = ValidationReport::new();
        assert!(report.is_success());
        report.has_more_errors = true;
        assert!(!report.is_success());
    }

    #[test]
    fn test_collated_message() {
        let name: FieldRef = HeadlessField::text_input("name");
        let age: FieldRef = HeadlessField::text_input("age");

        let mut report = ValidationReport::new();
        report.add_error(failure(&name, "Required"));
        report.add_error(failure(&age, "Too young"));
        report.add_error(failure(&name, "Too short"));

        assert_eq!(report.collated_message(name.id()).as_deref(), Some("Required\nToo short"));
        assert_eq!(report.errors_for(age.id()).count(), 1);
        assert!(report.summary().contains("3 error(s)"));
        assert_eq!(report.detailed_errors()[1], "2. age: Too young");
    }
}
