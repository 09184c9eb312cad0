//! One evaluation pass over a field/rule map.

use crate::core::context::ValidationContext;
use crate::core::error::ConfigError;
use crate::core::field::{is_interactable, FieldRef};
use crate::core::report::{ValidationError, ValidationReport};
use crate::core::rule::RuleCheck;
use crate::core::types::Value;
use crate::validation::rule_map::{Binding, FieldEntry, FieldRuleMap};
use crate::validation::validator::Mode;
use log::trace;

/// Parameters of a single pass.
pub(crate) struct Pass<'a> {
    pub map: &'a FieldRuleMap,
    pub mode: Mode,
    /// Failures are reported for the first `limit` fields only.
    pub limit: usize,
    pub validate_hidden: bool,
    /// Polled before each field.
    pub is_cancelled: &'a dyn Fn() -> bool,
}

impl<'a> Pass<'a> {
    /// A pass over the whole map.
    pub fn full(map: &'a FieldRuleMap, mode: Mode, validate_hidden: bool) -> Self {
        Self {
            map,
            mode,
            limit: map.len(),
            validate_hidden,
            is_cancelled: &never,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_cancellation(mut self, is_cancelled: &'a dyn Fn() -> bool) -> Self {
        self.is_cancelled = is_cancelled;
        self
    }

    /// Evaluate every reachable field and collect failures.
    pub fn run(&self) -> Result<PassOutcome, ConfigError> {
        let ctx = ValidationContext::new(self.map);
        let mut report = ValidationReport::new();
        let mut passed = Vec::new();

        for (index, entry) in self.map.entries().enumerate() {
            if (self.is_cancelled)() {
                trace!("Pass cancelled before field '{}'", entry.field.name());
                break;
            }

            if !is_interactable(&*entry.field, self.validate_hidden) {
                trace!("Skipping non-interactable field '{}'", entry.field.name());
                continue;
            }
            if entry.optional && entry.is_blank() {
                trace!("Skipping blank optional field '{}'", entry.field.name());
                continue;
            }

            let reporting = index < self.limit;
            let mut field_failed = false;

            for binding in &entry.bindings {
                let passed = evaluate_binding(entry, binding, &ctx)?;
                trace!(
                    "Field '{}' rule '{}': {}",
                    entry.field.name(),
                    binding.rule.kind(),
                    if passed { "pass" } else { "fail" }
                );
                if passed {
                    continue;
                }
                field_failed = true;
                if reporting {
                    report.add_error(ValidationError::new(
                        entry.field.clone(),
                        binding.rule.clone(),
                    ));
                } else {
                    report.has_more_errors = true;
                }
            }

            if !field_failed && !report.has_more_errors {
                passed.push(entry.field.clone());
            }

            if field_failed && self.mode == Mode::Immediate {
                break;
            }
        }

        Ok(PassOutcome { report, passed })
    }
}

/// What a pass found.
#[derive(Debug)]
pub(crate) struct PassOutcome {
    pub report: ValidationReport,
    /// Fields whose rules all passed, in evaluation order, up to the first
    /// failure past the boundary.
    pub passed: Vec<FieldRef>,
}

fn never() -> bool {
    false
}

fn evaluate_binding(
    entry: &FieldEntry,
    binding: &Binding,
    ctx: &ValidationContext<'_>,
) -> Result<bool, ConfigError> {
    match binding.rule.check() {
        RuleCheck::Field(check) => Ok(check(&*entry.field)),
        RuleCheck::Value(check) => Ok(check(&extract(entry, binding)?)),
        RuleCheck::Contextual(check) => check(&extract(entry, binding)?, ctx),
    }
}

fn extract(entry: &FieldEntry, binding: &Binding) -> Result<Value, ConfigError> {
    let kind = binding.rule.kind();
    let adapter = binding
        .adapter
        .as_ref()
        .ok_or_else(|| ConfigError::MalformedRuleKind {
            kind: kind.clone(),
            reason: "rule reads a value but has no adapter".to_string(),
        })?;

    adapter
        .extract(&*entry.field)
        .map_err(|source| ConfigError::Conversion {
            field: entry.field.name().to_string(),
            rule_kind: kind.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::HeadlessField;
    use crate::core::rule::{QuickRule, RuleInstance, RuleKind};
    use crate::core::types::DataKind;
    use crate::core::error::ConversionError;
    use crate::rules::adapter::FnAdapter;

    fn failing(field: &FieldRef, order: i32) -> FieldEntry {
        let rule = QuickRule::new(format!("{} failed", field.name()), |_| false);
        FieldEntry::new(
            field.clone(),
            Some(order),
            false,
            vec![Binding::new(rule.into_instance(), None)],
        )
    }

    #[test]
    fn test_limit_splits_reported_and_hidden_failures() {
        let a: FieldRef = HeadlessField::text_input("a");
        let b: FieldRef = HeadlessField::text_input("b");
        let map = FieldRuleMap::new(vec![failing(&a, 1), failing(&b, 2)]);

        let report = Pass::full(&map, Mode::Burst, false).with_limit(1).run().unwrap().report;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field().name(), "a");
        assert!(report.has_more_errors);

        let report = Pass::full(&map, Mode::Burst, false).with_limit(0).run().unwrap().report;
        assert!(report.errors.is_empty());
        assert!(report.has_more_errors);
    }

    #[test]
    fn test_cancelled_pass_stops() {
        let a: FieldRef = HeadlessField::text_input("a");
        let map = FieldRuleMap::new(vec![failing(&a, 1)]);
        let cancelled = || true;

        let report = Pass::full(&map, Mode::Burst, false)
            .with_cancellation(&cancelled)
            .run()
            .unwrap();
        assert!(report.report.is_success());
        assert!(report.passed.is_empty());
    }

    #[test]
    fn test_passed_fields_stop_at_hidden_failure() {
        let a: FieldRef = HeadlessField::text_input("a");
        let b: FieldRef = HeadlessField::text_input("b");
        let c: FieldRef = HeadlessField::text_input("c");
        let passing = |field: &FieldRef, order: i32| {
            let rule = QuickRule::new("never fails", |_| true);
            FieldEntry::new(
                field.clone(),
                Some(order),
                false,
                vec![Binding::new(rule.into_instance(), None)],
            )
        };
        let map = FieldRuleMap::new(vec![passing(&a, 1), failing(&b, 2), passing(&c, 3)]);

        let outcome = Pass::full(&map, Mode::Burst, false).run().unwrap();
        let passed: Vec<&str> = outcome.passed.iter().map(|field| field.name()).collect();
        assert_eq!(passed, vec!["a", "c"]);

        let outcome = Pass::full(&map, Mode::Burst, false).with_limit(1).run().unwrap();
        let passed: Vec<&str> = outcome.passed.iter().map(|field| field.name()).collect();
        assert_eq!(passed, vec!["a"]);
        assert!(outcome.report.has_more_errors);
    }

    #[test]
    fn test_conversion_failure_is_fatal() {
        let field: FieldRef = HeadlessField::text_input("age");
        let adapter = FnAdapter::new("broken", DataKind::Integer, |_| {
            Err(ConversionError::Other("unreadable".to_string()))
        })
        .shared();
        let check = RuleCheck::Value(std::sync::Arc::new(|_: &Value| true));
        let rule = RuleInstance::new(RuleKind::new("min"), -1, "too small", check);
        let entry = FieldEntry::new(field, None, false, vec![Binding::new(rule, Some(adapter))]);
        let map = FieldRuleMap::new(vec![entry]);

        let result = Pass::full(&map, Mode::Burst, false).run();
        assert!(matches!(result, Err(ConfigError::Conversion { field, .. }) if field == "age"));
    }
}
