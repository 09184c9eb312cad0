//! Validation context.
//!
//! Cross-field rules read other fields through the context. It is a read-only
//! view over whatever holds the fields of one validation pass.

use crate::core::error::ConfigError;
use crate::core::field::FieldRef;
use crate::core::rule::RuleKind;
use crate::core::types::Value;
use std::fmt;

/// Field lookups a validation pass exposes to cross-field rules.
pub trait FieldLookup: Send + Sync {
    /// Fields carrying a declarative rule of the given kind, in evaluation
    /// order.
    fn fields_with(&self, kind: &RuleKind) -> Vec<FieldRef>;

    /// Read a field's value the way its rule of the given kind reads it.
    fn read(&self, field: &FieldRef, kind: &RuleKind) -> Result<Value, ConfigError>;
}

/// Read-only view over the fields of one validation pass.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    lookup: &'a dyn FieldLookup,
}

impl<'a> ValidationContext<'a> {
    pub fn new(lookup: &'a dyn FieldLookup) -> Self {
        Self { lookup }
    }

    pub fn fields_with(&self, kind: &RuleKind) -> Vec<FieldRef> {
        self.lookup.fields_with(kind)
    }

    pub fn value(&self, field: &FieldRef, kind: &RuleKind) -> Result<Value, ConfigError> {
        self.lookup.read(field, kind)
    }

    /// The one field carrying `source`, on behalf of a `requester` rule.
    pub fn sole_field_with(
        &self,
        source: &RuleKind,
        requester: &RuleKind,
    ) -> Result<FieldRef, ConfigError> {
        let mut fields = self.fields_with(source);
        match fields.len() {
            0 => Err(ConfigError::MissingCrossFieldSource {
                requester: requester.clone(),
                source_kind: source.clone(),
            }),
            1 => Ok(fields.remove(0)),
            count => Err(ConfigError::AmbiguousCrossFieldSource {
                requester: requester.clone(),
                source_kind: source.clone(),
                count,
            }),
        }
    }
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{Field, HeadlessField};

    /// Fields tagged with one rule kind each.
    struct Tagged(Vec<(FieldRef, &'static str)>);

    impl FieldLookup for Tagged {
        fn fields_with(&self, kind: &RuleKind) -> Vec<FieldRef> {
            self.0
                .iter()
                .filter(|(_, tag)| kind.as_str() == *tag)
                .map(|(field, _)| field.clone())
                .collect()
        }

        fn read(&self, field: &FieldRef, _kind: &RuleKind) -> Result<Value, ConfigError> {
            Ok(Value::String(field.text().unwrap_or_default()))
        }
    }

    #[test]
    fn test_sole_field_with() {
        let password = HeadlessField::text_input("password");
        password.set_text("hunter22");
        let lookup = Tagged(vec![(password.handle(), "password")]);
        let ctx = ValidationContext::new(&lookup);

        let kind = RuleKind::new("password");
        let field = ctx
            .sole_field_with(&kind, &RuleKind::new("confirm_password"))
            .unwrap();
        assert_eq!(field.id(), password.id());
        assert_eq!(ctx.value(&field, &kind), Ok(Value::from("hunter22")));
    }

    #[test]
    fn test_sole_field_errors() {
        let lookup = Tagged(vec![
            (HeadlessField::text_input("a").handle(), "password"),
            (HeadlessField::text_input("b").handle(), "password"),
        ]);
        let ctx = ValidationContext::new(&lookup);
        let requester = RuleKind::new("confirm_password");

        let result = ctx.sole_field_with(&RuleKind::new("password"), &requester);
        assert!(matches!(
            result,
            Err(ConfigError::AmbiguousCrossFieldSource { count: 2, .. })
        ));

        let result = ctx.sole_field_with(&RuleKind::new("email"), &requester);
        assert!(matches!(result, Err(ConfigError::MissingCrossFieldSource { .. })));
    }
}
