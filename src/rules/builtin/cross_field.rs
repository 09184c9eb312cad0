//! Rule kinds that compare a field against another field.

use crate::core::rule::{contextual, ContextPredicate, RuleKind, RuleSpec};
use crate::core::types::DataKind;
use crate::rules::registry::{Registry, RuleFactory, RuleKindDescriptor};

/// Register cross-field rule kinds.
pub fn register(registry: &mut Registry) {
    registry.register_rule_kind(confirm_password());
    registry.register_rule_kind(confirm_email());
}

/// Passes when `value` equals the value of the sole field carrying `source`.
fn matches_source(requester: RuleKind, source: RuleKind) -> ContextPredicate {
    contextual(move |value, ctx| {
        let field = ctx.sole_field_with(&source, &requester)?;
        let expected = ctx.value(&field, &source)?;
        Ok(value.as_string().is_some() && value.as_string() == expected.as_string())
    })
}

/// Text equals the form's `password` field.
pub fn confirm_password() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "confirm_password",
        DataKind::String,
        "Passwords don't match",
        RuleFactory::contextual(|_: &RuleSpec| {
            Ok(matches_source(
                RuleKind::new("confirm_password"),
                RuleKind::new("password"),
            ))
        }),
    )
    .with_description("Equals the field carrying 'password'")
}

/// Text equals the form's email field (rule kind `source`, default `email`).
pub fn confirm_email() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "confirm_email",
        DataKind::String,
        "Emails don't match",
        RuleFactory::contextual(|spec: &RuleSpec| {
            let source = spec.get_string("source")?.unwrap_or("email").to_string();
            Ok(matches_source(RuleKind::new("confirm_email"), RuleKind::new(source)))
        }),
    )
    .with_description("Equals the field carrying rule kind 'source' (default 'email')")
}
