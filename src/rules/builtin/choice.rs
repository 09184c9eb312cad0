//! Rule kinds for toggles, radio groups and dropdowns.

use crate::core::field::FieldKind;
use crate::core::rule::{RuleKind, RuleSpec, ValuePredicate};
use crate::core::types::{DataKind, Value};
use crate::rules::adapter::Adapter;
use crate::rules::builtin::adapters::{CheckedAdapter, SelectionAdapter};
use crate::rules::registry::{Registry, RuleFactory, RuleKindDescriptor};
use log::error;
use std::sync::Arc;

/// Register choice rule kinds and bind them to the choice field kinds.
pub fn register(registry: &mut Registry) {
    for descriptor in [checked(), assert_true(), assert_false()] {
        let kind = descriptor.kind.clone();
        registry.register_rule_kind(descriptor);
        for field_kind in [FieldKind::TOGGLE, FieldKind::RADIO_GROUP] {
            bind(registry, &kind, DataKind::Boolean, field_kind, Arc::new(CheckedAdapter));
        }
    }

    let select = select();
    let kind = select.kind.clone();
    registry.register_rule_kind(select);
    bind(registry, &kind, DataKind::Integer, FieldKind::SELECT, Arc::new(SelectionAdapter));
}

fn bind(
    registry: &mut Registry,
    kind: &RuleKind,
    data_kind: DataKind,
    field_kind: FieldKind,
    adapter: Adapter,
) {
    if let Err(e) = registry.register_adapter(kind, data_kind, field_kind, adapter) {
        error!("Built-in adapter for '{}' rejected: {}", kind, e);
    }
}

fn boolean_equals(expected: bool) -> ValuePredicate {
    Arc::new(move |value: &Value| value.as_bool() == Some(expected))
}

/// Checked state equals `value` (default true).
pub fn checked() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "checked",
        DataKind::Boolean,
        "Must be checked",
        RuleFactory::plain(|spec: &RuleSpec| {
            Ok(boolean_equals(spec.get_bool("value")?.unwrap_or(true)))
        }),
    )
    .with_description("Checked state equals 'value' (default true)")
}

pub fn assert_true() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "assert_true",
        DataKind::Boolean,
        "Must be true",
        RuleFactory::plain(|_: &RuleSpec| Ok(boolean_equals(true))),
    )
    .with_description("State is true")
}

pub fn assert_false() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "assert_false",
        DataKind::Boolean,
        "Must be false",
        RuleFactory::plain(|_: &RuleSpec| Ok(boolean_equals(false))),
    )
    .with_description("State is false")
}

/// A dropdown moved off its placeholder entry.
pub fn select() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "select",
        DataKind::Integer,
        "Select a value",
        RuleFactory::plain(|spec: &RuleSpec| {
            let default = spec.get_integer("default_selection")?.unwrap_or(0);
            let predicate: ValuePredicate =
                Arc::new(move |value: &Value| value.as_integer().map_or(false, |index| index != default));
            Ok(predicate)
        }),
    )
    .with_description("Selected index differs from 'default_selection' (default 0)")
}
