//! Turning declared rule specs into live rules.

use crate::core::error::ConfigError;
use crate::core::field::FieldRef;
use crate::core::rule::{RuleInstance, RuleSpec};
use crate::form::spec::FormSpec;
use crate::rules::adapter::AdapterTable;
use crate::rules::registry::{Registry, RuleKindDescriptor};
use crate::validation::rule_map::{Binding, FieldEntry, FieldRuleMap};
use log::debug;

/// Instantiate one rule spec on one field.
///
/// The adapter is resolved through the registry first and the `local` table
/// second.
pub fn instantiate(
    descriptor: &RuleKindDescriptor,
    spec: &RuleSpec,
    field: &FieldRef,
    registry: &Registry,
    local: Option<&AdapterTable>,
) -> Result<Binding, ConfigError> {
    descriptor.check()?;

    let field_kind = field.kind();
    let adapter = registry
        .resolve(&descriptor.kind, &field_kind, local)
        .ok_or_else(|| ConfigError::UnresolvedAdapter {
            rule_kind: descriptor.kind.clone(),
            field_kind: field_kind.clone(),
            data_kind: descriptor.data_kind,
        })?;

    let check = descriptor
        .build_check(spec)
        .map_err(|reason| ConfigError::MalformedRuleSpec {
            kind: descriptor.kind.clone(),
            field: field.name().to_string(),
            reason,
        })?;

    let message = spec
        .message
        .clone()
        .unwrap_or_else(|| descriptor.default_message.clone());

    Ok(Binding::new(
        RuleInstance::new(descriptor.kind.clone(), spec.rank(), message, check),
        Some(adapter),
    ))
}

/// Build the field/rule map of a form.
pub fn build_map(
    form: &FormSpec,
    registry: &Registry,
    local: &AdapterTable,
) -> Result<FieldRuleMap, ConfigError> {
    let mut entries = Vec::new();

    for spec in form.annotated_fields(registry) {
        let mut bindings = Vec::with_capacity(spec.rules.len());
        for rule in &spec.rules {
            let descriptor = registry
                .descriptor(&rule.kind)
                .ok_or_else(|| ConfigError::UnknownRuleKind(rule.kind.clone()))?;
            bindings.push(instantiate(&descriptor, rule, &spec.field, registry, Some(local))?);
        }
        entries.push(FieldEntry::new(spec.field, spec.order, spec.optional, bindings));
    }

    let map = FieldRuleMap::new(entries);
    debug!(
        "Built rule map for '{}': {} field(s), {} rule(s), {:?}",
        form.name(),
        map.len(),
        map.rule_count(),
        map.state()
    );
    Ok(map)
}
