//! Numeric bound rule kinds.

use crate::core::rule::{RuleSpec, ValuePredicate};
use crate::core::types::{DataKind, Value};
use crate::rules::registry::{Registry, RuleFactory, RuleKindDescriptor};
use std::sync::Arc;

/// Register numeric rule kinds.
pub fn register(registry: &mut Registry) {
    registry.register_rule_kind(min());
    registry.register_rule_kind(max());
    registry.register_rule_kind(decimal_min());
    registry.register_rule_kind(decimal_max());
}

fn integer_predicate<F>(check: F) -> ValuePredicate
where
    F: Fn(i64) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value: &Value| value.as_integer().map_or(false, |v| check(v)))
}

fn float_predicate<F>(check: F) -> ValuePredicate
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value: &Value| value.as_float().map_or(false, |v| check(v)))
}

/// Integer at least `value`.
pub fn min() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "min",
        DataKind::Integer,
        "Value is too small",
        RuleFactory::plain(|spec: &RuleSpec| {
            let bound = spec.require_integer("value")?;
            Ok(integer_predicate(move |v| v >= bound))
        }),
    )
    .with_description("Integer greater than or equal to 'value'")
}

/// Integer at most `value`.
pub fn max() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "max",
        DataKind::Integer,
        "Value is too large",
        RuleFactory::plain(|spec: &RuleSpec| {
            let bound = spec.require_integer("value")?;
            Ok(integer_predicate(move |v| v <= bound))
        }),
    )
    .with_description("Integer less than or equal to 'value'")
}

/// Decimal above `value`, inclusive unless `inclusive` is false.
pub fn decimal_min() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "decimal_min",
        DataKind::Float,
        "Value is too small",
        RuleFactory::plain(|spec: &RuleSpec| {
            let bound = spec.require_float("value")?;
            let inclusive = spec.get_bool("inclusive")?.unwrap_or(true);
            Ok(float_predicate(move |v| if inclusive { v >= bound } else { v > bound }))
        }),
    )
    .with_description("Decimal above 'value' ('inclusive' defaults to true)")
}

/// Decimal below `value`, inclusive unless `inclusive` is false.
pub fn decimal_max() -> RuleKindDescriptor {
    RuleKindDescriptor::new(
        "decimal_max",
        DataKind::Float,
        "Value is too large",
        RuleFactory::plain(|spec: &RuleSpec| {
            let bound = spec.require_float("value")?;
            let inclusive = spec.get_bool("inclusive")?.unwrap_or(true);
            Ok(float_predicate(move |v| if inclusive { v <= bound } else { v < bound }))
        }),
    )
    .with_description("Decimal below 'value' ('inclusive' defaults to true)")
}
