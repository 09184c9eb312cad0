//! Rule specifications and live rules.
//!
//! A [`RuleSpec`] is the declared, immutable configuration of a rule kind on a
//! field. Building the validator turns every spec into a [`RuleInstance`]: the
//! live predicate plus the sequence and message it reports with.

use crate::core::context::ValidationContext;
use crate::core::error::ConfigError;
use crate::core::field::Field;
use crate::core::types::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Sequence assigned to rules that do not declare one.
pub const DEFAULT_SEQUENCE: i32 = -1;

/// Name of a rule kind (`not_empty`, `min`, `confirm_password`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleKind(Cow<'static, str>);

impl RuleKind {
    /// Kind reported by quick rules.
    pub const QUICK: RuleKind = RuleKind(Cow::Borrowed("quick"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for RuleKind {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

// ============================================================================
// Rule Specification
// ============================================================================

/// Declarative configuration of one rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule kind this spec instantiates.
    pub kind: RuleKind,
    /// Rank among the field's rules; absent ranks first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    /// Overrides the kind's default message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Kind-specific metadata.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, Value>,
}

impl RuleSpec {
    pub fn new(kind: impl Into<RuleKind>) -> Self {
        Self {
            kind: kind.into(),
            sequence: None,
            message: None,
            params: IndexMap::new(),
        }
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Effective sequence.
    pub fn rank(&self) -> i32 {
        self.sequence.unwrap_or(DEFAULT_SEQUENCE)
    }

    // ========================================================================
    // Parameter Getters
    // ========================================================================
    //
    // Each returns Ok(None) when the parameter is absent and Err(reason) when
    // it is present with the wrong type.

    pub fn get_integer(&self, name: &str) -> Result<Option<i64>, String> {
        match self.params.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .map(Some)
                .ok_or_else(|| format!("parameter '{}' must be an integer, got {}", name, value)),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<Option<f64>, String> {
        match self.params.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_float()
                .map(Some)
                .ok_or_else(|| format!("parameter '{}' must be a number, got {}", name, value)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, String> {
        match self.params.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| format!("parameter '{}' must be a boolean, got {}", name, value)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&str>, String> {
        match self.params.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_string()
                .map(Some)
                .ok_or_else(|| format!("parameter '{}' must be a string, got {}", name, value)),
        }
    }

    /// Like [`get_integer`](Self::get_integer) but the parameter must be present.
    pub fn require_integer(&self, name: &str) -> Result<i64, String> {
        self.get_integer(name)?
            .ok_or_else(|| format!("missing required parameter '{}'", name))
    }

    /// Like [`get_float`](Self::get_float) but the parameter must be present.
    pub fn require_float(&self, name: &str) -> Result<f64, String> {
        self.get_float(name)?
            .ok_or_else(|| format!("missing required parameter '{}'", name))
    }
}

// ============================================================================
// Live Rules
// ============================================================================

/// Predicate over an extracted value.
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Predicate over an extracted value that may read other fields.
pub type ContextPredicate =
    Arc<dyn Fn(&Value, &ValidationContext<'_>) -> Result<bool, ConfigError> + Send + Sync>;

/// Predicate over the raw field handle.
pub type FieldPredicate = Arc<dyn Fn(&dyn Field) -> bool + Send + Sync>;

/// Wrap a closure as a [`ContextPredicate`].
pub fn contextual<F>(check: F) -> ContextPredicate
where
    F: Fn(&Value, &ValidationContext<'_>) -> Result<bool, ConfigError> + Send + Sync + 'static,
{
    Arc::new(check)
}

/// The test a live rule performs.
#[derive(Clone)]
pub enum RuleCheck {
    /// Reads the field through an adapter.
    Value(ValuePredicate),
    /// Reads the field through an adapter and other fields through the context.
    Contextual(ContextPredicate),
    /// Reads the field handle directly; used by quick rules.
    Field(FieldPredicate),
}

impl RuleCheck {
    /// Whether this check needs an adapter.
    pub fn needs_adapter(&self) -> bool {
        !matches!(self, RuleCheck::Field(_))
    }
}

impl fmt::Debug for RuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCheck::Value(_) => f.write_str("Value(..)"),
            RuleCheck::Contextual(_) => f.write_str("Contextual(..)"),
            RuleCheck::Field(_) => f.write_str("Field(..)"),
        }
    }
}

/// An instantiated rule.
#[derive(Debug, Clone)]
pub struct RuleInstance {
    kind: RuleKind,
    sequence: i32,
    message: String,
    check: RuleCheck,
}

impl RuleInstance {
    pub fn new(kind: RuleKind, sequence: i32, message: impl Into<String>, check: RuleCheck) -> Self {
        Self {
            kind,
            sequence,
            message: message.into(),
            check,
        }
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }

    /// Message reported when this rule fails.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn check(&self) -> &RuleCheck {
        &self.check
    }
}

/// An ad-hoc rule attached to a field at runtime with
/// [`Validator::put`](crate::validation::Validator::put).
///
/// Quick rules receive the field handle and need no adapter.
#[derive(Clone)]
pub struct QuickRule {
    sequence: Option<i32>,
    message: String,
    check: FieldPredicate,
}

impl QuickRule {
    pub fn new<F>(message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&dyn Field) -> bool + Send + Sync + 'static,
    {
        Self {
            sequence: None,
            message: message.into(),
            check: Arc::new(check),
        }
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub(crate) fn into_instance(self) -> RuleInstance {
        RuleInstance::new(
            RuleKind::QUICK,
            self.sequence.unwrap_or(DEFAULT_SEQUENCE),
            self.message,
            RuleCheck::Field(self.check),
        )
    }
}

impl fmt::Debug for QuickRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickRule")
            .field("sequence", &self.sequence)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::HeadlessField;

    #[test]
    fn test_spec_builder() {
        let spec = RuleSpec::new("length")
            .with_sequence(2)
            .with_param("min", 3i64)
            .with_param("trim", true);

        assert_eq!(spec.rank(), 2);
        assert_eq!(spec.get_integer("min"), Ok(Some(3)));
        assert_eq!(spec.get_integer("max"), Ok(None));
        assert_eq!(spec.get_bool("trim"), Ok(Some(true)));
        assert!(spec.get_string("min").is_err());
        assert_eq!(RuleSpec::new("min").rank(), DEFAULT_SEQUENCE);
    }

    #[test]
    fn test_require_param() {
        let spec = RuleSpec::new("min");
        let reason = spec.require_integer("value").unwrap_err();
        assert!(reason.contains("value"));
    }

    #[test]
    fn test_spec_json_shape() {
        let spec: RuleSpec =
            serde_json::from_str(r#"{"kind": "max", "params": {"value": 10}}"#).unwrap();
        assert_eq!(spec.kind, RuleKind::new("max"));
        assert_eq!(spec.sequence, None);
        assert_eq!(spec.require_integer("value"), Ok(10));
    }

    #[test]
    fn test_quick_rule_instance() {
        let rule = QuickRule::new("Must say hi", |field| field.text().as_deref() == Some("hi"))
            .with_sequence(4)
            .into_instance();
        assert_eq!(rule.kind(), &RuleKind::QUICK);
        assert_eq!(rule.sequence(), 4);
        assert!(!rule.check().needs_adapter());

        let field = HeadlessField::text_input("greeting");
        field.set_text("hi");
        match rule.check() {
            RuleCheck::Field(check) => assert!(check(&*field)),
            other => panic!("unexpected check {:?}", other),
        }
    }
}
