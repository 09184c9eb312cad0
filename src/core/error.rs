//! Error types for Pariksha.
//!
//! Uses thiserror for structured errors with context. Two families exist:
//! - [`ConfigError`]: the validator was wired up wrong; fatal, returned from
//!   the offending call and never turned into a field failure
//! - [`ConversionError`]: an adapter could not read a typed value from a field
//!
//! Rule failures are not errors at all; they are collected in a
//! [`ValidationReport`](crate::core::report::ValidationReport).

use crate::core::field::FieldKind;
use crate::core::rule::RuleKind;
use crate::core::types::DataKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for Pariksha.
#[derive(Error, Debug)]
pub enum PariksaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported schema format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),
}

/// Errors caused by an invalid validator configuration.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("No validation listener set; call set_validation_listener() before validating")]
    MissingListener,

    #[error("No async validation listener set; call set_async_listener() before validate_async()")]
    MissingAsyncListener,

    #[error("No rules found; declare at least one field with a known rule kind or use put()")]
    NoRules,

    #[error("{operation} requires every field to declare an order")]
    UnorderedFields { operation: String },

    #[error("Field '{field}' is not part of this validator")]
    UnknownField { field: String },

    #[error("Rule kind '{0}' is not registered")]
    UnknownRuleKind(RuleKind),

    #[error("No adapter reads {data_kind} from '{field_kind}' fields for rule kind '{rule_kind}'")]
    UnresolvedAdapter {
        rule_kind: RuleKind,
        field_kind: FieldKind,
        data_kind: DataKind,
    },

    #[error("Adapter for rule kind '{rule_kind}' yields {got}, expected {expected}")]
    IncompatibleAdapter {
        rule_kind: RuleKind,
        expected: DataKind,
        got: DataKind,
    },

    #[error("Rule kind '{requester}' needs a field with rule kind '{source_kind}', found none")]
    MissingCrossFieldSource {
        requester: RuleKind,
        source_kind: RuleKind,
    },

    #[error("Rule kind '{requester}' needs exactly one field with rule kind '{source_kind}', found {count}")]
    AmbiguousCrossFieldSource {
        requester: RuleKind,
        source_kind: RuleKind,
        count: usize,
    },

    #[error("Rule kind '{kind}' is malformed: {reason}")]
    MalformedRuleKind { kind: RuleKind, reason: String },

    #[error("Rule '{kind}' on field '{field}' is malformed: {reason}")]
    MalformedRuleSpec {
        kind: RuleKind,
        field: String,
        reason: String,
    },

    #[error("Declaring '{kind}' under '{parent}' would create a cycle")]
    FieldKindCycle { kind: FieldKind, parent: FieldKind },

    #[error("Field '{field}' has no order; use put_ordered() to add it to an ordered validator")]
    UnorderedQuickRuleField { field: String },

    #[error("put() for field '{field}' was given no rules")]
    EmptyQuickRules { field: String },

    #[error("Schema field '{name}' has no matching field handle")]
    UnboundField { name: String },

    #[error("Could not read field '{field}' for rule '{rule_kind}': {source}")]
    Conversion {
        field: String,
        rule_kind: RuleKind,
        source: ConversionError,
    },
}

/// An adapter failed to produce a typed value.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionError {
    #[error("field does not expose {capability}")]
    MissingCapability { capability: String },

    #[error("'{text}' is not a valid {expected}")]
    InvalidNumber { text: String, expected: DataKind },

    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    /// Name of the field this error concerns, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::UnknownField { field }
            | ConfigError::MalformedRuleSpec { field, .. }
            | ConfigError::UnorderedQuickRuleField { field }
            | ConfigError::EmptyQuickRules { field }
            | ConfigError::Conversion { field, .. } => Some(field),
            ConfigError::UnboundField { name } => Some(name),
            _ => None,
        }
    }

    /// Whether this error comes from a cross-field rule's source lookup.
    pub fn is_cross_field(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingCrossFieldSource { .. }
                | ConfigError::AmbiguousCrossFieldSource { .. }
        )
    }
}

/// Result type alias for validator configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for top-level operations.
pub type PariksaResult<T> = Result<T, PariksaError>;
