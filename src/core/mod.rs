//! Core types and traits for the Pariksha validation engine.
//!
//! This module contains the foundational types shared by every layer:
//! - Field handles and the headless field implementation
//! - Values and data kinds
//! - Rule specifications and live rules
//! - Error types
//! - The validation context and report

pub mod types;
pub mod field;
pub mod rule;
pub mod error;
pub mod context;
pub mod report;

// Re-export commonly used types
pub use types::{Value, DataKind};
pub use field::{Field, FieldId, FieldKind, FieldRef, HeadlessField};
pub use rule::{QuickRule, RuleCheck, RuleInstance, RuleKind, RuleSpec};
pub use error::{ConfigError, ConversionError, PariksaError};
pub use context::{FieldLookup, ValidationContext};
pub use report::{ValidationError, ValidationReport};
