//! # Pariksha - Declarative Field Validation
//!
//! Pariksha validates data-entry fields against rules declared on them. A form
//! declares its fields, each with rule specs and an optional order; the
//! validator evaluates every applicable rule against the fields' current
//! values and reports either success or a field-correlated list of failures.
//!
//! ## Features
//!
//! - **Declarative rules**: attach rule specs to fields in code or in a JSON/TOML schema
//! - **Two modes**: collect every failure, or stop at the first failing field
//! - **Partial validation**: validate up to a given field of an ordered form
//! - **Cross-field rules**: rules such as "confirm password" read other fields
//! - **Extensible**: register new rule kinds, field kinds and adapters
//! - **Asynchronous**: validate on a worker thread with cancellation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pariksha::prelude::*;
//!
//! let name = HeadlessField::text_input("name");
//! let age = HeadlessField::text_input("age");
//!
//! let form = FormSpec::builder("signup")
//!     .field(FieldSpec::new(name.handle()).with_order(1).rule(RuleSpec::new("not_empty")))
//!     .field(
//!         FieldSpec::new(age.handle())
//!             .with_order(2)
//!             .rule(RuleSpec::new("min").with_param("value", 18).with_message("Adults only")),
//!     )
//!     .build();
//!
//! let validator = Validator::new(form);
//! validator.set_validation_listener(Arc::new(MyListener));
//!
//! age.set_text("16");
//! let report = validator.validate().unwrap();
//! println!("{}", report.summary());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: fields, values, rules, errors and reports
//! - [`form`]: form declarations, ordering and schemas
//! - [`rules`]: the rule-kind registry, adapters and built-in rule kinds
//! - [`validation`]: rule instantiation and the validator
//! - [`execution`]: run state and callback dispatch for asynchronous validation
//!
//! ## Custom Rule Kinds
//!
//! ```rust,ignore
//! use pariksha::prelude::*;
//!
//! let zip = RuleKindDescriptor::new(
//!     "zip",
//!     DataKind::String,
//!     "Invalid postal code",
//!     RuleFactory::plain(|_spec: &RuleSpec| {
//!         Ok(Arc::new(|value: &Value| {
//!             value.as_string().map_or(false, |text| text.len() == 5)
//!         }))
//!     }),
//! );
//! Registry::global().write().register_rule_kind(zip);
//! ```

#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod form;
pub mod rules;
pub mod validation;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use pariksha::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Core types
    pub use crate::core::field::{Field, FieldId, FieldKind, FieldRef, HeadlessField};
    pub use crate::core::rule::{QuickRule, RuleKind, RuleSpec};
    pub use crate::core::types::{DataKind, Value};

    // Errors and results
    pub use crate::core::error::{ConfigError, ConversionError, PariksaError};
    pub use crate::core::report::{ValidationError, ValidationReport};
    pub use crate::core::context::ValidationContext;

    // Forms
    pub use crate::form::schema::{FieldSchema, FormSchema};
    pub use crate::form::spec::{FieldSpec, FormSpec};

    // Rules
    pub use crate::rules::adapter::{Adapter, FieldAdapter, FnAdapter};
    pub use crate::rules::registry::{Registry, RuleFactory, RuleKindDescriptor, SharedRegistry};

    // Validation
    pub use crate::validation::listener::{
        AsyncValidationListener, FieldValidatedAction, ValidationListener,
    };
    pub use crate::validation::validator::{Mode, Validator, ValidatorOptions};

    // Execution
    pub use crate::execution::dispatch::{CallbackDispatcher, ImmediateDispatcher, QueuedDispatcher};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "pariksha");
    }

    #[derive(Default)]
    struct Counter {
        succeeded: AtomicUsize,
        failed: AtomicUsize,
    }

    impl ValidationListener for Counter {
        fn on_validation_succeeded(&self) {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }

        fn on_validation_failed(&self, _errors: &[ValidationError]) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_schema_driven_validation() {
        let schema = FormSchema::from_json(
            r#"{
                "name": "signup",
                "fields": [
                    {"name": "name", "order": 1, "rules": [{"kind": "not_empty"}]},
                    {"name": "age", "order": 2, "rules": [{"kind": "min", "params": {"value": 18}}]},
                    {"name": "terms", "kind": "checkbox", "order": 3, "rules": [{"kind": "checked"}]}
                ]
            }"#,
        )
        .unwrap();
        let fields = schema.headless_fields();
        let form = schema
            .bind(|name| fields.get(name).map(|field| field.handle()))
            .unwrap();

        let validator = Validator::with_registry(form, Registry::with_builtins().shared());
        let counter = Arc::new(Counter::default());
        validator.set_validation_listener(counter.clone());

        fields["name"].set_text("Asha");
        fields["age"].set_text("17");
        let report = validator.validate().unwrap();
        let failed: Vec<&str> = report.errors.iter().map(|e| e.field().name()).collect();
        assert_eq!(failed, vec!["age", "terms"]);

        fields["age"].set_text("18");
        fields["terms"].set_checked(true);
        assert!(validator.validate().unwrap().is_success());

        assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.succeeded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_custom_rule_kind() {
        let registry = Registry::with_builtins();
        let zip = RuleKindDescriptor::new(
            "zip",
            DataKind::String,
            "Invalid postal code",
            RuleFactory::plain(|_spec: &RuleSpec| {
                let check: crate::core::rule::ValuePredicate = Arc::new(|value: &Value| {
                    value.as_string().map_or(false, |text| text.len() == 5)
                });
                Ok(check)
            }),
        );
        let shared = registry.shared();
        assert!(shared.write().register_rule_kind(zip));

        let zip_field = HeadlessField::text_input("zip");
        let form = FormSpec::builder("address")
            .field(FieldSpec::new(zip_field.handle()).rule(RuleSpec::new("zip")))
            .build();
        let validator = Validator::with_registry(form, shared);
        validator.set_validation_listener(Arc::new(Counter::default()));

        zip_field.set_text("1234");
        let report = validator.validate().unwrap();
        assert_eq!(report.errors[0].message(), "Invalid postal code");

        zip_field.set_text("12345");
        assert!(validator.validate().unwrap().is_success());
    }
}
