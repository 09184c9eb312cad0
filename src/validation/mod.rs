//! Validation orchestration.
//!
//! A [`Validator`] turns a [`FormSpec`](crate::form::FormSpec) into a
//! field/rule map on first use and evaluates it synchronously or on a worker
//! thread.

mod evaluate;
pub mod instantiate;
pub mod listener;
pub mod rule_map;
pub mod validator;

pub use instantiate::{build_map, instantiate};
pub use listener::{AsyncValidationListener, FieldValidatedAction, ValidationListener};
pub use rule_map::{Binding, FieldEntry, FieldRuleMap};
pub use validator::{Mode, Validator, ValidatorOptions};
