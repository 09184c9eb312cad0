//! Built-in field kinds, adapters and rule kinds.
//!
//! Everything here is registered by [`Registry::with_builtins`]; hosts can
//! register the same pieces selectively on an empty [`Registry`].

pub mod adapters;
mod choice;
mod cross_field;
mod numeric;
mod text;

use crate::core::field::FieldKind;
use crate::rules::registry::Registry;
use adapters::{CheckedAdapter, FloatTextAdapter, IntegerTextAdapter, SelectionAdapter, TextAdapter};
use log::error;
use std::sync::Arc;

/// Register all built-ins.
pub fn register_all(registry: &mut Registry) {
    register_hierarchy(registry);
    register_stock_adapters(registry);
    text::register(registry);
    numeric::register(registry);
    choice::register(registry);
    cross_field::register(registry);
}

/// Declare the built-in field-kind hierarchy.
pub fn register_hierarchy(registry: &mut Registry) {
    let declarations = [
        (FieldKind::TEXT, FieldKind::FIELD),
        (FieldKind::TEXT_INPUT, FieldKind::TEXT),
        (FieldKind::PASSWORD_INPUT, FieldKind::TEXT_INPUT),
        (FieldKind::TOGGLE, FieldKind::FIELD),
        (FieldKind::CHECKBOX, FieldKind::TOGGLE),
        (FieldKind::RADIO_BUTTON, FieldKind::TOGGLE),
        (FieldKind::RADIO_GROUP, FieldKind::FIELD),
        (FieldKind::SELECT, FieldKind::FIELD),
    ];
    for (kind, parent) in declarations {
        if let Err(e) = registry.declare_field_kind(kind, parent) {
            error!("Built-in field kind rejected: {}", e);
        }
    }
}

/// Register the stock adapters that new rule kinds bind to.
pub fn register_stock_adapters(registry: &mut Registry) {
    registry.register_stock_adapter(FieldKind::TEXT, Arc::new(TextAdapter));
    registry.register_stock_adapter(FieldKind::TEXT, Arc::new(IntegerTextAdapter));
    registry.register_stock_adapter(FieldKind::TEXT, Arc::new(FloatTextAdapter));
    registry.register_stock_adapter(FieldKind::TOGGLE, Arc::new(CheckedAdapter));
    registry.register_stock_adapter(FieldKind::RADIO_GROUP, Arc::new(CheckedAdapter));
    registry.register_stock_adapter(FieldKind::SELECT, Arc::new(SelectionAdapter));
}

pub use choice::{assert_false, assert_true, checked, select};
pub use cross_field::{confirm_email, confirm_password};
pub use numeric::{decimal_max, decimal_min, max, min};
pub use text::{digits, email, length, not_empty, password};
