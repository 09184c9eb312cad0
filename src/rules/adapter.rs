//! Field adapters.
//!
//! An adapter reads a typed [`Value`] out of a field for a rule that expects
//! a particular [`DataKind`]. Adapters are pure: they never mutate the field.

use crate::core::error::ConversionError;
use crate::core::field::{Field, FieldKind};
use crate::core::types::{DataKind, Value};
use indexmap::IndexMap;
use log::warn;
use std::fmt;
use std::sync::Arc;

/// Extracts a typed value from a field.
pub trait FieldAdapter: Send + Sync {
    /// Kind of value this adapter yields.
    fn data_kind(&self) -> DataKind;

    /// Read the field's current value.
    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError>;

    /// Whether the field holds no input. Optional fields that are blank are
    /// not validated.
    fn is_blank(&self, _field: &dyn Field) -> bool {
        false
    }

    /// Name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl fmt::Debug for dyn FieldAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adapter({}: {})", self.name(), self.data_kind())
    }
}

/// Shared handle to an adapter.
pub type Adapter = Arc<dyn FieldAdapter>;

/// Extraction function wrapped by [`FnAdapter`].
pub type ExtractFn = Arc<dyn Fn(&dyn Field) -> Result<Value, ConversionError> + Send + Sync>;

/// An adapter built from a closure.
#[derive(Clone)]
pub struct FnAdapter {
    name: String,
    data_kind: DataKind,
    extract: ExtractFn,
}

impl FnAdapter {
    pub fn new<F>(name: impl Into<String>, data_kind: DataKind, extract: F) -> Self
    where
        F: Fn(&dyn Field) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            data_kind,
            extract: Arc::new(extract),
        }
    }

    /// Wrap into a shared [`Adapter`].
    pub fn shared(self) -> Adapter {
        Arc::new(self)
    }
}

impl FieldAdapter for FnAdapter {
    fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        (self.extract)(field)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for FnAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAdapter")
            .field("name", &self.name)
            .field("data_kind", &self.data_kind)
            .finish()
    }
}

// ============================================================================
// Adapter Table
// ============================================================================

/// Adapters keyed by `(field kind, data kind)`.
///
/// Used for per-validator adapters, consulted after the shared registry.
#[derive(Clone, Default)]
pub struct AdapterTable {
    adapters: IndexMap<(FieldKind, DataKind), Adapter>,
}

impl AdapterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for a field kind. The first registration for a
    /// `(field kind, data kind)` pair wins; returns whether this one was kept.
    pub fn register(&mut self, field_kind: FieldKind, adapter: Adapter) -> bool {
        let key = (field_kind, adapter.data_kind());
        if self.adapters.contains_key(&key) {
            warn!(
                "Adapter '{}' for {} on '{}' ignored: already registered",
                adapter.name(),
                key.1,
                key.0
            );
            return false;
        }
        self.adapters.insert(key, adapter);
        true
    }

    /// Exact lookup.
    pub fn get(&self, field_kind: &FieldKind, data_kind: DataKind) -> Option<&Adapter> {
        self.adapters.get(&(field_kind.clone(), data_kind))
    }

    /// Find an adapter for the first field kind in `lineage` that has one.
    ///
    /// `lineage` starts at the field's own kind and walks up its ancestors.
    pub fn resolve(&self, lineage: &[FieldKind], data_kind: DataKind) -> Option<Adapter> {
        lineage
            .iter()
            .find_map(|kind| self.get(kind, data_kind))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.adapters.keys().map(|(field, data)| format!("{}:{}", field, data)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::HeadlessField;

    fn constant(name: &str, value: i64) -> Adapter {
        FnAdapter::new(name, DataKind::Integer, move |_| Ok(Value::Integer(value))).shared()
    }

    #[test]
    fn test_first_registration_wins() {
        let mut table = AdapterTable::new();
        assert!(table.register(FieldKind::TEXT, constant("first", 1)));
        assert!(!table.register(FieldKind::TEXT, constant("second", 2)));
        assert_eq!(table.len(), 1);

        let field = HeadlessField::text_input("x");
        let adapter = table.get(&FieldKind::TEXT, DataKind::Integer).unwrap();
        assert_eq!(adapter.extract(&*field), Ok(Value::Integer(1)));
    }

    #[test]
    fn test_resolve_walks_lineage() {
        let mut table = AdapterTable::new();
        table.register(FieldKind::FIELD, constant("root", 0));
        table.register(FieldKind::TEXT, constant("text", 1));

        let lineage = [FieldKind::PASSWORD_INPUT, FieldKind::TEXT_INPUT, FieldKind::TEXT, FieldKind::FIELD];
        let adapter = table.resolve(&lineage, DataKind::Integer).unwrap();
        assert_eq!(adapter.name(), "text");

        assert!(table.resolve(&lineage, DataKind::String).is_none());
    }
}
