//! Registry of rule kinds, field kinds and the adapters that connect them.
//!
//! The registry answers one question for the validator: given a rule kind and
//! the kind of field it is attached to, which adapter reads the value? Lookups
//! try the exact field kind first, then walk up the field-kind hierarchy, then
//! fall back to adapters registered on the validator itself.

use crate::core::error::ConfigError;
use crate::core::field::FieldKind;
use crate::core::rule::{ContextPredicate, RuleCheck, RuleKind, RuleSpec, ValuePredicate};
use crate::core::types::DataKind;
use crate::rules::adapter::{Adapter, AdapterTable};
use indexmap::IndexMap;
use log::{debug, warn};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Factory for rules that only read their own field.
pub type PlainFactory = Arc<dyn Fn(&RuleSpec) -> Result<ValuePredicate, String> + Send + Sync>;

/// Factory for rules that also read other fields.
pub type ContextualFactory =
    Arc<dyn Fn(&RuleSpec) -> Result<ContextPredicate, String> + Send + Sync>;

/// Builds a live predicate from a rule spec.
///
/// Factories validate the spec's parameters and return the reason as a string
/// when they are missing or invalid.
#[derive(Clone)]
pub enum RuleFactory {
    Plain(PlainFactory),
    Contextual(ContextualFactory),
}

impl RuleFactory {
    pub fn plain<F>(factory: F) -> Self
    where
        F: Fn(&RuleSpec) -> Result<ValuePredicate, String> + Send + Sync + 'static,
    {
        RuleFactory::Plain(Arc::new(factory))
    }

    pub fn contextual<F>(factory: F) -> Self
    where
        F: Fn(&RuleSpec) -> Result<ContextPredicate, String> + Send + Sync + 'static,
    {
        RuleFactory::Contextual(Arc::new(factory))
    }

    fn is_contextual(&self) -> bool {
        matches!(self, RuleFactory::Contextual(_))
    }
}

impl fmt::Debug for RuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleFactory::Plain(_) => f.write_str("Plain(..)"),
            RuleFactory::Contextual(_) => f.write_str("Contextual(..)"),
        }
    }
}

/// Everything the engine needs to know about a rule kind.
#[derive(Debug, Clone)]
pub struct RuleKindDescriptor {
    pub kind: RuleKind,
    /// Kind of value the rule's predicate expects.
    pub data_kind: DataKind,
    /// Message used when a spec does not provide one.
    pub default_message: String,
    /// Whether the rule reads other fields through the validation context.
    pub cross_field: bool,
    pub factory: RuleFactory,
    /// Short description for listings.
    pub description: String,
}

impl RuleKindDescriptor {
    /// Create a descriptor. `cross_field` follows the factory variant.
    pub fn new(
        kind: impl Into<RuleKind>,
        data_kind: DataKind,
        default_message: impl Into<String>,
        factory: RuleFactory,
    ) -> Self {
        Self {
            kind: kind.into(),
            data_kind,
            default_message: default_message.into(),
            cross_field: factory.is_contextual(),
            factory,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the cross-field flag.
    pub fn with_cross_field(mut self, cross_field: bool) -> Self {
        self.cross_field = cross_field;
        self
    }

    /// Check that the cross-field flag agrees with the factory.
    pub fn check(&self) -> Result<(), ConfigError> {
        match (self.cross_field, self.factory.is_contextual()) {
            (true, false) => Err(ConfigError::MalformedRuleKind {
                kind: self.kind.clone(),
                reason: "declared cross-field but its factory cannot read the context".to_string(),
            }),
            (false, true) => Err(ConfigError::MalformedRuleKind {
                kind: self.kind.clone(),
                reason: "factory reads the context but the kind is not declared cross-field"
                    .to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Build the live check for a spec.
    pub fn build_check(&self, spec: &RuleSpec) -> Result<RuleCheck, String> {
        match &self.factory {
            RuleFactory::Plain(factory) => factory(spec).map(RuleCheck::Value),
            RuleFactory::Contextual(factory) => factory(spec).map(RuleCheck::Contextual),
        }
    }
}

/// A registered rule kind and its field-kind adapters.
#[derive(Clone)]
struct RuleKindEntry {
    descriptor: Arc<RuleKindDescriptor>,
    adapters: IndexMap<FieldKind, Adapter>,
}

/// Shared registry handle.
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Registry for rule kinds, field kinds and adapters.
#[derive(Clone, Default)]
pub struct Registry {
    kinds: IndexMap<RuleKind, RuleKindEntry>,
    /// Parent of each declared field kind.
    parents: IndexMap<FieldKind, FieldKind>,
    /// Adapters bound to new rule kinds by data kind.
    stock: AdapterTable,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in field kinds, adapters and rule kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::builtin::register_all(&mut registry);
        registry
    }

    /// The process-wide registry, built with the built-ins on first use.
    pub fn global() -> SharedRegistry {
        static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(RwLock::new(Registry::with_builtins())))
            .clone()
    }

    /// Wrap into a shared handle.
    pub fn shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    // ========================================================================
    // Field Kinds
    // ========================================================================

    /// Declare `kind` as a subkind of `parent`.
    ///
    /// Returns `Ok(false)` if `kind` already has a parent; the first
    /// declaration stays.
    pub fn declare_field_kind(
        &mut self,
        kind: FieldKind,
        parent: FieldKind,
    ) -> Result<bool, ConfigError> {
        if self.lineage(&parent).contains(&kind) {
            return Err(ConfigError::FieldKindCycle { kind, parent });
        }
        if let Some(existing) = self.parents.get(&kind) {
            if existing != &parent {
                warn!(
                    "Field kind '{}' already declared under '{}', ignoring '{}'",
                    kind, existing, parent
                );
            }
            return Ok(false);
        }
        self.parents.insert(kind, parent);
        Ok(true)
    }

    /// Parent of a field kind, if declared.
    pub fn parent_of(&self, kind: &FieldKind) -> Option<&FieldKind> {
        self.parents.get(kind)
    }

    /// The kind followed by its ancestors, nearest first.
    pub fn lineage(&self, kind: &FieldKind) -> Vec<FieldKind> {
        let mut lineage = vec![kind.clone()];
        let mut current = kind;
        while let Some(parent) = self.parents.get(current) {
            lineage.push(parent.clone());
            current = parent;
        }
        lineage
    }

    /// Whether `kind` is `ancestor` or descends from it.
    pub fn is_subkind(&self, kind: &FieldKind, ancestor: &FieldKind) -> bool {
        self.lineage(kind).contains(ancestor)
    }

    // ========================================================================
    // Rule Kinds
    // ========================================================================

    /// Register a stock adapter. Rule kinds registered afterwards are bound
    /// to the `text` stock adapter of their data kind.
    pub fn register_stock_adapter(&mut self, field_kind: FieldKind, adapter: Adapter) -> bool {
        self.stock.register(field_kind, adapter)
    }

    /// Stock adapter for a field kind and data kind.
    pub fn stock_adapter(&self, field_kind: &FieldKind, data_kind: DataKind) -> Option<Adapter> {
        self.stock.get(field_kind, data_kind).cloned()
    }

    /// Register a rule kind. Returns `false` if the kind was already
    /// registered; the first registration stays.
    pub fn register_rule_kind(&mut self, descriptor: RuleKindDescriptor) -> bool {
        if self.kinds.contains_key(&descriptor.kind) {
            warn!("Rule kind '{}' already registered, ignoring", descriptor.kind);
            return false;
        }

        let mut adapters = IndexMap::new();
        if let Some(adapter) = self.stock.get(&FieldKind::TEXT, descriptor.data_kind) {
            adapters.insert(FieldKind::TEXT, adapter.clone());
        }

        debug!("Registered rule kind '{}' ({})", descriptor.kind, descriptor.data_kind);
        self.kinds.insert(
            descriptor.kind.clone(),
            RuleKindEntry {
                descriptor: Arc::new(descriptor),
                adapters,
            },
        );
        true
    }

    /// Register an adapter reading `data_kind` from `field_kind` fields for a
    /// rule kind.
    ///
    /// Returns `Ok(false)` if an adapter is already registered for the exact
    /// `(rule_kind, field_kind)` pair; the first registration stays.
    pub fn register_adapter(
        &mut self,
        rule_kind: &RuleKind,
        data_kind: DataKind,
        field_kind: FieldKind,
        adapter: Adapter,
    ) -> Result<bool, ConfigError> {
        let entry = self
            .kinds
            .get_mut(rule_kind)
            .ok_or_else(|| ConfigError::UnknownRuleKind(rule_kind.clone()))?;

        let expected = entry.descriptor.data_kind;
        for got in [data_kind, adapter.data_kind()] {
            if got != expected {
                return Err(ConfigError::IncompatibleAdapter {
                    rule_kind: rule_kind.clone(),
                    expected,
                    got,
                });
            }
        }

        if entry.adapters.contains_key(&field_kind) {
            warn!(
                "Adapter for rule kind '{}' on '{}' already registered, ignoring '{}'",
                rule_kind,
                field_kind,
                adapter.name()
            );
            return Ok(false);
        }

        entry.adapters.insert(field_kind, adapter);
        Ok(true)
    }

    /// Look up a rule kind.
    pub fn descriptor(&self, kind: &RuleKind) -> Option<Arc<RuleKindDescriptor>> {
        self.kinds.get(kind).map(|entry| entry.descriptor.clone())
    }

    pub fn contains(&self, kind: &RuleKind) -> bool {
        self.kinds.contains_key(kind)
    }

    /// All registered rule kinds in registration order.
    pub fn rule_kinds(&self) -> impl Iterator<Item = &RuleKindDescriptor> {
        self.kinds.values().map(|entry| entry.descriptor.as_ref())
    }

    /// Field kinds with an adapter registered for a rule kind.
    pub fn adapted_field_kinds(&self, kind: &RuleKind) -> Vec<&FieldKind> {
        self.kinds
            .get(kind)
            .map(|entry| entry.adapters.keys().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Find the adapter for a rule kind on a field kind.
    ///
    /// Tries the exact field kind, then its nearest registered ancestor, then
    /// the `local` table with the same walk.
    pub fn resolve(
        &self,
        rule_kind: &RuleKind,
        field_kind: &FieldKind,
        local: Option<&AdapterTable>,
    ) -> Option<Adapter> {
        let entry = self.kinds.get(rule_kind)?;
        let lineage = self.lineage(field_kind);

        lineage
            .iter()
            .find_map(|kind| entry.adapters.get(kind).cloned())
            .or_else(|| local.and_then(|table| table.resolve(&lineage, entry.descriptor.data_kind)))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("rule_kinds", &self.kinds.keys().collect::<Vec<_>>())
            .field("field_kinds", &self.parents)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::HeadlessField;
    use crate::core::types::Value;
    use crate::rules::adapter::FnAdapter;

    fn always() -> RuleFactory {
        RuleFactory::plain(|_| Ok(Arc::new(|_: &Value| true) as ValuePredicate))
    }

    fn tagged(tag: &'static str) -> Adapter {
        FnAdapter::new(tag, DataKind::String, move |_| Ok(Value::from(tag))).shared()
    }

    fn registry_with_kind() -> Registry {
        let mut registry = Registry::new();
        registry.declare_field_kind(FieldKind::TEXT, FieldKind::FIELD).unwrap();
        registry.declare_field_kind(FieldKind::TEXT_INPUT, FieldKind::TEXT).unwrap();
        registry
            .declare_field_kind(FieldKind::PASSWORD_INPUT, FieldKind::TEXT_INPUT)
            .unwrap();
        registry.register_rule_kind(RuleKindDescriptor::new(
            "sample",
            DataKind::String,
            "Probe failed",
            always(),
        ));
        registry
    }

    fn extract_tag(adapter: &Adapter) -> Value {
        let field = HeadlessField::text_input("f");
        adapter.extract(&*field).unwrap()
    }

    #[test]
    fn test_duplicate_adapter_keeps_first() {
        let mut registry = registry_with_kind();
        let kind = RuleKind::new("sample");

        assert_eq!(
            registry.register_adapter(&kind, DataKind::String, FieldKind::TEXT_INPUT, tagged("a")),
            Ok(true)
        );
        assert_eq!(
            registry.register_adapter(&kind, DataKind::String, FieldKind::TEXT_INPUT, tagged("b")),
            Ok(false)
        );

        let adapter = registry.resolve(&kind, &FieldKind::TEXT_INPUT, None).unwrap();
        assert_eq!(extract_tag(&adapter), Value::from("a"));
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let mut registry = registry_with_kind();
        let kind = RuleKind::new("sample");

        // Farther ancestor registered first
        registry
            .register_adapter(&kind, DataKind::String, FieldKind::TEXT, tagged("text"))
            .unwrap();
        registry
            .register_adapter(&kind, DataKind::String, FieldKind::TEXT_INPUT, tagged("input"))
            .unwrap();

        let adapter = registry.resolve(&kind, &FieldKind::PASSWORD_INPUT, None).unwrap();
        assert_eq!(extract_tag(&adapter), Value::from("input"));

        let adapter = registry.resolve(&kind, &FieldKind::TEXT, None).unwrap();
        assert_eq!(extract_tag(&adapter), Value::from("text"));
    }

    #[test]
    fn test_local_table_fallback() {
        let registry = registry_with_kind();
        let kind = RuleKind::new("sample");
        assert!(registry.resolve(&kind, &FieldKind::TEXT_INPUT, None).is_none());

        let mut local = AdapterTable::new();
        local.register(FieldKind::TEXT, tagged("local"));
        let adapter = registry.resolve(&kind, &FieldKind::TEXT_INPUT, Some(&local)).unwrap();
        assert_eq!(extract_tag(&adapter), Value::from("local"));
    }

    #[test]
    fn test_incompatible_and_unknown() {
        let mut registry = registry_with_kind();
        let integer = FnAdapter::new("int", DataKind::Integer, |_| Ok(Value::Integer(1))).shared();

        let result = registry.register_adapter(
            &RuleKind::new("sample"),
            DataKind::Integer,
            FieldKind::TEXT,
            integer.clone(),
        );
        assert!(matches!(result, Err(ConfigError::IncompatibleAdapter { .. })));

        let result =
            registry.register_adapter(&RuleKind::new("nope"), DataKind::Integer, FieldKind::TEXT, integer);
        assert_eq!(result, Err(ConfigError::UnknownRuleKind(RuleKind::new("nope"))));
    }

    #[test]
    fn test_field_kind_cycle_refused() {
        let mut registry = registry_with_kind();
        let result = registry.declare_field_kind(FieldKind::TEXT, FieldKind::PASSWORD_INPUT);
        assert!(matches!(result, Err(ConfigError::FieldKindCycle { .. })));

        let result = registry.declare_field_kind(FieldKind::FIELD, FieldKind::FIELD);
        assert!(matches!(result, Err(ConfigError::FieldKindCycle { .. })));

        // Redeclaring keeps the first parent
        assert_eq!(registry.declare_field_kind(FieldKind::TEXT_INPUT, FieldKind::FIELD), Ok(false));
        assert_eq!(registry.parent_of(&FieldKind::TEXT_INPUT), Some(&FieldKind::TEXT));
    }

    #[test]
    fn test_rule_kind_binds_stock_text_adapter() {
        let mut registry = Registry::new();
        registry.register_stock_adapter(FieldKind::TEXT, tagged("stock"));
        registry.register_rule_kind(RuleKindDescriptor::new(
            "custom",
            DataKind::String,
            "Custom failed",
            always(),
        ));
        assert!(!registry.register_rule_kind(RuleKindDescriptor::new(
            "custom",
            DataKind::Integer,
            "Again",
            always(),
        )));

        let kind = RuleKind::new("custom");
        assert_eq!(registry.adapted_field_kinds(&kind), vec![&FieldKind::TEXT]);
        assert_eq!(registry.descriptor(&kind).unwrap().data_kind, DataKind::String);
    }

    #[test]
    fn test_malformed_descriptor() {
        let descriptor =
            RuleKindDescriptor::new("odd", DataKind::String, "Odd", always()).with_cross_field(true);
        assert!(matches!(descriptor.check(), Err(ConfigError::MalformedRuleKind { .. })));
    }

    #[test]
    fn test_global_is_shared() {
        let a = Registry::global();
        let b = Registry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.read().contains(&RuleKind::new("not_empty")));
    }
}
