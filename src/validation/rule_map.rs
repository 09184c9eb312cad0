//! The field → rules map a validator evaluates.
//!
//! Entries are kept in evaluation order. The map tracks whether every field
//! declared an order, because fail-fast and partial validation depend on it.

use crate::core::context::FieldLookup;
use crate::core::error::ConfigError;
use crate::core::field::{FieldId, FieldRef};
use crate::core::rule::{RuleInstance, RuleKind};
use crate::core::types::Value;
use crate::form::ordering::{order_fields, sort_rules, OrderingState};
use crate::rules::adapter::Adapter;
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::warn;
use std::sync::Arc;

/// A live rule and the adapter that feeds it.
///
/// Declarative rules always carry an adapter; quick rules carry none.
#[derive(Debug, Clone)]
pub struct Binding {
    pub rule: Arc<RuleInstance>,
    pub adapter: Option<Adapter>,
}

impl Binding {
    pub fn new(rule: RuleInstance, adapter: Option<Adapter>) -> Self {
        Self {
            rule: Arc::new(rule),
            adapter,
        }
    }
}

/// One field and its rules, sorted by sequence.
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub field: FieldRef,
    /// Declared order, if any.
    pub order: Option<i32>,
    /// Skip the field when it is blank.
    pub optional: bool,
    pub bindings: Vec<Binding>,
}

impl FieldEntry {
    pub fn new(field: FieldRef, order: Option<i32>, optional: bool, mut bindings: Vec<Binding>) -> Self {
        sort_rules(&mut bindings, |binding| binding.rule.sequence());
        Self {
            field,
            order,
            optional,
            bindings,
        }
    }

    /// Whether any declarative adapter reports the field blank.
    pub fn is_blank(&self) -> bool {
        self.bindings
            .iter()
            .filter_map(|binding| binding.adapter.as_ref())
            .any(|adapter| adapter.is_blank(&*self.field))
    }

    /// First declarative binding of the given rule kind.
    pub fn binding_of(&self, kind: &RuleKind) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|binding| binding.adapter.is_some() && binding.rule.kind() == kind)
    }

    /// Append rules and restore sequence order.
    pub fn extend(&mut self, bindings: impl IntoIterator<Item = Binding>) {
        self.bindings.extend(bindings);
        sort_rules(&mut self.bindings, |binding| binding.rule.sequence());
    }
}

/// Ordered map of fields to their rules.
#[derive(Debug, Clone)]
pub struct FieldRuleMap {
    entries: IndexMap<FieldId, FieldEntry>,
    state: OrderingState,
}

impl FieldRuleMap {
    /// Build a map from entries in declaration order.
    ///
    /// A field declared more than once keeps its first position and
    /// optionality and collects the rules of every declaration. Its order is
    /// the first one declared.
    pub fn new(entries: Vec<FieldEntry>) -> Self {
        let mut merged: IndexMap<FieldId, FieldEntry> = IndexMap::with_capacity(entries.len());
        for entry in entries {
            match merged.entry(entry.field.id()) {
                Entry::Occupied(mut slot) => {
                    warn!(
                        "Field '{}' is declared more than once, merging its rules",
                        entry.field.name()
                    );
                    let existing = slot.get_mut();
                    existing.order = existing.order.or(entry.order);
                    existing.extend(entry.bindings);
                }
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }

        let mut map = Self {
            entries: merged,
            state: OrderingState::Unordered,
        };
        map.reorder();
        map
    }

    /// Re-classify the ordering state; sorts the entries when every field
    /// has an order.
    fn reorder(&mut self) {
        let ranks: Vec<Option<i32>> = self.entries.values().map(|entry| entry.order).collect();
        let ordering = order_fields(&ranks);
        if ordering.state.is_ordered() {
            let mut entries: Vec<Option<(FieldId, FieldEntry)>> =
                self.entries.drain(..).map(Some).collect();
            self.entries = ordering
                .indices
                .iter()
                .filter_map(|&i| entries[i].take())
                .collect();
        }
        self.state = ordering.state;
    }

    pub fn state(&self) -> OrderingState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &FieldId) -> Option<&FieldEntry> {
        self.entries.get(id)
    }

    /// Position of a field in evaluation order.
    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.entries.get_index_of(id)
    }

    /// Entries in evaluation order.
    pub fn entries(&self) -> impl Iterator<Item = &FieldEntry> {
        self.entries.values()
    }

    /// Total number of rules across all fields.
    pub fn rule_count(&self) -> usize {
        self.entries.values().map(|entry| entry.bindings.len()).sum()
    }

    /// Add rules to a field already in the map. Returns `false` if the field
    /// is unknown.
    pub fn extend_field(&mut self, id: &FieldId, bindings: Vec<Binding>) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.extend(bindings);
                true
            }
            None => false,
        }
    }

    /// Add a new field at the end.
    pub fn append(&mut self, entry: FieldEntry) {
        self.entries.insert(entry.field.id(), entry);
        self.reorder();
    }

    /// Add a new field after every field whose order is at most its own.
    pub fn insert_ordered(&mut self, entry: FieldEntry) {
        let position = match entry.order {
            Some(rank) => self
                .entries
                .values()
                .position(|existing| existing.order.map_or(false, |order| order > rank))
                .unwrap_or(self.entries.len()),
            None => self.entries.len(),
        };
        self.entries.shift_insert(position, entry.field.id(), entry);
        self.reorder();
    }

    /// Remove a field and all of its rules.
    pub fn remove(&mut self, id: &FieldId) -> Option<FieldEntry> {
        let removed = self.entries.shift_remove(id);
        if removed.is_some() {
            self.reorder();
        }
        removed
    }
}

impl FieldLookup for FieldRuleMap {
    fn fields_with(&self, kind: &RuleKind) -> Vec<FieldRef> {
        self.entries()
            .filter(|entry| entry.binding_of(kind).is_some())
            .map(|entry| entry.field.clone())
            .collect()
    }

    fn read(&self, field: &FieldRef, kind: &RuleKind) -> Result<Value, ConfigError> {
        let entry = self
            .get(&field.id())
            .ok_or_else(|| ConfigError::UnknownField {
                field: field.name().to_string(),
            })?;

        let adapter = entry
            .binding_of(kind)
            .and_then(|binding| binding.adapter.as_ref())
            .ok_or_else(|| ConfigError::MissingCrossFieldSource {
                requester: kind.clone(),
                source_kind: kind.clone(),
            })?;

        adapter
            .extract(&**field)
            .map_err(|source| ConfigError::Conversion {
                field: field.name().to_string(),
                rule_kind: kind.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ValidationContext;
    use crate::core::field::{Field, HeadlessField};
    use crate::core::rule::{QuickRule, RuleCheck};
    use crate::core::types::DataKind;
    use crate::rules::adapter::FnAdapter;

    fn quick(sequence: i32) -> Binding {
        let rule = QuickRule::new(format!("rule {}", sequence), |_| true).with_sequence(sequence);
        Binding::new(rule.into_instance(), None)
    }

    fn entry(name: &str, order: Option<i32>) -> FieldEntry {
        FieldEntry::new(HeadlessField::text_input(name), order, false, vec![quick(0)])
    }

    fn names(map: &FieldRuleMap) -> Vec<String> {
        map.entries().map(|entry| entry.field.name().to_string()).collect()
    }

    #[test]
    fn test_ordered_build_sorts() {
        let map = FieldRuleMap::new(vec![entry("c", Some(3)), entry("a", Some(1)), entry("b", Some(2))]);
        assert_eq!(map.state(), OrderingState::Ordered);
        assert_eq!(names(&map), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mixed_keeps_declaration_order() {
        let map = FieldRuleMap::new(vec![entry("c", Some(3)), entry("a", None)]);
        assert_eq!(map.state(), OrderingState::Mixed);
        assert_eq!(names(&map), vec!["c", "a"]);
    }

    #[test]
    fn test_insert_ordered() {
        let mut map = FieldRuleMap::new(vec![entry("a", Some(1)), entry("c", Some(3))]);
        map.insert_ordered(entry("b", Some(2)));
        map.insert_ordered(entry("d", Some(3)));
        assert_eq!(names(&map), vec!["a", "b", "c", "d"]);
        assert_eq!(map.state(), OrderingState::Ordered);
    }

    #[test]
    fn test_remove_recomputes_state() {
        let unranked = entry("x", None);
        let id = unranked.field.id();
        let mut map = FieldRuleMap::new(vec![entry("b", Some(2)), unranked, entry("a", Some(1))]);
        assert_eq!(map.state(), OrderingState::Mixed);

        assert!(map.remove(&id).is_some());
        assert_eq!(map.state(), OrderingState::Ordered);
        assert_eq!(names(&map), vec!["a", "b"]);
    }

    #[test]
    fn test_rules_sorted_by_sequence() {
        let field = HeadlessField::text_input("f");
        let mut entry = FieldEntry::new(field.clone(), None, false, vec![quick(2), quick(-1)]);
        entry.extend(vec![quick(1)]);
        let sequences: Vec<i32> = entry.bindings.iter().map(|b| b.rule.sequence()).collect();
        assert_eq!(sequences, vec![-1, 1, 2]);
    }

    fn declared(kind: &'static str) -> Binding {
        let rule = RuleInstance::new(
            RuleKind::new(kind),
            -1,
            "failed",
            RuleCheck::Value(Arc::new(|_: &Value| true)),
        );
        let adapter = FnAdapter::new("text", DataKind::String, |field| {
            Ok(Value::String(field.text().unwrap_or_default()))
        });
        Binding::new(rule, Some(adapter.shared()))
    }

    #[test]
    fn test_duplicate_declarations_merge() {
        let name = HeadlessField::text_input("name");
        let other = HeadlessField::text_input("other");
        let map = FieldRuleMap::new(vec![
            FieldEntry::new(name.clone(), None, true, vec![declared("not_empty")]),
            FieldEntry::new(other, Some(2), false, vec![quick(0)]),
            FieldEntry::new(name.clone(), Some(1), false, vec![declared("length")]),
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.rule_count(), 3);
        assert_eq!(map.state(), OrderingState::Ordered);
        assert_eq!(names(&map), vec!["name", "other"]);

        let entry = map.get(&name.id()).unwrap();
        assert!(entry.optional);
        assert_eq!(entry.order, Some(1));
        let kinds: Vec<&str> = entry.bindings.iter().map(|b| b.rule.kind().as_str()).collect();
        assert_eq!(kinds, vec!["not_empty", "length"]);
    }

    #[test]
    fn test_lookup_reads_declared_sources() {
        let password = HeadlessField::text_input("password");
        password.set_text("hunter22");
        let other = HeadlessField::text_input("other");

        let map = FieldRuleMap::new(vec![
            FieldEntry::new(password.clone(), None, false, vec![declared("password")]),
            FieldEntry::new(other, None, false, vec![declared("not_empty"), quick(0)]),
        ]);
        let ctx = ValidationContext::new(&map);

        let kind = RuleKind::new("password");
        let fields = ctx.fields_with(&kind);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id(), password.id());
        assert_eq!(ctx.value(&fields[0], &kind), Ok(Value::from("hunter22")));

        assert!(ctx.fields_with(&RuleKind::QUICK).is_empty());
        let stranger: FieldRef = HeadlessField::text_input("stranger");
        assert!(matches!(
            ctx.value(&stranger, &kind),
            Err(ConfigError::UnknownField { .. })
        ));
    }
}
