//! Form declarations.
//!
//! A [`FormSpec`] lists fields with their rule specs and optional order hints.
//! Forms can inherit the fields of a parent form; inherited fields follow the
//! form's own fields.

use crate::core::field::FieldRef;
use crate::core::rule::RuleSpec;
use crate::rules::registry::Registry;
use log::warn;

/// Rules and metadata declared on one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub field: FieldRef,
    /// Position in the evaluation order.
    pub order: Option<i32>,
    /// Skip validation while the field is blank.
    pub optional: bool,
    pub rules: Vec<RuleSpec>,
}

impl FieldSpec {
    pub fn new(field: FieldRef) -> Self {
        Self {
            field,
            order: None,
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A declared form.
#[derive(Debug, Clone, Default)]
pub struct FormSpec {
    name: String,
    own: Vec<FieldSpec>,
    inherited: Vec<FieldSpec>,
}

impl FormSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            own: Vec::new(),
            inherited: Vec::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> FormSpecBuilder {
        FormSpecBuilder {
            spec: Self::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a field on this form.
    pub fn add_field(&mut self, field: FieldSpec) {
        self.own.push(field);
    }

    /// Inherit every field of `parent`, own and inherited.
    pub fn extend(&mut self, parent: FormSpec) {
        self.inherited.extend(parent.own);
        self.inherited.extend(parent.inherited);
    }

    /// All declared fields: own fields first, then inherited ones.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.own.iter().chain(self.inherited.iter())
    }

    pub fn len(&self) -> usize {
        self.own.len() + self.inherited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fields that take part in validation.
    ///
    /// Rule specs of kinds the registry does not know are dropped. Fields
    /// left with no rules and no order are excluded.
    pub fn annotated_fields(&self, registry: &Registry) -> Vec<FieldSpec> {
        self.fields()
            .filter_map(|spec| {
                let rules: Vec<RuleSpec> = spec
                    .rules
                    .iter()
                    .filter(|rule| {
                        let known = registry.contains(&rule.kind);
                        if !known {
                            warn!(
                                "Ignoring unknown rule kind '{}' on field '{}'",
                                rule.kind,
                                spec.field.name()
                            );
                        }
                        known
                    })
                    .cloned()
                    .collect();

                if rules.is_empty() && spec.order.is_none() {
                    return None;
                }
                Some(FieldSpec {
                    rules,
                    ..spec.clone()
                })
            })
            .collect()
    }
}

/// Builder for [`FormSpec`].
#[derive(Debug)]
pub struct FormSpecBuilder {
    spec: FormSpec,
}

impl FormSpecBuilder {
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.spec.add_field(field);
        self
    }

    pub fn inherit(mut self, parent: FormSpec) -> Self {
        self.spec.extend(parent);
        self
    }

    pub fn build(self) -> FormSpec {
        self.spec
    }
}
