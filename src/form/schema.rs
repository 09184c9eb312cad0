//! Form schemas for saving and loading declarations.
//!
//! A schema is the serializable half of a [`FormSpec`]: field names, kinds,
//! order hints and rule specs. Binding a schema to live field handles turns
//! it back into a `FormSpec`.

use crate::core::error::{ConfigError, PariksaError};
use crate::core::field::{FieldKind, FieldRef, HeadlessField};
use crate::core::rule::RuleSpec;
use crate::form::spec::{FieldSpec, FormSpec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Serializable declaration of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name, used to find the field handle
    pub name: String,
    /// Widget type for headless fields
    #[serde(default = "default_kind")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

fn default_kind() -> FieldKind {
    FieldKind::TEXT_INPUT
}

fn default_version() -> String {
    FormSchema::VERSION.to_string()
}

/// Serializable form declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Schema format version
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

impl FormSchema {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, PariksaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Deserialize from TOML.
    pub fn from_toml(text: &str) -> Result<Self, PariksaError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a `.json` or `.toml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PariksaError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("toml") => Self::from_toml(&text),
            other => Err(PariksaError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Capture the declarations of a form. Inherited fields are flattened.
    pub fn from_spec(spec: &FormSpec) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            name: spec.name().to_string(),
            fields: spec
                .fields()
                .map(|field| FieldSchema {
                    name: field.field.name().to_string(),
                    kind: field.field.kind(),
                    order: field.order,
                    optional: field.optional,
                    rules: field.rules.clone(),
                })
                .collect(),
        }
    }

    /// Resolve field names to handles and build a [`FormSpec`].
    pub fn bind<F>(&self, lookup: F) -> Result<FormSpec, ConfigError>
    where
        F: Fn(&str) -> Option<FieldRef>,
    {
        let mut spec = FormSpec::new(self.name.clone());
        for schema in &self.fields {
            let field = lookup(&schema.name).ok_or_else(|| ConfigError::UnboundField {
                name: schema.name.clone(),
            })?;
            spec.add_field(FieldSpec {
                field,
                order: schema.order,
                optional: schema.optional,
                rules: schema.rules.clone(),
            });
        }
        Ok(spec)
    }

    /// Create an in-memory field for every declared field, keyed by name.
    pub fn headless_fields(&self) -> IndexMap<String, Arc<HeadlessField>> {
        self.fields
            .iter()
            .map(|schema| {
                (
                    schema.name.clone(),
                    HeadlessField::new(schema.name.clone(), schema.kind.clone()),
                )
            })
            .collect()
    }
}
