//! Stock adapters for the built-in field kinds.

use crate::core::error::ConversionError;
use crate::core::field::Field;
use crate::core::types::{DataKind, Value};
use crate::rules::adapter::FieldAdapter;

fn read_text(field: &dyn Field) -> Result<String, ConversionError> {
    field.text().ok_or_else(|| ConversionError::MissingCapability {
        capability: "text".to_string(),
    })
}

fn text_is_blank(field: &dyn Field) -> bool {
    field.text().map_or(true, |text| text.trim().is_empty())
}

/// Raw text of a text field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAdapter;

impl FieldAdapter for TextAdapter {
    fn data_kind(&self) -> DataKind {
        DataKind::String
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        read_text(field).map(Value::String)
    }

    fn is_blank(&self, field: &dyn Field) -> bool {
        field.text().map_or(true, |text| text.is_empty())
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Text parsed as a signed integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerTextAdapter;

impl FieldAdapter for IntegerTextAdapter {
    fn data_kind(&self) -> DataKind {
        DataKind::Integer
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        let text = read_text(field)?;
        text.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ConversionError::InvalidNumber {
                text,
                expected: DataKind::Integer,
            })
    }

    fn is_blank(&self, field: &dyn Field) -> bool {
        text_is_blank(field)
    }

    fn name(&self) -> &str {
        "text_integer"
    }
}

/// Text parsed as a decimal number.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatTextAdapter;

impl FieldAdapter for FloatTextAdapter {
    fn data_kind(&self) -> DataKind {
        DataKind::Float
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        let text = read_text(field)?;
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Value::Float(value)),
            _ => Err(ConversionError::InvalidNumber {
                text,
                expected: DataKind::Float,
            }),
        }
    }

    fn is_blank(&self, field: &dyn Field) -> bool {
        text_is_blank(field)
    }

    fn name(&self) -> &str {
        "text_float"
    }
}

/// Checked state of a toggle, or whether a radio group has a selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckedAdapter;

impl FieldAdapter for CheckedAdapter {
    fn data_kind(&self) -> DataKind {
        DataKind::Boolean
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        field
            .is_checked()
            .map(Value::Boolean)
            .ok_or_else(|| ConversionError::MissingCapability {
                capability: "checked state".to_string(),
            })
    }

    fn name(&self) -> &str {
        "checked"
    }
}

/// Selected position of a dropdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionAdapter;

impl FieldAdapter for SelectionAdapter {
    fn data_kind(&self) -> DataKind {
        DataKind::Integer
    }

    fn extract(&self, field: &dyn Field) -> Result<Value, ConversionError> {
        let index = field
            .selected_index()
            .ok_or_else(|| ConversionError::MissingCapability {
                capability: "selection".to_string(),
            })?;
        i64::try_from(index)
            .map(Value::Integer)
            .map_err(|_| ConversionError::Other(format!("selection {} out of range", index)))
    }

    fn name(&self) -> &str {
        "selection"
    }
}
