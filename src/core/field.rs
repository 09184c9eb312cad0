//! Field handles.
//!
//! A field is whatever data-entry element the host toolkit owns: a text box,
//! a checkbox, a dropdown. The engine never creates or destroys fields, it only
//! observes them through the [`Field`] trait. [`HeadlessField`] is an in-memory
//! implementation for hosts without a widget toolkit (and for tests).

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identity of a field, used as the key of the rule map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(pub Uuid);

impl FieldId {
    /// Create a new random field ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a field ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The widget type of a field.
///
/// Field kinds form a single-parent hierarchy declared in the
/// [`Registry`](crate::rules::Registry), so that an adapter registered for
/// `text` also serves `text_input` and `password_input`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKind(Cow<'static, str>);

impl FieldKind {
    /// Root of the hierarchy.
    pub const FIELD: FieldKind = FieldKind(Cow::Borrowed("field"));
    /// Anything that displays text.
    pub const TEXT: FieldKind = FieldKind(Cow::Borrowed("text"));
    /// Editable text.
    pub const TEXT_INPUT: FieldKind = FieldKind(Cow::Borrowed("text_input"));
    /// Editable text with masked input.
    pub const PASSWORD_INPUT: FieldKind = FieldKind(Cow::Borrowed("password_input"));
    /// Two-state buttons.
    pub const TOGGLE: FieldKind = FieldKind(Cow::Borrowed("toggle"));
    pub const CHECKBOX: FieldKind = FieldKind(Cow::Borrowed("checkbox"));
    pub const RADIO_BUTTON: FieldKind = FieldKind(Cow::Borrowed("radio_button"));
    /// A group of radio buttons; "checked" means one option is selected.
    pub const RADIO_GROUP: FieldKind = FieldKind(Cow::Borrowed("radio_group"));
    /// Dropdown / spinner.
    pub const SELECT: FieldKind = FieldKind(Cow::Borrowed("select"));

    /// Create a custom field kind.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The kind's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability the engine needs from a data-entry element.
///
/// Only identity and the interactable predicates are mandatory. The value
/// reads default to `None`; built-in adapters turn a `None` into a conversion
/// error naming the field. Custom adapters can reach toolkit-specific state
/// through [`Field::as_any`].
pub trait Field: Send + Sync + fmt::Debug {
    /// Stable identity of this field.
    fn id(&self) -> FieldId;

    /// Name used in messages and schema binding.
    fn name(&self) -> &str;

    /// Widget type, used for adapter resolution.
    fn kind(&self) -> FieldKind;

    /// Whether the field is currently displayed.
    fn is_shown(&self) -> bool {
        true
    }

    /// Whether the field currently accepts input.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Current text, for text-like fields.
    fn text(&self) -> Option<String> {
        None
    }

    /// Checked state, for toggles and radio groups.
    fn is_checked(&self) -> Option<bool> {
        None
    }

    /// Selected position, for dropdowns.
    fn selected_index(&self) -> Option<usize> {
        None
    }

    /// Access to the concrete type for custom adapters.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a field.
pub type FieldRef = Arc<dyn Field>;

/// Mutable state of a [`HeadlessField`].
#[derive(Debug, Clone)]
struct FieldState {
    text: String,
    checked: bool,
    selected: Option<usize>,
    shown: bool,
    enabled: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            text: String::new(),
            checked: false,
            selected: None,
            shown: true,
            enabled: true,
        }
    }
}

/// An in-memory field.
///
/// Exposes every capability read regardless of kind; the kind only decides
/// which adapter the registry picks.
#[derive(Debug)]
pub struct HeadlessField {
    id: FieldId,
    name: String,
    kind: FieldKind,
    state: RwLock<FieldState>,
}

impl HeadlessField {
    /// Create a field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Arc<Self> {
        Arc::new(Self {
            id: FieldId::new(),
            name: name.into(),
            kind,
            state: RwLock::new(FieldState::default()),
        })
    }

    /// Create a text input.
    pub fn text_input(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, FieldKind::TEXT_INPUT)
    }

    /// Create a checkbox.
    pub fn checkbox(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, FieldKind::CHECKBOX)
    }

    /// Create a dropdown.
    pub fn select(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, FieldKind::SELECT)
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.state.write().text = text.into();
    }

    pub fn set_checked(&self, checked: bool) {
        self.state.write().checked = checked;
    }

    pub fn set_selected(&self, index: Option<usize>) {
        self.state.write().selected = index;
    }

    pub fn set_shown(&self, shown: bool) {
        self.state.write().shown = shown;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.state.write().enabled = enabled;
    }

    /// Upcast to a shared field handle.
    pub fn handle(self: &Arc<Self>) -> FieldRef {
        self.clone()
    }
}

impl Field for HeadlessField {
    fn id(&self) -> FieldId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FieldKind {
        self.kind.clone()
    }

    fn is_shown(&self) -> bool {
        self.state.read().shown
    }

    fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    fn text(&self) -> Option<String> {
        Some(self.state.read().text.clone())
    }

    fn is_checked(&self) -> Option<bool> {
        Some(self.state.read().checked)
    }

    fn selected_index(&self) -> Option<usize> {
        // An empty dropdown reports position 0, like most toolkits
        Some(self.state.read().selected.unwrap_or(0))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Whether the field takes part in a validation pass.
pub(crate) fn is_interactable(field: &dyn Field, include_hidden: bool) -> bool {
    field.is_enabled() && (include_hidden || field.is_shown())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_id_display() {
        let id = FieldId::new();
        assert_eq!(format!("{}", id).len(), 8);
    }

    #[test]
    fn test_headless_state() {
        let field = HeadlessField::text_input("name");
        field.set_text("Ada");
        assert_eq!(field.text().as_deref(), Some("Ada"));
        assert_eq!(field.kind(), FieldKind::TEXT_INPUT);

        let handle = field.handle();
        assert_eq!(handle.id(), field.id());
        assert_eq!(handle.name(), "name");
    }

    #[test]
    fn test_interactable() {
        let field = HeadlessField::checkbox("terms");
        assert!(is_interactable(&*field, false));

        field.set_shown(false);
        assert!(!is_interactable(&*field, false));
        assert!(is_interactable(&*field, true));

        field.set_enabled(false);
        assert!(!is_interactable(&*field, true));
    }

    #[test]
    fn test_field_kind_serde() {
        let json = serde_json::to_string(&FieldKind::CHECKBOX).unwrap();
        assert_eq!(json, "\"checkbox\"");
        let back: FieldKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldKind::CHECKBOX);
    }
}
