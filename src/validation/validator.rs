//! The validator: builds a form's rule map once and evaluates it.
//!
//! State lives behind a mutex so synchronous calls, quick-rule edits and the
//! background worker of [`Validator::validate_async`] all see one map.

use crate::core::error::ConfigError;
use crate::core::field::{FieldKind, FieldRef};
use crate::core::report::ValidationReport;
use crate::core::rule::QuickRule;
use crate::execution::dispatch::{CallbackDispatcher, ImmediateDispatcher};
use crate::execution::task::{AsyncRun, RunState};
use crate::form::spec::FormSpec;
use crate::rules::adapter::{Adapter, AdapterTable};
use crate::rules::registry::{Registry, SharedRegistry};
use crate::validation::evaluate::{Pass, PassOutcome};
use crate::validation::instantiate::build_map;
use crate::validation::listener::{
    AsyncValidationListener, FieldValidatedAction, ValidationListener,
};
use crate::validation::rule_map::{Binding, FieldEntry, FieldRuleMap};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Options
// ============================================================================

/// How far a pass goes once a field fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Evaluate everything and collect every failure.
    #[default]
    Burst,
    /// Stop after the first field with a failing rule. Needs ordered fields.
    Immediate,
}

/// Options for a [`Validator`].
#[derive(Clone)]
pub struct ValidatorOptions {
    pub mode: Mode,
    /// Validate fields that are not shown.
    pub validate_hidden_fields: bool,
    /// Where asynchronous completion callbacks run.
    pub dispatcher: Arc<dyn CallbackDispatcher>,
}

impl std::fmt::Debug for ValidatorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorOptions")
            .field("mode", &self.mode)
            .field("validate_hidden_fields", &self.validate_hidden_fields)
            .field("dispatcher", &"<dispatcher>")
            .finish()
    }
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Burst,
            validate_hidden_fields: false,
            dispatcher: Arc::new(ImmediateDispatcher),
        }
    }
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_hidden_fields(mut self, validate: bool) -> Self {
        self.validate_hidden_fields = validate;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn CallbackDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }
}

// ============================================================================
// Validator
// ============================================================================

/// Where reporting stops.
#[derive(Clone, Copy)]
enum Boundary<'a> {
    All,
    Till(&'a FieldRef),
    Before(&'a FieldRef),
}

struct Inner {
    form: FormSpec,
    registry: SharedRegistry,
    /// Built on first use.
    map: Option<FieldRuleMap>,
    options: ValidatorOptions,
    listener: Option<Arc<dyn ValidationListener>>,
    async_listener: Option<Arc<dyn AsyncValidationListener>>,
    field_action: Option<Arc<dyn FieldValidatedAction>>,
    local_adapters: AdapterTable,
}

impl Inner {
    fn ensure_map(&mut self) -> Result<&mut FieldRuleMap, ConfigError> {
        let map = match self.map.take() {
            Some(map) => map,
            None => {
                let registry = self.registry.read();
                build_map(&self.form, &registry, &self.local_adapters)?
            }
        };
        Ok(self.map.insert(map))
    }

    fn ready_map(&mut self) -> Result<&FieldRuleMap, ConfigError> {
        let map = self.ensure_map()?;
        if map.is_empty() {
            return Err(ConfigError::NoRules);
        }
        Ok(map)
    }

    fn evaluate(
        &mut self,
        mode: Mode,
        boundary: Boundary<'_>,
        is_cancelled: &dyn Fn() -> bool,
    ) -> Result<PassOutcome, ConfigError> {
        let validate_hidden = self.options.validate_hidden_fields;
        let map = self.ready_map()?;

        let operation = match (boundary, mode) {
            (Boundary::Till(_), _) => Some("validate_till"),
            (Boundary::Before(_), _) => Some("validate_before"),
            (Boundary::All, Mode::Immediate) => Some("immediate validation"),
            (Boundary::All, Mode::Burst) => None,
        };
        if let Some(operation) = operation {
            if !map.state().is_ordered() {
                return Err(ConfigError::UnorderedFields {
                    operation: operation.to_string(),
                });
            }
        }

        let position = |field: &FieldRef| {
            map.position(&field.id())
                .ok_or_else(|| ConfigError::UnknownField {
                    field: field.name().to_string(),
                })
        };
        let limit = match boundary {
            Boundary::All => map.len(),
            Boundary::Till(field) => position(field)? + 1,
            Boundary::Before(field) => position(field)?,
        };

        debug!(
            "Validating {} field(s) in {:?} mode, reporting the first {}",
            map.len(),
            mode,
            limit
        );
        Pass::full(map, mode, validate_hidden)
            .with_limit(limit)
            .with_cancellation(is_cancelled)
            .run()
    }
}

/// Validates the fields of one form.
pub struct Validator {
    inner: Arc<Mutex<Inner>>,
    current_run: Mutex<Option<AsyncRun>>,
}

impl Validator {
    /// Create a validator backed by the process-wide registry.
    pub fn new(form: FormSpec) -> Self {
        Self::with_registry(form, Registry::global())
    }

    /// Create a validator backed by the given registry.
    pub fn with_registry(form: FormSpec, registry: SharedRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                form,
                registry,
                map: None,
                options: ValidatorOptions::default(),
                listener: None,
                async_listener: None,
                field_action: None,
                local_adapters: AdapterTable::new(),
            })),
            current_run: Mutex::new(None),
        }
    }

    pub fn with_options(self, options: ValidatorOptions) -> Self {
        self.inner.lock().options = options;
        self
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn set_mode(&self, mode: Mode) {
        self.inner.lock().options.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.inner.lock().options.mode
    }

    pub fn set_validate_hidden_fields(&self, validate: bool) {
        self.inner.lock().options.validate_hidden_fields = validate;
    }

    pub fn set_validation_listener(&self, listener: Arc<dyn ValidationListener>) {
        self.inner.lock().listener = Some(listener);
    }

    pub fn set_async_listener(&self, listener: Arc<dyn AsyncValidationListener>) {
        self.inner.lock().async_listener = Some(listener);
    }

    pub fn set_field_validated_action(&self, action: Arc<dyn FieldValidatedAction>) {
        self.inner.lock().field_action = Some(action);
    }

    /// Register an adapter for this validator only, keyed by its data kind.
    ///
    /// Consulted when the registry has no adapter for a field kind. Returns
    /// `false` if the pair was already registered.
    pub fn register_adapter(&self, field_kind: FieldKind, adapter: Adapter) -> bool {
        let mut inner = self.inner.lock();
        if inner.map.is_some() {
            debug!(
                "Adapter for '{}' registered after the rule map was built",
                field_kind
            );
        }
        inner.local_adapters.register(field_kind, adapter)
    }

    // ------------------------------------------------------------------------
    // Synchronous validation
    // ------------------------------------------------------------------------

    /// Validate every field.
    pub fn validate(&self) -> Result<ValidationReport, ConfigError> {
        self.validate_sync(Boundary::All)
    }

    /// Validate fields up to and including `field`. Later failures only set
    /// `has_more_errors`.
    pub fn validate_till(&self, field: &FieldRef) -> Result<ValidationReport, ConfigError> {
        self.validate_sync(Boundary::Till(field))
    }

    /// Validate fields strictly before `field`.
    pub fn validate_before(&self, field: &FieldRef) -> Result<ValidationReport, ConfigError> {
        self.validate_sync(Boundary::Before(field))
    }

    fn validate_sync(&self, boundary: Boundary<'_>) -> Result<ValidationReport, ConfigError> {
        let (outcome, listener, field_action) = {
            let mut inner = self.inner.lock();
            let listener = inner.listener.clone().ok_or(ConfigError::MissingListener)?;
            let field_action = inner.field_action.clone();
            let mode = inner.options.mode;
            (inner.evaluate(mode, boundary, &|| false)?, listener, field_action)
        };

        let report = outcome.report;
        notify_passed(field_action.as_deref(), &outcome.passed);
        if report.is_success() {
            listener.on_validation_succeeded();
        } else {
            listener.on_validation_failed(&report.errors);
        }
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Quick rules
    // ------------------------------------------------------------------------

    /// Attach quick rules to a field.
    ///
    /// A field new to an ordered configuration must go through
    /// [`put_ordered`](Self::put_ordered).
    pub fn put(&self, field: &FieldRef, rules: Vec<QuickRule>) -> Result<(), ConfigError> {
        self.put_rules(field, None, rules)
    }

    /// Attach quick rules to a field, placing it at `order` if it is new.
    pub fn put_ordered(
        &self,
        field: &FieldRef,
        order: i32,
        rules: Vec<QuickRule>,
    ) -> Result<(), ConfigError> {
        self.put_rules(field, Some(order), rules)
    }

    fn put_rules(
        &self,
        field: &FieldRef,
        order: Option<i32>,
        rules: Vec<QuickRule>,
    ) -> Result<(), ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyQuickRules {
                field: field.name().to_string(),
            });
        }

        let mut inner = self.inner.lock();
        let map = inner.ensure_map()?;
        let bindings: Vec<Binding> = rules
            .into_iter()
            .map(|rule| Binding::new(rule.into_instance(), None))
            .collect();
        let count = bindings.len();

        let id = field.id();
        if map.contains(&id) {
            map.extend_field(&id, bindings);
            debug!("Added {} quick rule(s) to '{}'", count, field.name());
            return Ok(());
        }

        match order {
            Some(order) => {
                map.insert_ordered(FieldEntry::new(field.clone(), Some(order), false, bindings));
            }
            None if map.state().is_ordered() => {
                return Err(ConfigError::UnorderedQuickRuleField {
                    field: field.name().to_string(),
                });
            }
            None => map.append(FieldEntry::new(field.clone(), None, false, bindings)),
        }
        debug!(
            "Added field '{}' with {} quick rule(s), ordering now {:?}",
            field.name(),
            count,
            map.state()
        );
        Ok(())
    }

    /// Remove every rule of a field. Returns `false` if it had none.
    pub fn remove_rules(&self, field: &FieldRef) -> Result<bool, ConfigError> {
        let mut inner = self.inner.lock();
        let removed = inner.ensure_map()?.remove(&field.id()).is_some();
        if removed {
            debug!("Removed rules of '{}'", field.name());
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Asynchronous validation
    // ------------------------------------------------------------------------

    /// Validate every field on a worker thread in burst mode.
    ///
    /// A run already in flight is cancelled first. Configuration problems
    /// found before the worker starts are returned here.
    pub fn validate_async(&self) -> Result<(), ConfigError> {
        let previous = self.current_run.lock().take();
        if let Some(previous) = previous {
            if previous.cancel() {
                info!("Cancelled the previous asynchronous validation");
            }
        }

        let listener = {
            let mut inner = self.inner.lock();
            let listener = inner
                .async_listener
                .clone()
                .ok_or(ConfigError::MissingAsyncListener)?;
            inner.ready_map()?;
            listener
        };

        listener.pre_validation();

        // The worker is detached. A cancelled worker finishes its pass and
        // drops the outcome.
        let state = RunState::new_shared();
        {
            let inner = self.inner.clone();
            let state = state.clone();
            let listener = listener.clone();
            std::thread::spawn(move || run_worker(inner, state, listener));
        }
        info!("Started asynchronous validation");

        let displaced = self
            .current_run
            .lock()
            .replace(AsyncRun { state, listener });
        if let Some(displaced) = displaced {
            displaced.cancel();
        }
        Ok(())
    }

    /// Cancel the run in flight. Returns `true` if a run was cancelled.
    pub fn cancel_async(&self) -> bool {
        let run = self.current_run.lock().take();
        match run {
            Some(run) => {
                let cancelled = run.cancel();
                if cancelled {
                    info!("Cancelled asynchronous validation");
                }
                cancelled
            }
            None => false,
        }
    }

    /// Whether an asynchronous run is in flight.
    pub fn is_validating(&self) -> bool {
        self.current_run
            .lock()
            .as_ref()
            .map_or(false, |run| run.state.is_running())
    }
}

fn run_worker(
    inner: Arc<Mutex<Inner>>,
    state: Arc<RunState>,
    listener: Arc<dyn AsyncValidationListener>,
) {
    let (outcome, dispatcher, field_action) = {
        let mut inner = inner.lock();
        if state.is_cancelled() {
            return;
        }
        let dispatcher = inner.options.dispatcher.clone();
        let field_action = inner.field_action.clone();
        let is_cancelled = || state.is_cancelled();
        (
            inner.evaluate(Mode::Burst, Boundary::All, &is_cancelled),
            dispatcher,
            field_action,
        )
    };

    if !state.try_finish() {
        debug!("Asynchronous validation finished after it was cancelled");
        return;
    }

    dispatcher.dispatch(Box::new(move || match outcome {
        Ok(outcome) => {
            notify_passed(field_action.as_deref(), &outcome.passed);
            if outcome.report.is_success() {
                listener.on_success();
            } else {
                listener.on_failure(&outcome.report.errors);
            }
        }
        Err(err) => listener.on_error(&err),
    }));
}

fn notify_passed(action: Option<&dyn FieldValidatedAction>, passed: &[FieldRef]) {
    if let Some(action) = action {
        for field in passed {
            action.on_all_rules_passed(field);
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Validator")
            .field("form", &inner.form.name())
            .field("options", &inner.options)
            .field("built", &inner.map.is_some())
            .finish()
    }
}
