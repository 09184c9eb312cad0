//! Callbacks a validator reports to.

use crate::core::error::ConfigError;
use crate::core::field::FieldRef;
use crate::core::report::ValidationError;
use log::error;

/// Receives the outcome of synchronous validation.
pub trait ValidationListener: Send + Sync {
    /// No field failed anywhere, including past the boundary.
    fn on_validation_succeeded(&self);

    /// Failures up to the boundary, in evaluation order. The slice is empty
    /// when every failure lies past the boundary.
    fn on_validation_failed(&self, errors: &[ValidationError]);
}

/// Receives the lifecycle of an asynchronous run.
///
/// `pre_validation` fires on the calling thread. `on_cancelled` fires on the
/// thread that cancelled the run. The remaining callbacks go through the
/// validator's [`CallbackDispatcher`](crate::execution::CallbackDispatcher).
/// Exactly one of `on_cancelled`, `on_success`, `on_failure` or `on_error`
/// fires per run.
pub trait AsyncValidationListener: Send + Sync {
    fn pre_validation(&self) {}

    fn on_success(&self);

    fn on_failure(&self, errors: &[ValidationError]);

    fn on_cancelled(&self) {}

    /// A configuration error stopped the run.
    fn on_error(&self, err: &ConfigError) {
        error!("Asynchronous validation failed: {}", err);
    }
}

/// Called for each evaluated field whose rules all passed.
///
/// Fires after the pass, just before the outcome callback and on the same
/// thread: the caller for synchronous validation, the
/// [`CallbackDispatcher`](crate::execution::CallbackDispatcher) for
/// asynchronous runs. Fields after the first failure past a partial
/// validation boundary are not reported.
pub trait FieldValidatedAction: Send + Sync {
    fn on_all_rules_passed(&self, field: &FieldRef);
}

impl<F> FieldValidatedAction for F
where
    F: Fn(&FieldRef) + Send + Sync,
{
    fn on_all_rules_passed(&self, field: &FieldRef) {
        self(field)
    }
}
