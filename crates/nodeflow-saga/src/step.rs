use std::fmt;

use crate::retry::RetryPolicy;

type ExecuteFn<D, Ctx, E> = dyn Fn(&Ctx, D) -> Result<D, E> + Send + Sync;
type CompensateFn<D, Ctx, E> = dyn Fn(&Ctx, D) -> Result<(), E> + Send + Sync;

/// A single unit of work in a saga.
///
/// A step transforms the saga's payload and may define a compensation that
/// undoes its effects if a later step fails. The compensation receives the
/// output this step produced, not the input it was given.
///
/// # Type Parameters
///
/// - `D`: Payload threaded from step to step
/// - `Ctx`: Shared dependencies (injected, not passed between steps)
/// - `E`: The error type for step and compensation failures
pub struct Step<D, Ctx, E> {
    name: String,
    execute: Box<ExecuteFn<D, Ctx, E>>,
    compensate: Option<Box<CompensateFn<D, Ctx, E>>>,
    compensation_description: Option<String>,
    retry: RetryPolicy,
}

impl<D, Ctx, E> Step<D, Ctx, E> {
    /// Create a step with a single attempt and no compensation.
    pub fn new<F>(name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(&Ctx, D) -> Result<D, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            execute: Box::new(execute),
            compensate: None,
            compensation_description: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Attach a compensating action.
    #[must_use]
    pub fn with_compensation<F>(mut self, compensate: F) -> Self
    where
        F: Fn(&Ctx, D) -> Result<(), E> + Send + Sync + 'static,
    {
        self.compensate = Some(Box::new(compensate));
        self
    }

    /// Describe what the compensation does, for audit logs and errors.
    #[must_use]
    pub fn with_compensation_description(mut self, description: impl Into<String>) -> Self {
        self.compensation_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    #[must_use]
    pub fn is_compensable(&self) -> bool {
        self.compensate.is_some()
    }

    /// Human-readable description of what compensation will do.
    #[must_use]
    pub fn compensation_description(&self) -> String {
        self.compensation_description
            .clone()
            .unwrap_or_else(|| format!("undo {}", self.name))
    }

    pub(crate) fn execute(&self, ctx: &Ctx, data: D) -> Result<D, E> {
        (self.execute)(ctx, data)
    }

    /// Returns `None` when the step has nothing to undo.
    pub(crate) fn compensate(&self, ctx: &Ctx, data: D) -> Option<Result<(), E>> {
        self.compensate.as_ref().map(|f| f(ctx, data))
    }
}

impl<D, Ctx, E> fmt::Debug for Step<D, Ctx, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("compensable", &self.is_compensable())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
