use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;

use crate::retry::{RetryPolicy, Sleeper, thread_sleeper};
use crate::saga::Saga;
use crate::step::Step;

/// Fluent builder for [`Saga`].
///
/// Steps run in the order they are added. `build()` moves the accumulated
/// steps into the saga, so nothing added to a builder afterwards can reach an
/// already-built saga.
///
/// The builder performs no validation: a saga without steps is valid and
/// completes immediately, returning its payload unchanged.
pub struct SagaBuilder<D, Ctx, E> {
    name: String,
    steps: Vec<Step<D, Ctx, E>>,
    metadata: IndexMap<String, Value>,
    sleeper: Option<Sleeper>,
}

impl<D, Ctx, E> SagaBuilder<D, Ctx, E> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            metadata: IndexMap::new(),
            sleeper: None,
        }
    }

    /// Add a step with a single attempt and nothing to compensate.
    #[must_use]
    pub fn step<F>(self, name: impl Into<String>, execute: F) -> Self
    where
        F: Fn(&Ctx, D) -> Result<D, E> + Send + Sync + 'static,
    {
        self.add_step(Step::new(name, execute).with_retry(RetryPolicy::once()))
    }

    /// Add a step whose effects are undone by `compensate` if a later step fails.
    #[must_use]
    pub fn compensable_step<F, C>(self, name: impl Into<String>, execute: F, compensate: C) -> Self
    where
        F: Fn(&Ctx, D) -> Result<D, E> + Send + Sync + 'static,
        C: Fn(&Ctx, D) -> Result<(), E> + Send + Sync + 'static,
    {
        self.add_step(Step::new(name, execute).with_compensation(compensate))
    }

    /// Add a step whose forward action is retried according to `retry`.
    #[must_use]
    pub fn retryable_step<F>(self, name: impl Into<String>, execute: F, retry: RetryPolicy) -> Self
    where
        F: Fn(&Ctx, D) -> Result<D, E> + Send + Sync + 'static,
    {
        self.add_step(Step::new(name, execute).with_retry(retry))
    }

    /// Add a fully configured step.
    #[must_use]
    pub fn add_step(mut self, step: Step<D, Ctx, E>) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the blocking wait used between retry attempts.
    #[must_use]
    pub fn sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper = Some(std::sync::Arc::new(sleeper));
        self
    }

    #[must_use]
    pub fn build(self) -> Saga<D, Ctx, E> {
        Saga::from_parts(
            self.name,
            self.steps,
            self.metadata,
            self.sleeper.unwrap_or_else(thread_sleeper),
        )
    }
}
