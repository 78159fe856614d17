use std::fmt::{self, Debug};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, error, info, info_span};

use crate::audit::SagaAuditLog;
use crate::compensation::{CompensationEntry, run_compensations};
use crate::error::SagaError;
use crate::retry::{Sleeper, execute_with_retry};
use crate::state::SagaState;
use crate::step::Step;

/// A compiled saga ready for execution.
///
/// Sagas execute a sequence of steps, where each step's output becomes the
/// next step's input. If a step exhausts its attempts, previously completed
/// steps are compensated in reverse order (LIFO).
///
/// A saga is meant to be executed once. [`Saga::execute`] takes `&mut self`,
/// so its state can only be inspected before or after a run, never during.
pub struct Saga<D, Ctx, E> {
    id: String,
    name: String,
    steps: Vec<Step<D, Ctx, E>>,
    state: SagaState,
    current_step_index: usize,
    compensations: Vec<CompensationEntry<D>>,
    metadata: IndexMap<String, Value>,
    sleeper: Sleeper,
}

impl<D, Ctx, E> Saga<D, Ctx, E> {
    pub(crate) fn from_parts(
        name: String,
        steps: Vec<Step<D, Ctx, E>>,
        metadata: IndexMap<String, Value>,
        sleeper: Sleeper,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            name,
            steps,
            state: SagaState::Pending,
            current_step_index: 0,
            compensations: Vec::new(),
            metadata,
            sleeper,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Index of the next step to run; equals the number of steps that
    /// completed successfully.
    #[must_use]
    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    #[must_use]
    pub fn steps(&self) -> &[Step<D, Ctx, E>] {
        &self.steps
    }

    #[must_use]
    pub fn metadata(&self) -> &IndexMap<String, Value> {
        &self.metadata
    }

    /// Number of compensations queued and not yet run.
    #[must_use]
    pub fn pending_compensations(&self) -> usize {
        self.compensations.len()
    }

    fn transition(&mut self, next: SagaState) {
        debug!(from = %self.state, to = %next, "saga state transition");
        self.state = next;
    }
}

impl<D, Ctx, E> Saga<D, Ctx, E>
where
    D: Clone,
    E: Debug,
{
    /// Execute the saga, returning the final payload on success.
    ///
    /// On failure, compensates all previously completed steps in reverse order.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::StepFailed` if a step fails and all compensations succeed.
    /// Returns `SagaError::CompensationFailed` if a step fails and some compensations also fail.
    pub fn execute(&mut self, ctx: &Ctx, payload: D) -> Result<D, SagaError<E>> {
        let (result, _audit_log) = self.execute_internal(ctx, payload);
        result
    }

    /// Execute the saga and return both the result and an audit log.
    ///
    /// The audit log tracks all step executions and compensations.
    pub fn execute_with_audit(
        &mut self,
        ctx: &Ctx,
        payload: D,
    ) -> (Result<D, SagaError<E>>, SagaAuditLog) {
        self.execute_internal(ctx, payload)
    }

    fn execute_internal(
        &mut self,
        ctx: &Ctx,
        payload: D,
    ) -> (Result<D, SagaError<E>>, SagaAuditLog) {
        let span = info_span!("saga", saga_id = %self.id, saga_name = %self.name);
        let _guard = span.enter();

        let mut audit_log = SagaAuditLog::new();
        let mut data = payload;
        let mut completed_steps = 0;

        self.compensations.clear();
        self.current_step_index = 0;
        self.transition(SagaState::Running);
        info!(steps = self.steps.len(), "saga started");

        for index in 0..self.steps.len() {
            let step = &self.steps[index];
            audit_log.record_start(step.name());

            match execute_with_retry(step, ctx, &data, &self.sleeper) {
                Ok((output, attempts)) => {
                    audit_log.record_success(
                        attempts,
                        step.is_compensable().then(|| step.compensation_description()),
                    );
                    data = output;
                    if step.is_compensable() {
                        self.compensations.push(CompensationEntry {
                            step_index: index,
                            data: data.clone(),
                        });
                    }
                    completed_steps = index + 1;
                    self.current_step_index = completed_steps;
                }
                Err(step_error) => {
                    audit_log.record_failure(step_error.attempts);
                    self.transition(SagaState::Failed);

                    self.transition(SagaState::Compensating);
                    let entries = std::mem::take(&mut self.compensations);
                    let compensation_errors = run_compensations(
                        &self.steps,
                        entries,
                        completed_steps,
                        ctx,
                        &mut audit_log,
                    );
                    self.transition(SagaState::Compensated);

                    let saga = self.name.clone();
                    let saga_error = if compensation_errors.is_empty() {
                        SagaError::StepFailed {
                            saga,
                            source: step_error,
                        }
                    } else {
                        SagaError::CompensationFailed {
                            saga,
                            source: step_error,
                            compensation_errors,
                        }
                    };
                    error!(error = %saga_error, "saga failed");
                    return (Err(saga_error), audit_log);
                }
            }
        }

        self.transition(SagaState::Completed);
        info!("saga completed");
        (Ok(data), audit_log)
    }
}

impl<D, Ctx, E> Debug for Saga<D, Ctx, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Saga")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("state", &self.state)
            .field("current_step_index", &self.current_step_index)
            .field("pending_compensations", &self.compensations.len())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::audit::StepStatus;
    use crate::builder::SagaBuilder;
    use crate::retry::RetryPolicy;

    struct TestContext {
        compensation_log: RefCell<Vec<String>>,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                compensation_log: RefCell::new(Vec::new()),
            }
        }
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("{0}")]
    struct TestError(String);

    type TestBuilder = SagaBuilder<i32, TestContext, TestError>;

    fn no_wait() -> impl Fn(Duration) + Send + Sync + 'static {
        |_: Duration| {}
    }

    fn add(name: &'static str, value: i32) -> Step<i32, TestContext, TestError> {
        Step::new(name, move |_, input| Ok(input + value)).with_compensation(
            move |ctx: &TestContext, output| {
                ctx.compensation_log
                    .borrow_mut()
                    .push(format!("compensate {name} with {output}"));
                Ok(())
            },
        )
    }

    fn failing(name: &'static str) -> Step<i32, TestContext, TestError> {
        Step::new(name, |_, _| Err(TestError("boom".to_string())))
    }

    #[test]
    fn multi_step_saga_flows_data_through_steps() -> anyhow::Result<()> {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("arithmetic")
            .add_step(add("add_10", 10))
            .step("multiply", |_, input| Ok(input * 3))
            .add_step(add("add_5", 5))
            .build();

        let result = saga.execute(&ctx, 5)?;

        assert_eq!(result, 50);
        assert_eq!(saga.state(), SagaState::Completed);
        assert_eq!(saga.current_step_index(), 3);
        Ok(())
    }

    #[test]
    fn compensation_happens_in_lifo_order_with_step_outputs() {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("arithmetic")
            .add_step(add("add_10", 10))
            .add_step(add("add_20", 20))
            .add_step(failing("failing"))
            .build();

        let result = saga.execute(&ctx, 5);

        assert!(result.is_err());
        assert_eq!(saga.state(), SagaState::Compensated);
        assert_eq!(saga.current_step_index(), 2);
        assert_eq!(
            *ctx.compensation_log.borrow(),
            vec!["compensate add_20 with 35", "compensate add_10 with 15"]
        );
    }

    #[test]
    fn steps_without_compensation_are_skipped_during_rollback() {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("read_then_fail")
            .step("read_only", |_, input| Ok(input))
            .add_step(failing("failing"))
            .build();

        let result = saga.execute(&ctx, 42);

        assert!(result.is_err());
        assert!(ctx.compensation_log.borrow().is_empty());
        assert_eq!(saga.pending_compensations(), 0);
    }

    #[test]
    fn first_step_failure_requires_no_compensation() {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("immediate").add_step(failing("failing")).build();

        let err = saga.execute(&ctx, 42).expect_err("should be an error");

        assert!(matches!(&err, SagaError::StepFailed { saga, .. } if saga == "immediate"));
        assert_eq!(err.failed_step(), "failing");
        assert_eq!(saga.state(), SagaState::Compensated);
        assert!(ctx.compensation_log.borrow().is_empty());
    }

    #[test]
    fn empty_saga_completes_with_payload_unchanged() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let mut saga = TestBuilder::new("empty").build();

        assert_eq!(saga.state(), SagaState::Pending);
        assert_eq!(saga.execute(&ctx, 7)?, 7);
        assert_eq!(saga.state(), SagaState::Completed);
        Ok(())
    }

    #[test]
    fn compensation_failure_returns_compensation_failed_error() {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("partial_rollback")
            .add_step(add("add_10", 10))
            .compensable_step(
                "will_fail_comp",
                |_, input| Ok(input),
                |_, _| Err(TestError("cannot undo".to_string())),
            )
            .add_step(failing("failing"))
            .build();

        let err = saga.execute(&ctx, 5).expect_err("should be an error");

        match &err {
            SagaError::CompensationFailed {
                source,
                compensation_errors,
                ..
            } => {
                assert_eq!(source.step, "failing");
                assert_eq!(compensation_errors.len(), 1);
                assert_eq!(compensation_errors[0].step, "will_fail_comp");
            }
            SagaError::StepFailed { .. } => panic!("expected CompensationFailed error"),
        }
        assert_eq!(saga.state(), SagaState::Compensated);
        assert_eq!(
            *ctx.compensation_log.borrow(),
            vec!["compensate add_10 with 15"]
        );
    }

    #[test]
    fn execute_with_audit_returns_audit_log() -> anyhow::Result<()> {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("audited")
            .add_step(add("add_10", 10))
            .step("double", |_, input| Ok(input * 2))
            .build();

        let (result, audit_log) = saga.execute_with_audit(&ctx, 5);

        assert_eq!(result?, 30);
        let records = audit_log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "add_10");
        assert_eq!(records[0].status, StepStatus::Executed);
        assert_eq!(records[1].name, "double");
        assert_eq!(records[1].status, StepStatus::Executed);
        Ok(())
    }

    #[test]
    fn audit_log_describes_compensation_only_for_compensable_steps() -> anyhow::Result<()> {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("audited")
            .add_step(add("add_10", 10).with_compensation_description("subtract 10"))
            .step("plain", |_, input| Ok(input))
            .build();

        let (result, audit_log) = saga.execute_with_audit(&ctx, 1);

        result?;
        let records = audit_log.records();
        assert_eq!(
            records[0].compensation_description.as_deref(),
            Some("subtract 10")
        );
        assert_eq!(records[1].compensation_description, None);
        Ok(())
    }

    #[test]
    fn audit_log_tracks_retries_and_compensation_status() {
        let ctx = TestContext::new();

        let mut saga = TestBuilder::new("audited")
            .add_step(add("add_10", 10))
            .compensable_step(
                "will_fail_comp",
                |_, input| Ok(input),
                |_, _| Err(TestError("cannot undo".to_string())),
            )
            .retryable_step(
                "failing",
                |_, _| Err(TestError("boom".to_string())),
                RetryPolicy::new(2, Duration::ZERO),
            )
            .sleeper(no_wait())
            .build();

        let (result, audit_log) = saga.execute_with_audit(&ctx, 5);

        assert!(result.is_err());
        let records = audit_log.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, StepStatus::Compensated);
        assert_eq!(records[1].status, StepStatus::CompensationFailed);
        assert_eq!(records[2].status, StepStatus::Failed);
        assert_eq!(records[2].attempts, 2);
    }

    #[test]
    fn context_is_shared_with_every_step() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let mut saga = TestBuilder::new("context")
            .step("first", move |ctx: &TestContext, input| {
                recorder
                    .lock()
                    .expect("lock")
                    .push(std::ptr::from_ref(ctx) as usize);
                Ok(input)
            })
            .build();

        saga.execute(&ctx, 1)?;

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![std::ptr::from_ref(&ctx) as usize]
        );
        Ok(())
    }

    #[test]
    fn each_saga_gets_a_distinct_id() {
        let a = TestBuilder::new("a").build();
        let b = TestBuilder::new("a").build();

        assert!(!a.id().is_empty());
        assert_ne!(a.id(), b.id());
    }
}
