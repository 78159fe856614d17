use std::fmt::Debug;

use thiserror::Error;

/// A step exhausted every attempt its retry policy allowed.
#[derive(Debug, Error)]
#[error("step '{step}' failed after {attempts} attempt(s)")]
pub struct StepExecutionError<E> {
    /// Name of the step that failed.
    pub step: String,
    /// How many times the forward action was invoked.
    pub attempts: u32,
    /// The error returned by the final attempt.
    #[source]
    pub source: E,
}

/// Error from a failed compensation operation.
#[derive(Debug, Error)]
#[error("compensation failed for step '{step}': {description}")]
pub struct CompensationError<E> {
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: E,
}

/// Error from saga execution.
///
/// The failing step's error is always the [`source`](std::error::Error::source)
/// of this error. Compensation failures are carried alongside it and never
/// replace it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SagaError<E: Debug> {
    /// A step failed and every compensation succeeded (or none were needed).
    #[error("saga '{saga}' failed at step '{}'", source.step)]
    StepFailed {
        /// Name of the saga.
        saga: String,
        /// The step failure that aborted the saga.
        #[source]
        source: StepExecutionError<E>,
    },

    /// A step failed and some compensations also failed.
    #[error(
        "saga '{saga}' failed at step '{}', and {} compensation(s) also failed",
        source.step,
        compensation_errors.len()
    )]
    CompensationFailed {
        /// Name of the saga.
        saga: String,
        /// The step failure that aborted the saga.
        #[source]
        source: StepExecutionError<E>,
        /// Errors from failed compensations, in the order they were attempted.
        compensation_errors: Vec<CompensationError<E>>,
    },
}

impl<E: Debug> SagaError<E> {
    #[must_use]
    pub fn saga(&self) -> &str {
        match self {
            Self::StepFailed { saga, .. } | Self::CompensationFailed { saga, .. } => saga,
        }
    }

    #[must_use]
    pub fn failed_step(&self) -> &str {
        &self.step_error().step
    }

    #[must_use]
    pub fn step_error(&self) -> &StepExecutionError<E> {
        match self {
            Self::StepFailed { source, .. } | Self::CompensationFailed { source, .. } => source,
        }
    }

    /// Compensation failures; empty when the rollback fully succeeded.
    #[must_use]
    pub fn compensation_errors(&self) -> &[CompensationError<E>] {
        match self {
            Self::StepFailed { .. } => &[],
            Self::CompensationFailed {
                compensation_errors,
                ..
            } => compensation_errors,
        }
    }

    #[must_use]
    pub fn into_step_error(self) -> StepExecutionError<E> {
        match self {
            Self::StepFailed { source, .. } | Self::CompensationFailed { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct TestError(String);

    fn step_error() -> StepExecutionError<TestError> {
        StepExecutionError {
            step: "publish-event".to_string(),
            attempts: 2,
            source: TestError("broker unavailable".to_string()),
        }
    }

    #[test]
    fn step_error_names_step_and_attempts() {
        assert_eq!(
            step_error().to_string(),
            "step 'publish-event' failed after 2 attempt(s)"
        );
    }

    #[test]
    fn saga_error_names_saga_and_step() {
        let err = SagaError::StepFailed {
            saga: "CreateNodeWorkflow".to_string(),
            source: step_error(),
        };

        assert_eq!(
            err.to_string(),
            "saga 'CreateNodeWorkflow' failed at step 'publish-event'"
        );
        assert_eq!(err.saga(), "CreateNodeWorkflow");
        assert_eq!(err.failed_step(), "publish-event");
        assert!(err.compensation_errors().is_empty());
    }

    #[test]
    fn compensation_failure_keeps_step_error_as_source() {
        let err = SagaError::CompensationFailed {
            saga: "CreateNodeWorkflow".to_string(),
            source: step_error(),
            compensation_errors: vec![CompensationError {
                step: "persist-node".to_string(),
                description: "delete the node".to_string(),
                error: TestError("storage down".to_string()),
            }],
        };

        assert_eq!(
            err.to_string(),
            "saga 'CreateNodeWorkflow' failed at step 'publish-event', and 1 compensation(s) also failed"
        );

        let source = err.source().expect("has source");
        assert_eq!(source.to_string(), "step 'publish-event' failed after 2 attempt(s)");
        let root = source.source().expect("has root cause");
        assert_eq!(root.to_string(), "broker unavailable");

        assert_eq!(
            err.compensation_errors()[0].to_string(),
            "compensation failed for step 'persist-node': delete the node"
        );
    }

    #[test]
    fn into_step_error_returns_primary_failure() {
        let err = SagaError::StepFailed {
            saga: "s".to_string(),
            source: step_error(),
        };
        assert_eq!(err.into_step_error().source.0, "broker unavailable");
    }
}
