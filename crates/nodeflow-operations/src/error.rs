use nodeflow_saga::SagaError;
use thiserror::Error;

/// Details about a failed compensation during saga rollback.
#[derive(Debug)]
pub struct CompensationFailure {
    /// Name of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The error that occurred during compensation.
    pub error: Box<OperationError>,
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("node '{0}' already exists")]
    NodeAlreadyExists(String),

    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("failed to encode event for node '{node_id}'")]
    EventEncode {
        node_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("saga '{saga}' failed at step '{step}' after {attempts} attempt(s)")]
    SagaFailed {
        saga: String,
        step: String,
        attempts: u32,
        #[source]
        source: Box<OperationError>,
    },

    #[error(
        "saga '{saga}' failed at step '{step}' after {attempts} attempt(s) and {} compensation(s) also failed",
        compensation_failures.len()
    )]
    SagaCompensationFailed {
        saga: String,
        step: String,
        attempts: u32,
        source: Box<OperationError>,
        compensation_failures: Vec<CompensationFailure>,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;

impl From<SagaError<OperationError>> for OperationError {
    fn from(err: SagaError<OperationError>) -> Self {
        match err {
            SagaError::CompensationFailed {
                saga,
                source,
                compensation_errors,
            } => {
                let compensation_failures = compensation_errors
                    .into_iter()
                    .map(|e| CompensationFailure {
                        step: e.step,
                        description: e.description,
                        error: Box::new(e.error),
                    })
                    .collect();
                Self::SagaCompensationFailed {
                    saga,
                    step: source.step,
                    attempts: source.attempts,
                    source: Box::new(source.source),
                    compensation_failures,
                }
            }
            other => {
                let saga = other.saga().to_string();
                let step_error = other.into_step_error();
                Self::SagaFailed {
                    saga,
                    step: step_error.step,
                    attempts: step_error.attempts,
                    source: Box::new(step_error.source),
                }
            }
        }
    }
}

impl OperationError {
    /// Compensation failures attached to a failed saga, if any.
    #[must_use]
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        match self {
            Self::SagaCompensationFailed {
                compensation_failures,
                ..
            } => compensation_failures,
            _ => &[],
        }
    }
}
