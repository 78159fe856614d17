use nodeflow_saga::{SagaAuditLog, SagaState};

use crate::Result;

/// Everything a workflow run produced: its result plus how the saga got there.
#[derive(Debug)]
pub struct WorkflowRun<T> {
    pub saga_id: String,
    pub state: SagaState,
    pub audit_log: SagaAuditLog,
    pub result: Result<T>,
}

impl<T> WorkflowRun<T> {
    /// Discards the execution details.
    ///
    /// # Errors
    ///
    /// Returns the workflow's error if the run failed.
    pub fn into_result(self) -> Result<T> {
        self.result
    }
}
