use std::time::Instant;

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Step is executing or executed successfully.
    Executed,
    /// Step exhausted its attempts.
    Failed,
    /// Step was compensated successfully.
    Compensated,
    /// Step compensation failed.
    CompensationFailed,
}

/// Record of a step's execution in the saga.
#[derive(Debug)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// How many times the forward action was invoked.
    pub attempts: u32,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step completed (execution or compensation).
    pub completed_at: Option<Instant>,
    /// Description of compensation (if applicable).
    pub compensation_description: Option<String>,
}

/// Audit log tracking all step executions in a saga.
///
/// Records are kept in execution order, so a record's position equals the
/// index of its step.
#[derive(Debug, Default)]
pub struct SagaAuditLog {
    records: Vec<StepRecord>,
}

impl SagaAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Executed,
            attempts: 0,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
    }

    pub(crate) fn record_failure(&mut self, attempts: u32) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.attempts = attempts;
            record.completed_at = Some(Instant::now());
        }
    }

    pub(crate) fn record_success(
        &mut self,
        attempts: u32,
        compensation_description: Option<String>,
    ) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.attempts = attempts;
            record.completed_at = Some(Instant::now());
            record.compensation_description = compensation_description;
        }
    }

    pub(crate) fn record_compensated(&mut self, step_index: usize) {
        self.mark(step_index, StepStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, step_index: usize) {
        self.mark(step_index, StepStatus::CompensationFailed);
    }

    fn mark(&mut self, step_index: usize, status: StepStatus) {
        if let Some(record) = self.records.get_mut(step_index) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the audit log.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Get a summary of the saga execution for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Compensated => "↩",
                StepStatus::CompensationFailed => "⚠",
            };
            if record.attempts > 1 {
                lines.push(format!(
                    "{status} {} ({} attempts)",
                    record.name, record.attempts
                ));
            } else {
                lines.push(format!("{status} {}", record.name));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_audit_log_is_empty() {
        let log = SagaAuditLog::new();
        assert!(log.records().is_empty());
    }

    #[test]
    fn record_start_adds_step_with_executed_status() {
        let mut log = SagaAuditLog::new();
        log.record_start("persist-node");

        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].name, "persist-node");
        assert_eq!(log.records()[0].status, StepStatus::Executed);
        assert_eq!(log.records()[0].attempts, 0);
        assert!(log.records()[0].completed_at.is_none());
    }

    #[test]
    fn record_failure_updates_last_step() {
        let mut log = SagaAuditLog::new();
        log.record_start("publish-event");
        log.record_failure(3);

        assert_eq!(log.records()[0].status, StepStatus::Failed);
        assert_eq!(log.records()[0].attempts, 3);
        assert!(log.records()[0].completed_at.is_some());
    }

    #[test]
    fn record_success_updates_last_step_with_description() {
        let mut log = SagaAuditLog::new();
        log.record_start("persist-node");
        log.record_success(1, Some("delete-node".to_string()));

        assert_eq!(log.records()[0].status, StepStatus::Executed);
        assert!(log.records()[0].completed_at.is_some());
        assert_eq!(
            log.records()[0].compensation_description,
            Some("delete-node".to_string())
        );
    }

    #[test]
    fn compensation_marks_step_by_index() {
        let mut log = SagaAuditLog::new();
        log.record_start("write");
        log.record_success(1, Some("undo".to_string()));
        log.record_start("write");
        log.record_success(1, Some("undo".to_string()));
        log.record_compensated(1);
        log.record_compensation_failed(0);

        assert_eq!(log.records()[0].status, StepStatus::CompensationFailed);
        assert_eq!(log.records()[1].status, StepStatus::Compensated);
    }

    #[test]
    fn summary_formats_all_steps() {
        let mut log = SagaAuditLog::new();
        log.record_start("persist-node");
        log.record_success(1, Some("undo".to_string()));
        log.record_compensated(0);
        log.record_start("index-keywords");
        log.record_success(3, Some("undo".to_string()));
        log.record_compensation_failed(1);
        log.record_start("publish-event");
        log.record_failure(1);

        assert_eq!(
            log.summary(),
            "↩ persist-node\n⚠ index-keywords (3 attempts)\n✗ publish-event"
        );
    }
}
