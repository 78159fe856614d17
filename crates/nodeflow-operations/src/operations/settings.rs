use nodeflow_saga::RetryPolicy;

/// Retry policies for the steps that talk to flaky backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// `index-keywords` in the create-node workflow.
    pub index_keywords: RetryPolicy,
    /// `remove-keywords` in the delete-node workflow.
    pub remove_keywords: RetryPolicy,
    /// `publish-event` in both workflows.
    pub publish_event: RetryPolicy,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            index_keywords: RetryPolicy::attempts(3),
            remove_keywords: RetryPolicy::attempts(3),
            publish_event: RetryPolicy::once(),
        }
    }
}
