use std::fmt;

/// Lifecycle state of a saga.
///
/// A saga moves forward only:
/// `Pending -> Running -> Completed`, or
/// `Pending -> Running -> Failed -> Compensating -> Compensated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SagaState {
    /// Built but not yet executed.
    #[default]
    Pending,
    /// Forward steps are executing.
    Running,
    /// Every step succeeded.
    Completed,
    /// A step exhausted its attempts.
    Failed,
    /// The compensation pass is running.
    Compensating,
    /// The compensation pass has finished, whatever its outcome.
    Compensated,
}

impl SagaState {
    /// Whether the saga has reached a state it will never leave.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Compensated)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Compensating => "compensating",
            Self::Compensated => "compensated",
        }
    }
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
