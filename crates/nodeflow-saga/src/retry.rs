use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::StepExecutionError;
use crate::step::Step;

/// Delay between attempts when a policy does not set one.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Blocking wait used between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

pub(crate) fn thread_sleeper() -> Sleeper {
    Arc::new(std::thread::sleep)
}

/// How often a step's forward action is attempted.
///
/// `max_attempts` is a *total* attempt count: the first try counts toward
/// the limit. Zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Option<Duration>,
}

impl RetryPolicy {
    /// A single attempt, no retry.
    #[must_use]
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: None,
        }
    }

    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: Some(delay),
        }
    }

    /// Retry up to `max_attempts` in total, waiting [`DEFAULT_RETRY_DELAY`].
    #[must_use]
    pub const fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: None,
        }
    }

    #[must_use]
    pub fn max_attempts(self) -> u32 {
        self.max_attempts.max(1)
    }

    #[must_use]
    pub fn delay(self) -> Duration {
        self.delay.unwrap_or(DEFAULT_RETRY_DELAY)
    }
}

/// Run a step's forward action until it succeeds or the policy is exhausted.
///
/// Returns the output and the number of attempts used.
pub(crate) fn execute_with_retry<D, Ctx, E>(
    step: &Step<D, Ctx, E>,
    ctx: &Ctx,
    data: &D,
    sleeper: &Sleeper,
) -> Result<(D, u32), StepExecutionError<E>>
where
    D: Clone,
    E: Debug,
{
    let policy = step.retry_policy();
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        debug!(step = step.name(), attempt, max_attempts, "executing step");

        match step.execute(ctx, data.clone()) {
            Ok(output) => return Ok((output, attempt)),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay();
                warn!(
                    step = step.name(),
                    attempt,
                    max_attempts,
                    error = ?err,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "step attempt failed, retrying"
                );
                sleeper(delay);
                attempt += 1;
            }
            Err(err) => {
                error!(
                    step = step.name(),
                    attempt,
                    max_attempts,
                    error = ?err,
                    "step failed"
                );
                return Err(StepExecutionError {
                    step: step.name().to_string(),
                    attempts: attempt,
                    source: err,
                });
            }
        }
    }
}
