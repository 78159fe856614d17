//! Saga engine for multi-resource operations.
//!
//! A saga runs a linear sequence of steps as one logical unit of work. Each
//! step's output becomes the next step's input. Steps may be retried
//! according to their [`RetryPolicy`], and when a step finally fails, every
//! previously completed step that defines a compensation is undone in reverse
//! order. Compensation is best-effort: a failing compensation is logged and
//! reported, but never stops the remaining ones.
//!
//! ```
//! use nodeflow_saga::{RetryPolicy, SagaBuilder, SagaState};
//! use std::time::Duration;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct Error(String);
//!
//! let mut saga = SagaBuilder::<i32, (), Error>::new("Arithmetic")
//!     .compensable_step("add", |_, n| Ok(n + 1), |_, _| Ok(()))
//!     .retryable_step("double", |_, n| Ok(n * 2), RetryPolicy::new(3, Duration::ZERO))
//!     .build();
//!
//! assert_eq!(saga.execute(&(), 20).ok(), Some(42));
//! assert_eq!(saga.state(), SagaState::Completed);
//! ```

mod audit;
mod builder;
mod compensation;
mod error;
mod retry;
mod saga;
mod state;
mod step;

pub use audit::{SagaAuditLog, StepRecord, StepStatus};
pub use builder::SagaBuilder;
pub use error::{CompensationError, SagaError, StepExecutionError};
pub use retry::{DEFAULT_RETRY_DELAY, RetryPolicy, Sleeper};
pub use saga::Saga;
pub use state::SagaState;
pub use step::Step;
