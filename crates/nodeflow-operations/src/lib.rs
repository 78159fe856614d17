mod error;
pub mod operations;
pub mod providers;
pub mod traits;
pub mod types;

pub use error::{CompensationFailure, OperationError, Result};
