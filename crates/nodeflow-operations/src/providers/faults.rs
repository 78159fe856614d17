use std::sync::atomic::{AtomicU32, Ordering};

use crate::OperationError;

/// Failure injection for the in-memory providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    #[default]
    Healthy,
    /// The first `n` calls fail, later calls succeed.
    FailFirst(u32),
    /// The first `n` calls succeed, every later call fails.
    FailAfter(u32),
    AlwaysFail,
}

/// Counts calls to a provider and decides which of them fail.
#[derive(Debug, Default)]
pub(crate) struct Faults {
    mode: FaultMode,
    calls: AtomicU32,
}

impl Faults {
    pub(crate) fn new(mode: FaultMode) -> Self {
        Self {
            mode,
            calls: AtomicU32::new(0),
        }
    }

    /// Registers a call and fails it if the fault mode says so.
    pub(crate) fn check(&self, provider: &'static str) -> Result<(), OperationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fails = match self.mode {
            FaultMode::Healthy => false,
            FaultMode::FailFirst(n) => call <= n,
            FaultMode::FailAfter(n) => call > n,
            FaultMode::AlwaysFail => true,
        };
        if fails {
            return Err(OperationError::ProviderUnavailable {
                provider,
                reason: format!("injected failure on call {call}"),
            });
        }
        Ok(())
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_never_fails() {
        let faults = Faults::new(FaultMode::Healthy);
        assert!((0..5).all(|_| faults.check("test").is_ok()));
        assert_eq!(faults.calls(), 5);
    }

    #[test]
    fn fail_first_recovers_after_n_calls() {
        let faults = Faults::new(FaultMode::FailFirst(2));
        let outcomes: Vec<_> = (0..4).map(|_| faults.check("test").is_ok()).collect();
        assert_eq!(outcomes, vec![false, false, true, true]);
    }

    #[test]
    fn fail_after_breaks_once_n_calls_succeeded() {
        let faults = Faults::new(FaultMode::FailAfter(1));
        let outcomes: Vec<_> = (0..3).map(|_| faults.check("test").is_ok()).collect();
        assert_eq!(outcomes, vec![true, false, false]);
    }

    #[test]
    fn always_fail_names_provider() {
        let faults = Faults::new(FaultMode::AlwaysFail);
        let err = faults.check("keyword index").expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "keyword index unavailable: injected failure on call 1"
        );
    }
}
