use std::fmt::Debug;

use tracing::{debug, info, warn};

use crate::audit::SagaAuditLog;
use crate::error::CompensationError;
use crate::step::Step;

/// A compensation queued after a step succeeded, bound to that step's output.
#[derive(Debug)]
pub(crate) struct CompensationEntry<D> {
    pub(crate) step_index: usize,
    pub(crate) data: D,
}

/// Undo completed steps, most recent first.
///
/// Only entries belonging to the first `completed_steps` steps are run. A
/// failing compensation is recorded and the pass continues; nothing is
/// retried.
pub(crate) fn run_compensations<D, Ctx, E>(
    steps: &[Step<D, Ctx, E>],
    entries: Vec<CompensationEntry<D>>,
    completed_steps: usize,
    ctx: &Ctx,
    audit_log: &mut SagaAuditLog,
) -> Vec<CompensationError<E>>
where
    E: Debug,
{
    let mut compensation_errors = Vec::new();

    info!(
        completed_steps,
        compensations = entries.len(),
        "compensating completed steps"
    );

    for entry in entries
        .into_iter()
        .rev()
        .filter(|entry| entry.step_index < completed_steps)
    {
        let step = &steps[entry.step_index];
        let description = step.compensation_description();
        debug!(step = step.name(), compensation = %description, "running compensation");

        match step.compensate(ctx, entry.data) {
            None | Some(Ok(())) => {
                audit_log.record_compensated(entry.step_index);
            }
            Some(Err(error)) => {
                warn!(
                    step = step.name(),
                    compensation = %description,
                    error = ?error,
                    "compensation failed, continuing rollback"
                );
                audit_log.record_compensation_failed(entry.step_index);
                compensation_errors.push(CompensationError {
                    step: step.name().to_string(),
                    description,
                    error,
                });
            }
        }
    }

    compensation_errors
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestError(String);

    struct TestContext {
        log: RefCell<Vec<String>>,
    }

    fn recording(name: &'static str) -> Step<i32, TestContext, TestError> {
        Step::new(name, |_, n| Ok(n)).with_compensation(move |ctx: &TestContext, n| {
            ctx.log.borrow_mut().push(format!("{name}:{n}"));
            Ok(())
        })
    }

    fn failing(name: &'static str) -> Step<i32, TestContext, TestError> {
        Step::new(name, |_, n| Ok(n)).with_compensation(move |ctx: &TestContext, n| {
            ctx.log.borrow_mut().push(format!("{name}:{n}"));
            Err(TestError(format!("{name} refused")))
        })
    }

    fn audit_for(steps: &[Step<i32, TestContext, TestError>]) -> SagaAuditLog {
        let mut log = SagaAuditLog::new();
        for step in steps {
            log.record_start(step.name());
            log.record_success(1, Some(step.compensation_description()));
        }
        log
    }

    #[test]
    fn runs_entries_in_reverse_order_with_bound_data() {
        let ctx = TestContext {
            log: RefCell::new(Vec::new()),
        };
        let steps = vec![recording("a"), recording("b"), recording("c")];
        let entries = vec![
            CompensationEntry {
                step_index: 0,
                data: 10,
            },
            CompensationEntry {
                step_index: 1,
                data: 20,
            },
            CompensationEntry {
                step_index: 2,
                data: 30,
            },
        ];
        let mut audit = audit_for(&steps);

        let errors = run_compensations(&steps, entries, 3, &ctx, &mut audit);

        assert!(errors.is_empty());
        assert_eq!(*ctx.log.borrow(), vec!["c:30", "b:20", "a:10"]);
    }

    #[test]
    fn failure_does_not_stop_earlier_compensations() {
        let ctx = TestContext {
            log: RefCell::new(Vec::new()),
        };
        let steps = vec![recording("a"), failing("b")];
        let entries = vec![
            CompensationEntry {
                step_index: 0,
                data: 1,
            },
            CompensationEntry {
                step_index: 1,
                data: 2,
            },
        ];
        let mut audit = audit_for(&steps);

        let errors = run_compensations(&steps, entries, 2, &ctx, &mut audit);

        assert_eq!(*ctx.log.borrow(), vec!["b:2", "a:1"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].step, "b");
        assert_eq!(errors[0].error, TestError("b refused".to_string()));
    }

    #[test]
    fn entries_beyond_completed_steps_are_skipped() {
        let ctx = TestContext {
            log: RefCell::new(Vec::new()),
        };
        let steps = vec![recording("a"), recording("b")];
        let entries = vec![
            CompensationEntry {
                step_index: 0,
                data: 1,
            },
            CompensationEntry {
                step_index: 1,
                data: 2,
            },
        ];
        let mut audit = audit_for(&steps);

        run_compensations(&steps, entries, 1, &ctx, &mut audit);

        assert_eq!(*ctx.log.borrow(), vec!["a:1"]);
    }
}
