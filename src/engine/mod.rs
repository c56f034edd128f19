//! Step sequencer for provisioning workflows
//!
//! Runs an ordered list of named steps, strictly sequentially, with no
//! backtracking. Each step is precondition-gated so converged hosts skip
//! it, retried per its policy, and may carry a fallback action tried once
//! the primary is out of attempts. The first failure of an abort-on-failure
//! step stops the run and surfaces the step name with its last captured
//! diagnostic.

use serde::Serialize;

use crate::exec::Runner;
use crate::report::Reporter;
use crate::retry::{ActionError, RetryPolicy, run_with_retry};
use crate::target::InstallationTarget;
use crate::target::distro::DistroFamily;

/// Everything a step's closures may consult
pub struct StepContext<'a> {
    pub target: &'a InstallationTarget,
    pub family: DistroFamily,
    pub runner: &'a Runner,
    pub reporter: &'a Reporter,
}

type Predicate = Box<dyn Fn(&StepContext) -> bool>;
type Action = Box<dyn Fn(&StepContext) -> Result<(), ActionError>>;

/// Whether a step failure stops the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    AbortOnFailure,
    WarnAndContinue,
}

/// Final state of one step in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Skipped,
    Succeeded,
    SucceededViaFallback,
    FailedRecoverable,
    FailedFatal,
}

/// One step's outcome, as recorded in the run report
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Terminal state of a whole run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunStatus {
    CompletedFully,
    Aborted { step: String, reason: String },
}

/// Ordered per-step records plus the run's terminal state
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub records: Vec<StepRecord>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        matches!(self.status, RunStatus::CompletedFully)
    }
}

/// A single named unit of provisioning work
///
/// Immutable once defined; a workflow is a `Vec<Step>` assembled from the
/// target descriptor.
pub struct Step {
    name: String,
    criticality: Criticality,
    retry: RetryPolicy,
    precondition: Predicate,
    action: Action,
    fallback: Option<Action>,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        action: impl Fn(&StepContext) -> Result<(), ActionError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            criticality: Criticality::AbortOnFailure,
            retry: RetryPolicy::once(),
            precondition: Box::new(|_| false),
            action: Box::new(action),
            fallback: None,
        }
    }

    /// Skip the step entirely when this holds; must confirm the full
    /// desired end-state, not partial evidence
    pub fn precondition(mut self, check: impl Fn(&StepContext) -> bool + 'static) -> Self {
        self.precondition = Box::new(check);
        self
    }

    /// Alternate action tried once the primary is out of attempts
    pub fn fallback(
        mut self,
        action: impl Fn(&StepContext) -> Result<(), ActionError> + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(action));
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// A failure logs a warning and the run moves on
    pub fn warn_and_continue(mut self) -> Self {
        self.criticality = Criticality::WarnAndContinue;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn criticality(&self) -> Criticality {
        self.criticality
    }
}

/// A step's precondition verdict, for `check` and dry runs
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub step: String,
    pub satisfied: bool,
}

/// Evaluate every precondition without acting
pub fn plan(steps: &[Step], ctx: &StepContext) -> Vec<PlanEntry> {
    steps
        .iter()
        .map(|step| PlanEntry {
            step: step.name.clone(),
            satisfied: (step.precondition)(ctx),
        })
        .collect()
}

/// Run the workflow to its terminal state
pub fn run(steps: &[Step], ctx: &StepContext) -> RunReport {
    let mut records = Vec::with_capacity(steps.len());

    for step in steps {
        if (step.precondition)(ctx) {
            ctx.reporter
                .info(format!("step '{}': already satisfied, skipping", step.name));
            records.push(StepRecord {
                step: step.name.clone(),
                status: StepStatus::Skipped,
                diagnostic: None,
                exit_code: None,
            });
            continue;
        }

        ctx.reporter.info(format!("step '{}': starting", step.name));
        let label = format!("step '{}'", step.name);
        let primary = run_with_retry(&step.retry, ctx.reporter, &label, || (step.action)(ctx));

        let resolved = match primary {
            Ok(()) => Ok(StepStatus::Succeeded),
            Err(primary_err) => match &step.fallback {
                Some(fallback) => {
                    ctx.reporter.warning(format!(
                        "step '{}': primary action failed, trying fallback",
                        step.name
                    ));
                    let fallback_label = format!("step '{}' fallback", step.name);
                    match run_with_retry(&step.retry, ctx.reporter, &fallback_label, || {
                        fallback(ctx)
                    }) {
                        Ok(()) => Ok(StepStatus::SucceededViaFallback),
                        Err(fallback_err) => Err(fallback_err),
                    }
                }
                None => Err(primary_err),
            },
        };

        match resolved {
            Ok(status) => {
                ctx.reporter.info(format!("step '{}': done", step.name));
                records.push(StepRecord {
                    step: step.name.clone(),
                    status,
                    diagnostic: None,
                    exit_code: None,
                });
            }
            Err(err) => match step.criticality {
                Criticality::AbortOnFailure => {
                    ctx.reporter
                        .critical(format!("step '{}' failed:\n{}", step.name, err.diagnostic));
                    let reason = err.diagnostic.clone();
                    records.push(StepRecord {
                        step: step.name.clone(),
                        status: StepStatus::FailedFatal,
                        diagnostic: Some(err.diagnostic),
                        exit_code: err.exit_code,
                    });
                    return RunReport {
                        records,
                        status: RunStatus::Aborted {
                            step: step.name.clone(),
                            reason,
                        },
                    };
                }
                Criticality::WarnAndContinue => {
                    ctx.reporter.warning(format!(
                        "step '{}' failed, continuing: {}",
                        step.name, err.diagnostic
                    ));
                    records.push(StepRecord {
                        step: step.name.clone(),
                        status: StepStatus::FailedRecoverable,
                        diagnostic: Some(err.diagnostic),
                        exit_code: err.exit_code,
                    });
                }
            },
        }
    }

    RunReport {
        records,
        status: RunStatus::CompletedFully,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Fixture {
        target: InstallationTarget,
        runner: Runner,
        reporter: Reporter,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                target: crate::target::example(),
                runner: Runner::new(),
                reporter: Reporter::silent(),
            }
        }

        fn ctx(&self) -> StepContext<'_> {
            StepContext {
                target: &self.target,
                family: DistroFamily::Debian,
                runner: &self.runner,
                reporter: &self.reporter,
            }
        }
    }

    #[test]
    fn test_satisfied_precondition_skips_without_acting() {
        let fixture = Fixture::new();
        let calls = Rc::new(Cell::new(0u32));
        let calls_in_action = Rc::clone(&calls);

        let steps = vec![
            Step::new("converged", move |_| {
                calls_in_action.set(calls_in_action.get() + 1);
                Ok(())
            })
            .precondition(|_| true),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert_eq!(report.records[0].status, StepStatus::Skipped);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_all_satisfied_reports_all_skipped() {
        let fixture = Fixture::new();
        let steps: Vec<Step> = (0..4)
            .map(|i| Step::new(format!("step-{}", i), |_| Ok(())).precondition(|_| true))
            .collect();

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert!(
            report
                .records
                .iter()
                .all(|r| r.status == StepStatus::Skipped)
        );
    }

    #[test]
    fn test_fatal_failure_halts_remaining_steps() {
        let fixture = Fixture::new();
        let later_ran = Rc::new(Cell::new(false));
        let later_flag = Rc::clone(&later_ran);

        let steps = vec![
            Step::new("first", |_| Ok(())),
            Step::new("breaks", |_| Err(ActionError::new("installer exploded"))),
            Step::new("never", move |_| {
                later_flag.set(true);
                Ok(())
            }),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(!report.completed());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].status, StepStatus::Succeeded);
        assert_eq!(report.records[1].status, StepStatus::FailedFatal);
        assert!(!later_ran.get());

        match &report.status {
            RunStatus::Aborted { step, reason } => {
                assert_eq!(step, "breaks");
                assert!(reason.contains("installer exploded"));
            }
            RunStatus::CompletedFully => panic!("expected aborted run"),
        }
    }

    #[test]
    fn test_warn_and_continue_failure_proceeds() {
        let fixture = Fixture::new();
        let steps = vec![
            Step::new("tolerated", |_| Err(ActionError::new("partial failure")))
                .warn_and_continue(),
            Step::new("after", |_| Ok(())),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert_eq!(report.records[0].status, StepStatus::FailedRecoverable);
        assert_eq!(
            report.records[0].diagnostic.as_deref(),
            Some("partial failure")
        );
        assert_eq!(report.records[1].status, StepStatus::Succeeded);
    }

    #[test]
    fn test_fallback_rescues_failed_primary() {
        let fixture = Fixture::new();
        let steps = vec![
            Step::new("needs-fallback", |_| {
                Err(ActionError::new("primary path unavailable"))
            })
            .fallback(|_| Ok(())),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert_eq!(report.records[0].status, StepStatus::SucceededViaFallback);
    }

    #[test]
    fn test_fallback_not_tried_when_primary_succeeds() {
        let fixture = Fixture::new();
        let fallback_ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fallback_ran);

        let steps = vec![Step::new("fine", |_| Ok(())).fallback(move |_| {
            flag.set(true);
            Ok(())
        })];

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert!(!fallback_ran.get());
    }

    #[test]
    fn test_fallback_failure_is_fatal_for_critical_step() {
        let fixture = Fixture::new();
        let steps = vec![
            Step::new("doomed", |_| Err(ActionError::new("primary broke")))
                .fallback(|_| Err(ActionError::new("fallback broke too"))),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(!report.completed());
        assert_eq!(report.records[0].status, StepStatus::FailedFatal);
        assert_eq!(
            report.records[0].diagnostic.as_deref(),
            Some("fallback broke too")
        );
    }

    #[test]
    fn test_retry_policy_applies_to_step_action() {
        let fixture = Fixture::new();
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);

        let steps = vec![
            Step::new("flaky", move |_| {
                counter.set(counter.get() + 1);
                Err(ActionError::new("transient glitch"))
            })
            .retry(RetryPolicy::new(3, Duration::ZERO))
            .warn_and_continue(),
        ];

        let report = run(&steps, &fixture.ctx());
        assert!(report.completed());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exit_code_recorded_on_failure() {
        let fixture = Fixture::new();
        let steps = vec![
            Step::new("coded", |_| {
                Err(ActionError {
                    diagnostic: "exited with status 2".to_string(),
                    exit_code: Some(2),
                })
            })
            .warn_and_continue(),
        ];

        let report = run(&steps, &fixture.ctx());
        assert_eq!(report.records[0].exit_code, Some(2));
    }

    #[test]
    fn test_plan_reports_without_acting() {
        let fixture = Fixture::new();
        let acted = Rc::new(Cell::new(false));
        let flag = Rc::clone(&acted);

        let steps = vec![
            Step::new("unmet", move |_| {
                flag.set(true);
                Ok(())
            }),
            Step::new("met", |_| Ok(())).precondition(|_| true),
        ];

        let entries = plan(&steps, &fixture.ctx());
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].satisfied);
        assert!(entries[1].satisfied);
        assert!(!acted.get());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let fixture = Fixture::new();
        let steps = vec![Step::new("only", |_| Ok(()))];
        let report = run(&steps, &fixture.ctx());

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"step\":\"only\""));
        assert!(json.contains("\"status\":\"succeeded\""));
        assert!(json.contains("\"result\":\"completed_fully\""));
    }
}
