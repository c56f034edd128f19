//! Bounded retry around fallible step actions

pub mod classify;

pub use classify::{FailureKind, classify};

use std::time::Duration;

use crate::exec::Output;
use crate::report::Reporter;

/// Retry policy attached to a step at definition time
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (always at least 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
    /// Classification for diagnostics no signature matches
    pub default_kind: FailureKind,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            default_kind: FailureKind::Retryable,
        }
    }

    /// Single attempt, no delay; for steps that manage their own retries
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            default_kind: FailureKind::Terminal,
        }
    }

    /// Treat unmatched diagnostics as terminal; for local-only actions where
    /// repeating an identical failure cannot help
    pub fn terminal_by_default(mut self) -> Self {
        self.default_kind = FailureKind::Terminal;
        self
    }
}

/// A failed action attempt with its captured diagnostic
#[derive(Debug, Clone)]
pub struct ActionError {
    pub diagnostic: String,
    pub exit_code: Option<i32>,
}

impl ActionError {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
            exit_code: None,
        }
    }

    /// Build from a command's captured output, prefixed with what was being
    /// attempted
    pub fn from_output(context: &str, output: &Output) -> Self {
        Self {
            diagnostic: format!("{}: {}", context, output.diagnostic()),
            exit_code: output.exit_code,
        }
    }
}

/// Invoke an action under a retry policy
///
/// Every attempt's outcome is logged. A terminal classification stops the
/// loop immediately; otherwise attempts continue, with the configured delay
/// in between, until one succeeds or the attempts run out.
pub fn run_with_retry<F>(
    policy: &RetryPolicy,
    reporter: &Reporter,
    what: &str,
    mut attempt_fn: F,
) -> Result<(), ActionError>
where
    F: FnMut() -> Result<(), ActionError>,
{
    let max = policy.max_attempts;
    let mut attempt = 1;
    loop {
        match attempt_fn() {
            Ok(()) => {
                if attempt > 1 {
                    reporter.info(format!("{} succeeded on attempt {}/{}", what, attempt, max));
                }
                return Ok(());
            }
            Err(err) => {
                reporter.warning(format!(
                    "attempt {}/{} of {} failed: {}",
                    attempt,
                    max,
                    what,
                    summary_line(&err.diagnostic)
                ));

                if classify(&err.diagnostic, policy.default_kind) == FailureKind::Terminal {
                    reporter.error(format!("{} hit a non-retryable failure", what));
                    return Err(err);
                }
                if attempt >= max {
                    return Err(err);
                }
                std::thread::sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

/// Last non-empty line of a diagnostic, bounded for log readability
fn summary_line(diagnostic: &str) -> String {
    let line = diagnostic
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no diagnostic output");
    if line.len() > 200 {
        let mut end = 200;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &line[..end])
    } else {
        line.to_string()
    }
}
