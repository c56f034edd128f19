//! Workflow step errors

use super::HostprepError;

pub fn aborted(step: impl Into<String>, reason: impl Into<String>) -> HostprepError {
    HostprepError::StepAborted {
        step: step.into(),
        reason: reason.into(),
    }
}
