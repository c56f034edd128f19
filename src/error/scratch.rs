//! Scratch workspace errors

use super::HostprepError;

pub fn setup_failed(reason: impl Into<String>) -> HostprepError {
    HostprepError::ScratchSetupFailed {
        reason: reason.into(),
    }
}
