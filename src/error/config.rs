//! Target descriptor errors

use super::HostprepError;

pub fn not_found(path: impl Into<String>) -> HostprepError {
    HostprepError::ConfigNotFound { path: path.into() }
}

pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> HostprepError {
    HostprepError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn invalid(message: impl Into<String>) -> HostprepError {
    HostprepError::ConfigInvalid {
        message: message.into(),
    }
}
