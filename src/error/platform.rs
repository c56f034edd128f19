//! Platform errors

use super::HostprepError;

pub fn unsupported(distro: impl Into<String>, version: impl Into<String>) -> HostprepError {
    HostprepError::PlatformUnsupported {
        distro: distro.into(),
        version: version.into(),
    }
}

pub fn detect_failed(reason: impl Into<String>) -> HostprepError {
    HostprepError::PlatformDetectFailed {
        reason: reason.into(),
    }
}
