//! Error types and handling for hostprep
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`platform`]: Platform detection and support errors
//! - [`config`]: Target descriptor errors
//! - [`step`]: Workflow step errors
//! - [`scratch`]: Scratch workspace errors

pub mod config;
pub mod platform;
pub mod scratch;
pub mod step;

#[allow(unused_imports)]
pub use config::{
    invalid as config_invalid, not_found as config_not_found, parse_failed as config_parse_failed,
};
#[allow(unused_imports)]
pub use platform::{detect_failed as platform_detect_failed, unsupported as platform_unsupported};
#[allow(unused_imports)]
pub use scratch::setup_failed as scratch_setup_failed;
#[allow(unused_imports)]
pub use step::aborted as step_aborted;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for hostprep operations
#[derive(Error, Diagnostic, Debug)]
pub enum HostprepError {
    // Platform errors
    #[error("Platform not supported: {distro} {version}")]
    #[diagnostic(
        code(hostprep::platform::unsupported),
        help("Supported targets: ubuntu 20.04/22.04/24.04, debian 11/12, fedora 40/41")
    )]
    PlatformUnsupported { distro: String, version: String },

    #[error("Failed to detect platform: {reason}")]
    #[diagnostic(
        code(hostprep::platform::detect_failed),
        help("hostprep reads /etc/os-release; set HOSTPREP_OS_RELEASE to override")
    )]
    PlatformDetectFailed { reason: String },

    // Target descriptor errors
    #[error("Target descriptor not found: {path}")]
    #[diagnostic(
        code(hostprep::config::not_found),
        help("Pass --config, set HOSTPREP_CONFIG, or place hostprep.yaml in the working directory")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse target descriptor: {path}")]
    #[diagnostic(code(hostprep::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid target descriptor: {message}")]
    #[diagnostic(code(hostprep::config::invalid))]
    ConfigInvalid { message: String },

    // Workflow errors
    #[error("Provisioning aborted at step '{step}': {reason}")]
    #[diagnostic(
        code(hostprep::step::aborted),
        help("The captured command output above shows the root cause; re-run after fixing it")
    )]
    StepAborted { step: String, reason: String },

    #[error("This command must run as root")]
    #[diagnostic(
        code(hostprep::privilege::required),
        help("Re-run under sudo, or use --dry-run to preview without changes")
    )]
    SuperuserRequired,

    // Scratch workspace errors
    #[error("Failed to set up scratch directory: {reason}")]
    #[diagnostic(code(hostprep::scratch::setup_failed))]
    ScratchSetupFailed { reason: String },

    // Source fetch errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(hostprep::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(hostprep::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for HostprepError {
    fn from(err: std::io::Error) -> Self {
        HostprepError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for HostprepError {
    fn from(err: serde_yaml::Error) -> Self {
        HostprepError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HostprepError {
    fn from(err: serde_json::Error) -> Self {
        HostprepError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for HostprepError {
    fn from(err: git2::Error) -> Self {
        HostprepError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for HostprepError {
    fn from(err: inquire::InquireError) -> Self {
        HostprepError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, HostprepError>;
