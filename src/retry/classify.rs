//! Failure classification from captured command diagnostics
//!
//! The signature table maps known substrings of external-tool output to a
//! failure kind. New signatures are additive rows, not new conditionals.

/// How a failed attempt should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth another attempt after the policy delay
    Retryable,
    /// Retrying cannot help; give up immediately
    Terminal,
}

/// Known failure signatures, first match wins
const SIGNATURES: &[(&str, FailureKind)] = &[
    ("no space left on device", FailureKind::Terminal),
    ("read-only file system", FailureKind::Terminal),
    ("permission denied", FailureKind::Terminal),
    ("operation not permitted", FailureKind::Terminal),
    ("unable to locate package", FailureKind::Terminal),
    ("no installation candidate", FailureKind::Terminal),
    ("no match for argument", FailureKind::Terminal),
    ("manifest unknown", FailureKind::Terminal),
    ("temporary failure in name resolution", FailureKind::Retryable),
    ("could not resolve", FailureKind::Retryable),
    ("network is unreachable", FailureKind::Retryable),
    ("connection timed out", FailureKind::Retryable),
    ("connection reset", FailureKind::Retryable),
    ("connection refused", FailureKind::Retryable),
    ("tls handshake", FailureKind::Retryable),
    ("could not get lock", FailureKind::Retryable),
];

/// Classify a diagnostic, falling back to the policy default when no
/// signature matches
pub fn classify(diagnostic: &str, default: FailureKind) -> FailureKind {
    let lowered = diagnostic.to_lowercase();
    for (pattern, kind) in SIGNATURES {
        if lowered.contains(pattern) {
            return *kind;
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_full_is_terminal() {
        assert_eq!(
            classify(
                "tar: /tmp/build: No space left on device",
                FailureKind::Retryable
            ),
            FailureKind::Terminal
        );
    }

    #[test]
    fn test_dns_failure_is_retryable() {
        assert_eq!(
            classify(
                "curl: (6) Temporary failure in name resolution",
                FailureKind::Terminal
            ),
            FailureKind::Retryable
        );
    }

    #[test]
    fn test_apt_lock_is_retryable() {
        assert_eq!(
            classify(
                "E: Could not get lock /var/lib/dpkg/lock-frontend",
                FailureKind::Terminal
            ),
            FailureKind::Retryable
        );
    }

    #[test]
    fn test_missing_package_is_terminal() {
        assert_eq!(
            classify("E: Unable to locate package libfoo", FailureKind::Retryable),
            FailureKind::Terminal
        );
    }

    #[test]
    fn test_unmatched_uses_default() {
        assert_eq!(
            classify("something unexpected", FailureKind::Retryable),
            FailureKind::Retryable
        );
        assert_eq!(
            classify("something unexpected", FailureKind::Terminal),
            FailureKind::Terminal
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            classify("CONNECTION RESET by peer", FailureKind::Terminal),
            FailureKind::Retryable
        );
    }
}
