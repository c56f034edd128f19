//! External command execution with captured output
//!
//! Commands never surface as `Err`: a failure to spawn, a signal death, or a
//! non-zero exit all come back as an [`Output`] for the caller to inspect.
//! Captured streams are kept to a bounded tail so a noisy installer cannot
//! balloon the run log.

use std::process::Command;

/// Retained bytes per captured stream; failure detail tends to sit at the end
const MAX_CAPTURE: usize = 64 * 1024;

/// Result of running an external command
#[derive(Debug, Clone)]
pub struct Output {
    /// Exit code, or `None` when the process could not be spawned or was
    /// killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Combined stdout and stderr, for pattern inspection
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        text.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stderr.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }

    /// Short diagnostic line for the run log
    pub fn diagnostic(&self) -> String {
        let combined = self.combined();
        let trimmed = combined.trim();
        if trimmed.is_empty() {
            match self.exit_code {
                Some(code) => format!("exited with status {} and no output", code),
                None => "process did not start".to_string(),
            }
        } else {
            trimmed.to_string()
        }
    }
}

/// Runs external commands on the target host
#[derive(Debug, Clone, Default)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Run a command and capture its output
    pub fn run(&self, program: &str, args: &[&str]) -> Output {
        let mut cmd = Command::new(program);
        cmd.args(args);
        invoke(cmd)
    }

    /// Run a command as another user via `runuser`
    pub fn run_as(&self, user: &str, program: &str, args: &[&str]) -> Output {
        let mut cmd = Command::new("runuser");
        cmd.arg("-u").arg(user).arg("--").arg(program).args(args);
        invoke(cmd)
    }

    /// Run a shell snippet; used for vendor installers piped through `sh`
    pub fn shell(&self, script: &str) -> Output {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        invoke(cmd)
    }
}

fn invoke(mut cmd: Command) -> Output {
    match cmd.output() {
        Ok(out) => Output {
            exit_code: out.status.code(),
            stdout: tail(&String::from_utf8_lossy(&out.stdout)),
            stderr: tail(&String::from_utf8_lossy(&out.stderr)),
        },
        Err(e) => Output {
            exit_code: None,
            stdout: String::new(),
            stderr: format!("failed to spawn {:?}: {}", cmd.get_program(), e),
        },
    }
}

/// Keep at most `MAX_CAPTURE` bytes from the end of a stream, on a char
/// boundary
fn tail(text: &str) -> String {
    if text.len() <= MAX_CAPTURE {
        return text.to_string();
    }
    let mut start = text.len() - MAX_CAPTURE;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_exit_code() {
        let out = Runner::new().shell("exit 7");
        assert_eq!(out.exit_code, Some(7));
        assert!(!out.success());
    }

    #[test]
    fn test_run_success() {
        let out = Runner::new().run("true", &[]);
        assert_eq!(out.exit_code, Some(0));
        assert!(out.success());
    }

    #[test]
    fn test_run_captures_streams() {
        let out = Runner::new().shell("echo out; echo err >&2");
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
        let combined = out.combined();
        assert!(combined.contains("out"));
        assert!(combined.contains("err"));
    }

    #[test]
    fn test_run_as_switches_user() {
        let runner = Runner::new();
        if runner.run("id", &["-u"]).stdout.trim() != "0" {
            // switching users needs privilege; nothing to assert here
            return;
        }
        let out = runner.run_as("nobody", "id", &["-un"]);
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "nobody");
    }

    #[test]
    fn test_missing_program_is_not_an_error() {
        let out = Runner::new().run("hostprep-no-such-binary", &[]);
        assert_eq!(out.exit_code, None);
        assert!(!out.success());
        assert!(out.stderr.contains("failed to spawn"));
    }

    #[test]
    fn test_diagnostic_for_silent_failure() {
        let out = Runner::new().shell("exit 3");
        assert_eq!(out.diagnostic(), "exited with status 3 and no output");
    }

    #[test]
    fn test_tail_keeps_end_of_stream() {
        let long = "a".repeat(MAX_CAPTURE) + "tail-marker";
        let kept = tail(&long);
        assert_eq!(kept.len(), MAX_CAPTURE);
        assert!(kept.ends_with("tail-marker"));
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        let long = "é".repeat(MAX_CAPTURE);
        let kept = tail(&long);
        assert!(kept.len() <= MAX_CAPTURE);
        assert!(kept.chars().all(|c| c == 'é'));
    }
}
