//! Side-effect-free probes of current system state
//!
//! Steps consult these before acting so converged hosts skip work on
//! re-runs. A probe that cannot decide reports "not satisfied": the worst
//! outcome of a false negative is a redundant, idempotent re-execution,
//! while a false positive could skip a step the host actually needs.

use std::fs;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use crate::exec::Runner;
use crate::target::distro::DistroFamily;

/// Is the named system user present
pub fn user_exists(runner: &Runner, user: &str) -> bool {
    runner.run("id", &["-u", user]).success()
}

/// Is the named group present
pub fn group_exists(runner: &Runner, group: &str) -> bool {
    runner.run("getent", &["group", group]).success()
}

/// Is the named systemd unit active right now
pub fn service_active(runner: &Runner, unit: &str) -> bool {
    runner
        .run("systemctl", &["is-active", "--quiet", unit])
        .success()
}

/// Is the named systemd unit enabled at boot
pub fn service_enabled(runner: &Runner, unit: &str) -> bool {
    runner
        .run("systemctl", &["is-enabled", "--quiet", unit])
        .success()
}

/// Is the named command resolvable on PATH and executable
pub fn command_on_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| executable_file(&dir.join(name)))
}

/// Is there an executable file at exactly this path
pub fn executable_file(candidate: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(candidate)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Does the file exist with exactly the expected content
pub fn file_matches(path: &Path, expected: &str) -> bool {
    fs::read_to_string(path)
        .map(|content| content == expected)
        .unwrap_or(false)
}

/// Is a TCP endpoint accepting connections
pub fn tcp_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let Ok(addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok())
}

/// Is the package installed according to the platform's package database
pub fn package_installed(runner: &Runner, family: DistroFamily, package: &str) -> bool {
    match family {
        DistroFamily::Debian => runner.run("dpkg-query", &["-W", package]).success(),
        DistroFamily::Rhel => runner.run("rpm", &["-q", package]).success(),
    }
}

/// Is the TCP redirect rule already in the NAT table
pub fn nat_redirect_present(runner: &Runner, external: u16, internal: u16) -> bool {
    let external = external.to_string();
    let internal = internal.to_string();
    runner
        .run(
            "iptables",
            &[
                "-t",
                "nat",
                "-C",
                "PREROUTING",
                "-p",
                "tcp",
                "--dport",
                &external,
                "-j",
                "REDIRECT",
                "--to-ports",
                &internal,
            ],
        )
        .success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_command_on_path_finds_sh() {
        assert!(command_on_path("sh"));
    }

    #[test]
    fn test_command_on_path_missing_command() {
        assert!(!command_on_path("hostprep-no-such-binary"));
    }

    #[test]
    fn test_user_exists_root() {
        assert!(user_exists(&Runner::new(), "root"));
    }

    #[test]
    fn test_user_exists_missing_user() {
        assert!(!user_exists(&Runner::new(), "hostprep-no-such-user"));
    }

    #[test]
    fn test_file_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unit.service");
        fs::write(&path, "content\n").unwrap();

        assert!(file_matches(&path, "content\n"));
        assert!(!file_matches(&path, "different\n"));
        assert!(!file_matches(&dir.path().join("absent"), "content\n"));
    }

    #[test]
    fn test_tcp_reachable_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(tcp_reachable(
            "127.0.0.1",
            port,
            Duration::from_millis(500)
        ));
    }

    #[test]
    fn test_tcp_reachable_closed_port() {
        // Bind then drop, so the port is known-free
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(!tcp_reachable(
            "127.0.0.1",
            port,
            Duration::from_millis(200)
        ));
    }
}
