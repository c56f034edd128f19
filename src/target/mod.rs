//! Installation target descriptor
//!
//! Pure data describing where and as whom software is installed: directories,
//! service identities, the ordered model list, and the external→internal
//! port pair. Loaded once at workflow start, validated up front, never
//! mutated during a run.

pub mod distro;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, config_invalid, config_not_found, config_parse_failed};

const DESCRIPTOR_NAME: &str = "hostprep.yaml";

/// Immutable descriptor consumed by the provisioning steps
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallationTarget {
    /// Where the web console and its virtualenv live
    pub install_dir: PathBuf,
    /// Web console state directory, recorded in the service unit
    pub data_dir: PathBuf,
    pub daemon: DaemonSpec,
    pub webui: WebUiSpec,
    /// Models pulled after the daemon is up, in order
    #[serde(default)]
    pub models: Vec<String>,
    pub ports: PortMap,
    #[serde(default)]
    pub packages: PackageSets,
}

/// The model-serving daemon, treated as a black box
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonSpec {
    /// Binary the vendor installer puts on PATH
    pub binary: String,
    /// Its systemd unit name
    pub service: String,
    /// Account the vendor installer creates
    pub user: String,
    /// Vendor install script, piped through sh
    pub installer_url: String,
    /// Distro package to fall back to when the installer fails
    pub package: String,
    #[serde(default = "default_daemon_host")]
    pub host: String,
    pub port: u16,
}

/// The web console installed in front of the daemon
#[derive(Debug, Clone, Deserialize)]
pub struct WebUiSpec {
    /// pip distribution name
    pub package: String,
    /// Source repository for the build-from-source fallback
    pub source_repo: String,
    /// systemd unit name written by the provisioner
    pub service: String,
    pub user: String,
    pub group: String,
    #[serde(default)]
    pub account: WebUiAccount,
}

/// Which account runs the web console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebUiAccount {
    /// A dedicated unprivileged system account, created by the provisioner
    #[default]
    Dedicated,
    /// Reuse the daemon installer's account; nothing is created
    Daemon,
}

/// External port redirected to the web console's listen port
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PortMap {
    pub external: u16,
    pub internal: u16,
}

/// Prerequisite packages per distro family
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSets {
    #[serde(default)]
    pub debian: Vec<String>,
    #[serde(default)]
    pub rhel: Vec<String>,
}

impl PackageSets {
    pub fn for_family(&self, family: distro::DistroFamily) -> &[String] {
        match family {
            distro::DistroFamily::Debian => &self.debian,
            distro::DistroFamily::Rhel => &self.rhel,
        }
    }
}

fn default_daemon_host() -> String {
    "127.0.0.1".to_string()
}

impl InstallationTarget {
    /// Load and validate a descriptor file
    pub fn load(path: &Path) -> Result<InstallationTarget> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                config_not_found(path.display().to_string())
            } else {
                config_parse_failed(path.display().to_string(), e.to_string())
            }
        })?;

        let target: InstallationTarget = serde_yaml::from_str(&content)
            .map_err(|e| config_parse_failed(path.display().to_string(), e.to_string()))?;
        target.validate()?;
        Ok(target)
    }

    /// Resolve the descriptor path: explicit flag, then working directory,
    /// then user config, then /etc
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let mut candidates = vec![PathBuf::from(DESCRIPTOR_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("hostprep").join(DESCRIPTOR_NAME));
        }
        candidates.push(PathBuf::from("/etc/hostprep").join(DESCRIPTOR_NAME));

        candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                config_not_found(format!(
                    "{} (searched working directory, user config dir, /etc/hostprep)",
                    DESCRIPTOR_NAME
                ))
            })
    }

    /// The account the web console runs as, per the descriptor policy
    pub fn webui_run_user(&self) -> &str {
        match self.webui.account {
            WebUiAccount::Dedicated => &self.webui.user,
            WebUiAccount::Daemon => &self.daemon.user,
        }
    }

    /// The group matching [`InstallationTarget::webui_run_user`]
    pub fn webui_run_group(&self) -> &str {
        match self.webui.account {
            WebUiAccount::Dedicated => &self.webui.group,
            WebUiAccount::Daemon => &self.daemon.user,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.install_dir.is_absolute() {
            return Err(config_invalid("install_dir must be an absolute path"));
        }
        if !self.data_dir.is_absolute() {
            return Err(config_invalid("data_dir must be an absolute path"));
        }
        if self.ports.external == 0 || self.ports.internal == 0 {
            return Err(config_invalid("ports must be non-zero"));
        }
        if self.ports.external == self.ports.internal {
            return Err(config_invalid(
                "ports.external and ports.internal must differ",
            ));
        }
        if self.daemon.port == 0 {
            return Err(config_invalid("daemon.port must be non-zero"));
        }

        for (field, value) in [
            ("daemon.binary", &self.daemon.binary),
            ("daemon.service", &self.daemon.service),
            ("daemon.user", &self.daemon.user),
            ("daemon.installer_url", &self.daemon.installer_url),
            ("daemon.package", &self.daemon.package),
            ("webui.package", &self.webui.package),
            ("webui.source_repo", &self.webui.source_repo),
            ("webui.service", &self.webui.service),
            ("webui.user", &self.webui.user),
            ("webui.group", &self.webui.group),
        ] {
            if value.trim().is_empty() {
                return Err(config_invalid(format!("{} must not be empty", field)));
            }
        }

        for model in &self.models {
            if model.trim().is_empty() || model.chars().any(char::is_whitespace) {
                return Err(config_invalid(format!("invalid model name: '{}'", model)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn example() -> InstallationTarget {
    serde_yaml::from_str(EXAMPLE_YAML).expect("example descriptor parses")
}

#[cfg(test)]
pub(crate) const EXAMPLE_YAML: &str = r#"
install_dir: /opt/webconsole
data_dir: /var/lib/webconsole
daemon:
  binary: ollama
  service: ollama
  user: ollama
  installer_url: https://ollama.com/install.sh
  package: ollama
  port: 11434
webui:
  package: open-webui
  source_repo: https://github.com/open-webui/open-webui.git
  service: webconsole
  user: webconsole
  group: webconsole
models:
  - llama3.2
  - mistral
ports:
  external: 80
  internal: 8080
packages:
  debian: [python3, python3-pip, python3-venv, curl, iptables-persistent]
  rhel: [python3, python3-pip, curl, iptables-services]
"#;
