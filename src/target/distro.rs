//! Distro detection against the fixed supported set
//!
//! Detection reads `/etc/os-release` (or the file named by
//! `HOSTPREP_OS_RELEASE`, which keeps the platform gate testable). An
//! unsupported distro/version pair is rejected at load time, before any
//! mutation of the host.

use std::fs;
use std::path::Path;

use crate::error::{Result, platform_detect_failed, platform_unsupported};

/// Environment override for the os-release path
pub const OS_RELEASE_ENV: &str = "HOSTPREP_OS_RELEASE";

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Package-manager family of a supported distro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistroFamily {
    /// apt/dpkg based
    Debian,
    /// dnf/rpm based
    Rhel,
}

/// Identity parsed from os-release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distro {
    pub id: String,
    pub version_id: String,
}

/// The fixed supported set; anything else is a load-time fatal error
const SUPPORTED: &[(&str, &str, DistroFamily)] = &[
    ("ubuntu", "20.04", DistroFamily::Debian),
    ("ubuntu", "22.04", DistroFamily::Debian),
    ("ubuntu", "24.04", DistroFamily::Debian),
    ("debian", "11", DistroFamily::Debian),
    ("debian", "12", DistroFamily::Debian),
    ("fedora", "40", DistroFamily::Rhel),
    ("fedora", "41", DistroFamily::Rhel),
];

/// Detect the host distro
pub fn detect() -> Result<Distro> {
    let path = std::env::var_os(OS_RELEASE_ENV)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from(OS_RELEASE_PATH));
    detect_from(&path)
}

/// Detect from a specific os-release file
pub fn detect_from(path: &Path) -> Result<Distro> {
    let content = fs::read_to_string(path)
        .map_err(|e| platform_detect_failed(format!("{}: {}", path.display(), e)))?;
    parse_os_release(&content)
        .ok_or_else(|| platform_detect_failed(format!("{}: missing ID or VERSION_ID", path.display())))
}

/// Check the distro against the supported set, yielding its family
pub fn ensure_supported(distro: &Distro) -> Result<DistroFamily> {
    SUPPORTED
        .iter()
        .find(|(id, version, _)| *id == distro.id && *version == distro.version_id)
        .map(|(_, _, family)| *family)
        .ok_or_else(|| platform_unsupported(&distro.id, &distro.version_id))
}

fn parse_os_release(content: &str) -> Option<Distro> {
    let mut id = None;
    let mut version_id = None;

    for line in content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(unquote(value));
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version_id = Some(unquote(value));
        }
    }

    Some(Distro {
        id: id?,
        version_id: version_id?,
    })
}

fn unquote(value: &str) -> String {
    value.trim_matches('"').to_string()
}
