//! Common test utilities for hostprep integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A sandboxed host fixture: descriptor, os-release, and target directories
/// all under one temp dir
#[allow(dead_code)]
pub struct TestHost {
    /// Temporary directory
    pub temp: TempDir,
    /// Fixture root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestHost {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file under the fixture root
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write a descriptor whose install/data dirs live inside the fixture
    /// and whose external tools are deliberately absent from the host
    pub fn write_descriptor(&self) -> PathBuf {
        let content = format!(
            r#"install_dir: {root}/opt/webconsole
data_dir: {root}/var/webconsole
daemon:
  binary: hostprep-test-daemon
  service: hostprep-test-daemon
  user: hostprep-test-daemon
  installer_url: https://example.invalid/install.sh
  package: hostprep-test-daemon
  port: 29434
webui:
  package: hostprep-test-console
  source_repo: https://example.invalid/console.git
  service: hostprep-test-console
  user: hostprep-test-console
  group: hostprep-test-console
models:
  - test-model-a
  - test-model-b
ports:
  external: 29080
  internal: 29081
packages:
  debian: [hostprep-test-pkg]
  rhel: [hostprep-test-pkg]
"#,
            root = self.path.display()
        );
        self.write_file("hostprep.yaml", &content)
    }

    /// Write an os-release fixture for the given distro identity
    pub fn write_os_release(&self, id: &str, version_id: &str) -> PathBuf {
        self.write_file(
            "os-release",
            &format!("ID={}\nVERSION_ID=\"{}\"\n", id, version_id),
        )
    }

    /// The install dir the descriptor points at; must stay absent in
    /// read-only commands
    pub fn install_dir(&self) -> PathBuf {
        self.path.join("opt/webconsole")
    }
}
