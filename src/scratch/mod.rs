//! Scoped scratch directories for build and download steps
//!
//! A [`ScratchDir`] is a uniquely named directory that is removed when its
//! owning step's scope ends, on every exit path. When the ambient `TMPDIR`
//! is set, the directory is created inside it and the variable is left
//! untouched; otherwise the directory is created under the given base and
//! `TMPDIR` points at it for the duration of the scope, then is restored to
//! exactly its prior state (unset stays unset).
//!
//! Release is idempotent, so the normal scope exit and the interrupt hook
//! can race without error. The interrupt hook only removes directories; the
//! environment dies with the process.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use crate::error::{Result, scratch_setup_failed};

const TMPDIR_VAR: &str = "TMPDIR";

/// Scratch directories that still exist on disk, for the interrupt hook
static ACTIVE: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
static HOOK: Once = Once::new();

/// A uniquely allocated directory removed when the handle is released or
/// dropped
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    /// Present when this handle set `TMPDIR` and owes a restore
    restore: Option<Option<OsString>>,
    released: bool,
}

impl ScratchDir {
    /// Allocate a scratch directory under `base`, or under the ambient
    /// `TMPDIR` when one is set
    pub fn acquire(base: &Path) -> Result<ScratchDir> {
        let ambient = env::var_os(TMPDIR_VAR).filter(|v| !v.is_empty());
        let parent = ambient
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| base.to_path_buf());

        fs::create_dir_all(&parent)
            .map_err(|e| scratch_setup_failed(format!("{}: {}", parent.display(), e)))?;

        let dir = tempfile::Builder::new()
            .prefix("hostprep-")
            .tempdir_in(&parent)
            .map_err(|e| scratch_setup_failed(format!("{}: {}", parent.display(), e)))?;
        let path = dir.into_path();

        let restore = if ambient.is_some() {
            None
        } else {
            unsafe {
                env::set_var(TMPDIR_VAR, &path);
            }
            Some(ambient)
        };

        if let Ok(mut active) = ACTIVE.lock() {
            active.push(path.clone());
        }

        Ok(ScratchDir {
            path,
            restore,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and restore the ambient `TMPDIR`
    ///
    /// Removal is best-effort; a failure is logged and never escalated.
    /// Calling release twice is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Ok(mut active) = ACTIVE.lock() {
            active.retain(|p| p != &self.path);
        }

        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                eprintln!(
                    "Warning: failed to remove scratch dir {}: {}",
                    self.path.display(),
                    e
                );
            }
        }

        if let Some(previous) = self.restore.take() {
            match previous {
                Some(value) => unsafe {
                    env::set_var(TMPDIR_VAR, value);
                },
                None => unsafe {
                    env::remove_var(TMPDIR_VAR);
                },
            }
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.release();
    }
}

/// Install a SIGINT/SIGTERM hook that removes still-active scratch
/// directories before the process dies
pub fn install_interrupt_cleanup() {
    HOOK.call_once(|| {
        let result = ctrlc::set_handler(|| {
            purge_active();
            std::process::exit(130);
        });
        if let Err(e) = result {
            eprintln!("Warning: could not install interrupt cleanup: {}", e);
        }
    });
}

/// Remove every still-registered scratch directory
pub fn purge_active() {
    if let Ok(mut active) = ACTIVE.lock() {
        for path in active.drain(..) {
            let _ = fs::remove_dir_all(&path);
        }
    }
}

/// Absolute base for scratch allocation, so directories are never created
/// under the current working directory (e.g. when TMPDIR=tmp)
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        PathBuf::from("/tmp")
    }
}
