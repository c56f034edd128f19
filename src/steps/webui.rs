//! Web console install
//!
//! Primary path installs the published wheel into a virtualenv under the
//! install directory. The fallback clones the console's source into a
//! scoped scratch directory and builds from there; the scratch directory is
//! gone by the time the step ends, whichever way it ends.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};
use crate::scratch::{self, ScratchDir};
use crate::target::InstallationTarget;

pub fn step() -> Step {
    Step::new("web-console", install_from_pip)
        .precondition(|ctx| probe::executable_file(&console_binary(ctx.target)))
        .fallback(install_from_source)
        .retry(RetryPolicy::new(3, Duration::from_secs(10)))
}

pub(crate) fn venv_dir(target: &InstallationTarget) -> PathBuf {
    target.install_dir.join("venv")
}

pub(crate) fn console_binary(target: &InstallationTarget) -> PathBuf {
    venv_dir(target).join("bin").join(&target.webui.package)
}

fn install_from_pip(ctx: &StepContext) -> Result<(), ActionError> {
    prepare(ctx)?;

    let pip = venv_dir(ctx.target).join("bin").join("pip");
    let pip = pip.display().to_string();
    let out = ctx
        .runner
        .run(&pip, &["install", "--quiet", &ctx.target.webui.package]);
    if !out.success() {
        return Err(ActionError::from_output(
            &format!("pip install {}", ctx.target.webui.package),
            &out,
        ));
    }

    finish(ctx)
}

fn install_from_source(ctx: &StepContext) -> Result<(), ActionError> {
    prepare(ctx)?;

    let scratch = ScratchDir::acquire(&scratch::temp_dir_base())
        .map_err(|e| ActionError::new(e.to_string()))?;
    let checkout = scratch.path().join("src");

    let repo = &ctx.target.webui.source_repo;
    ctx.reporter
        .info(format!("building web console from source: {}", repo));
    git2::build::RepoBuilder::new()
        .clone(repo, &checkout)
        .map_err(|e| ActionError::new(format!("clone of {}: {}", repo, e)))?;

    let pip = venv_dir(ctx.target).join("bin").join("pip");
    let pip = pip.display().to_string();
    let checkout_arg = checkout.display().to_string();
    let out = ctx.runner.run(&pip, &["install", "--quiet", &checkout_arg]);
    if !out.success() {
        return Err(ActionError::from_output("pip install from source", &out));
    }

    finish(ctx)
}

/// Directories and virtualenv shared by both install paths
fn prepare(ctx: &StepContext) -> Result<(), ActionError> {
    for dir in [&ctx.target.install_dir, &ctx.target.data_dir] {
        fs::create_dir_all(dir)
            .map_err(|e| ActionError::new(format!("mkdir {}: {}", dir.display(), e)))?;
    }

    let venv = venv_dir(ctx.target);
    if !venv.join("bin").join("pip").is_file() {
        let venv_arg = venv.display().to_string();
        let out = ctx.runner.run("python3", &["-m", "venv", &venv_arg]);
        if !out.success() {
            return Err(ActionError::from_output("python3 -m venv", &out));
        }
    }
    Ok(())
}

/// Verify the console entrypoint landed, then hand the tree to the service
/// account
fn finish(ctx: &StepContext) -> Result<(), ActionError> {
    let binary = console_binary(ctx.target);
    if !probe::executable_file(&binary) {
        return Err(ActionError::new(format!(
            "install finished but {} is missing",
            binary.display()
        )));
    }

    let owner = format!("{}:{}", ctx.target.webui_run_user(), ctx.target.webui_run_group());
    let install = ctx.target.install_dir.display().to_string();
    let data = ctx.target.data_dir.display().to_string();
    let out = ctx.runner.run("chown", &["-R", &owner, &install, &data]);
    if !out.success() {
        return Err(ActionError::from_output(&format!("chown -R {}", owner), &out));
    }
    Ok(())
}
