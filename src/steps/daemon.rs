//! Model-serving daemon: install and bring up
//!
//! The daemon ships its own installer script; that is the primary path. The
//! fallback is the distro package, which trails the vendor releases but
//! unblocks hosts that cannot reach the installer endpoint.

use std::time::Duration;

use super::wait_reachable;
use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};
use crate::target::distro::DistroFamily;

const READY_PROBES: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_secs(2);

pub fn install_step() -> Step {
    Step::new("model-daemon", run_vendor_installer)
        .precondition(|ctx| probe::command_on_path(&ctx.target.daemon.binary))
        .fallback(install_from_packages)
        .retry(RetryPolicy::new(3, Duration::from_secs(10)))
}

pub fn service_step() -> Step {
    Step::new("daemon-service", start_and_wait)
        .precondition(|ctx| {
            let daemon = &ctx.target.daemon;
            probe::service_active(ctx.runner, &daemon.service)
                && probe::tcp_reachable(&daemon.host, daemon.port, Duration::from_secs(1))
        })
        .retry(RetryPolicy::new(2, Duration::from_secs(5)))
}

fn run_vendor_installer(ctx: &StepContext) -> Result<(), ActionError> {
    let url = &ctx.target.daemon.installer_url;
    ctx.reporter
        .info(format!("running vendor installer from {}", url));

    let out = ctx.runner.shell(&format!("curl -fsSL {} | sh", url));
    if !out.success() {
        return Err(ActionError::from_output("vendor installer", &out));
    }

    if !probe::command_on_path(&ctx.target.daemon.binary) {
        return Err(ActionError::new(format!(
            "installer finished but '{}' is not on PATH",
            ctx.target.daemon.binary
        )));
    }
    Ok(())
}

fn install_from_packages(ctx: &StepContext) -> Result<(), ActionError> {
    let package = &ctx.target.daemon.package;
    let out = match ctx.family {
        DistroFamily::Debian => ctx.runner.shell(&format!(
            "DEBIAN_FRONTEND=noninteractive apt-get install -y -q {}",
            package
        )),
        DistroFamily::Rhel => ctx.runner.shell(&format!("dnf install -y -q {}", package)),
    };

    if !out.success() {
        return Err(ActionError::from_output(
            &format!("package install of {}", package),
            &out,
        ));
    }
    Ok(())
}

fn start_and_wait(ctx: &StepContext) -> Result<(), ActionError> {
    let daemon = &ctx.target.daemon;

    let out = ctx
        .runner
        .run("systemctl", &["enable", "--now", &daemon.service]);
    if !out.success() {
        return Err(ActionError::from_output(
            &format!("systemctl enable --now {}", daemon.service),
            &out,
        ));
    }

    wait_reachable(
        ctx,
        &daemon.host,
        daemon.port,
        READY_PROBES,
        READY_INTERVAL,
    )
}
