//! Prerequisite distro packages

use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};
use crate::target::distro::DistroFamily;

pub fn step() -> Step {
    Step::new("prerequisite-packages", install_packages)
        .precondition(|ctx| {
            ctx.target
                .packages
                .for_family(ctx.family)
                .iter()
                .all(|p| probe::package_installed(ctx.runner, ctx.family, p))
        })
        // apt/dnf lock contention and mirror hiccups clear up on their own
        .retry(RetryPolicy::new(3, Duration::from_secs(10)))
}

fn install_packages(ctx: &StepContext) -> Result<(), ActionError> {
    let packages = ctx.target.packages.for_family(ctx.family);
    if packages.is_empty() {
        return Ok(());
    }
    let list = packages.join(" ");

    let out = match ctx.family {
        DistroFamily::Debian => ctx.runner.shell(&format!(
            "apt-get update -q && DEBIAN_FRONTEND=noninteractive apt-get install -y -q {}",
            list
        )),
        DistroFamily::Rhel => ctx.runner.shell(&format!("dnf install -y -q {}", list)),
    };

    if !out.success() {
        return Err(ActionError::from_output(
            &format!("package install of [{}]", list),
            &out,
        ));
    }

    ctx.reporter.info(format!("installed packages: {}", list));
    Ok(())
}
