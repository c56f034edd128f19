//! External→internal port redirect
//!
//! A NAT PREROUTING redirect, persisted through the family's rule-saving
//! mechanism. Warn-and-continue: without the redirect the console still
//! answers on the internal port.

use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};
use crate::target::distro::DistroFamily;

pub fn step() -> Step {
    Step::new("firewall-redirect", redirect_and_persist)
        .precondition(|ctx| {
            probe::nat_redirect_present(ctx.runner, ctx.target.ports.external, ctx.target.ports.internal)
        })
        .fallback(redirect_and_dump)
        .retry(RetryPolicy::new(2, Duration::from_secs(2)).terminal_by_default())
        .warn_and_continue()
}

fn redirect_and_persist(ctx: &StepContext) -> Result<(), ActionError> {
    ensure_rule(ctx)?;

    let out = match ctx.family {
        DistroFamily::Debian => ctx.runner.run("netfilter-persistent", &["save"]),
        DistroFamily::Rhel => ctx.runner.shell("iptables-save > /etc/sysconfig/iptables"),
    };
    if !out.success() {
        return Err(ActionError::from_output("firewall rule persistence", &out));
    }

    ctx.reporter.info(format!(
        "redirecting tcp port {} to {}",
        ctx.target.ports.external, ctx.target.ports.internal
    ));
    Ok(())
}

/// Persistence helper missing or broken: dump the table to the family's
/// rules file directly
fn redirect_and_dump(ctx: &StepContext) -> Result<(), ActionError> {
    ensure_rule(ctx)?;

    let rules_file = match ctx.family {
        DistroFamily::Debian => "/etc/iptables/rules.v4",
        DistroFamily::Rhel => "/etc/sysconfig/iptables",
    };
    let out = ctx
        .runner
        .shell(&format!("mkdir -p $(dirname {0}) && iptables-save > {0}", rules_file));
    if !out.success() {
        return Err(ActionError::from_output("iptables-save dump", &out));
    }
    Ok(())
}

/// Add the redirect unless it is already in the table; keeps the fallback
/// from duplicating a rule the primary already added
fn ensure_rule(ctx: &StepContext) -> Result<(), ActionError> {
    let ports = ctx.target.ports;
    if probe::nat_redirect_present(ctx.runner, ports.external, ports.internal) {
        return Ok(());
    }

    let external = ports.external.to_string();
    let internal = ports.internal.to_string();
    let out = ctx.runner.run(
        "iptables",
        &[
            "-t",
            "nat",
            "-A",
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
    );
    if !out.success() {
        return Err(ActionError::from_output("iptables redirect rule", &out));
    }
    Ok(())
}
