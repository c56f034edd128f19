//! The provisioning workflow definition
//!
//! One parametrized step list for every supported target; the descriptor
//! decides the variants (account policy, package sets), not duplicated
//! step bodies.

pub mod accounts;
pub mod daemon;
pub mod firewall;
pub mod models;
pub mod packages;
pub mod unit;
pub mod webui;

use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::ActionError;
use crate::target::{InstallationTarget, WebUiAccount};

/// Assemble the ordered workflow for a target
///
/// Later steps depend on the side effects of earlier ones (accounts before
/// ownership changes, daemon before model pulls), so the order is fixed.
pub fn workflow(target: &InstallationTarget) -> Vec<Step> {
    let mut steps = Vec::new();

    if target.webui.account == WebUiAccount::Dedicated {
        steps.push(accounts::step());
    }
    steps.push(packages::step());
    steps.push(daemon::install_step());
    steps.push(daemon::service_step());
    steps.push(models::step());
    steps.push(webui::step());
    steps.push(unit::step());
    steps.push(firewall::step());

    steps
}

/// Bounded probe-and-sleep wait for a TCP endpoint
pub(crate) fn wait_reachable(
    ctx: &StepContext,
    host: &str,
    port: u16,
    max_probes: u32,
    interval: Duration,
) -> Result<(), ActionError> {
    for probe_count in 1..=max_probes {
        if probe::tcp_reachable(host, port, Duration::from_secs(1)) {
            ctx.reporter
                .info(format!("{}:{} is reachable", host, port));
            return Ok(());
        }
        if probe_count < max_probes {
            std::thread::sleep(interval);
        }
    }

    Err(ActionError::new(format!(
        "{}:{} not reachable after {} probes",
        host, port, max_probes
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Criticality;

    #[test]
    fn test_workflow_order_for_dedicated_account() {
        let target = crate::target::example();
        let names: Vec<String> = workflow(&target)
            .iter()
            .map(|s| s.name().to_string())
            .collect();

        assert_eq!(
            names,
            [
                "service-account",
                "prerequisite-packages",
                "model-daemon",
                "daemon-service",
                "model-pulls",
                "web-console",
                "service-unit",
                "firewall-redirect",
            ]
        );
    }

    #[test]
    fn test_workflow_skips_account_step_for_daemon_policy() {
        let mut target = crate::target::example();
        target.webui.account = WebUiAccount::Daemon;
        let steps = workflow(&target);

        assert!(steps.iter().all(|s| s.name() != "service-account"));
        assert_eq!(steps.len(), 7);
    }

    #[test]
    fn test_only_expected_steps_tolerate_failure() {
        let target = crate::target::example();
        let tolerated: Vec<String> = workflow(&target)
            .iter()
            .filter(|s| s.criticality() == Criticality::WarnAndContinue)
            .map(|s| s.name().to_string())
            .collect();

        assert_eq!(tolerated, vec!["model-pulls", "firewall-redirect"]);
    }
}
