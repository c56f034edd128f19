//! Web console service unit
//!
//! The unit is rendered from the descriptor and only written when the
//! installed file differs byte-for-byte, so the skip decision confirms the
//! full desired end-state.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::{wait_reachable, webui};
use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};
use crate::target::InstallationTarget;

const READY_PROBES: u32 = 30;
const READY_INTERVAL: Duration = Duration::from_secs(2);

pub fn step() -> Step {
    Step::new("service-unit", write_and_start)
        .precondition(|ctx| {
            probe::file_matches(&unit_path(ctx.target), &render_unit(ctx.target))
                && probe::service_active(ctx.runner, &ctx.target.webui.service)
                && probe::service_enabled(ctx.runner, &ctx.target.webui.service)
        })
        .retry(RetryPolicy::new(2, Duration::from_secs(5)).terminal_by_default())
}

pub fn unit_path(target: &InstallationTarget) -> PathBuf {
    PathBuf::from("/etc/systemd/system").join(format!("{}.service", target.webui.service))
}

/// Render the declarative unit sections from the descriptor
pub fn render_unit(target: &InstallationTarget) -> String {
    let exec = webui::console_binary(target);
    format!(
        "[Unit]\n\
         Description=Web console for the local model daemon\n\
         After=network-online.target {daemon}.service\n\
         Wants=network-online.target\n\
         \n\
         [Service]\n\
         Type=simple\n\
         User={user}\n\
         Group={group}\n\
         WorkingDirectory={data_dir}\n\
         Environment=DATA_DIR={data_dir}\n\
         Environment=PORT={port}\n\
         Environment=OLLAMA_BASE_URL=http://{daemon_host}:{daemon_port}\n\
         ExecStart={exec} serve\n\
         Restart=on-failure\n\
         RestartSec=5\n\
         \n\
         [Install]\n\
         WantedBy=multi-user.target\n",
        daemon = target.daemon.service,
        user = target.webui_run_user(),
        group = target.webui_run_group(),
        data_dir = target.data_dir.display(),
        port = target.ports.internal,
        daemon_host = target.daemon.host,
        daemon_port = target.daemon.port,
        exec = exec.display(),
    )
}

fn write_and_start(ctx: &StepContext) -> Result<(), ActionError> {
    let path = unit_path(ctx.target);
    let rendered = render_unit(ctx.target);

    fs::write(&path, &rendered)
        .map_err(|e| ActionError::new(format!("write {}: {}", path.display(), e)))?;
    ctx.reporter
        .info(format!("wrote service unit {}", path.display()));

    let reload = ctx.runner.run("systemctl", &["daemon-reload"]);
    if !reload.success() {
        return Err(ActionError::from_output("systemctl daemon-reload", &reload));
    }

    let service = &ctx.target.webui.service;
    let enable = ctx.runner.run("systemctl", &["enable", "--now", service]);
    if !enable.success() {
        return Err(ActionError::from_output(
            &format!("systemctl enable --now {}", service),
            &enable,
        ));
    }

    // Unit changes on an already-running service need an explicit restart
    let restart = ctx.runner.run("systemctl", &["restart", service]);
    if !restart.success() {
        return Err(ActionError::from_output(
            &format!("systemctl restart {}", service),
            &restart,
        ));
    }

    wait_reachable(
        ctx,
        "127.0.0.1",
        ctx.target.ports.internal,
        READY_PROBES,
        READY_INTERVAL,
    )
}
