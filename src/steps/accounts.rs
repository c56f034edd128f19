//! Dedicated service account for the web console
//!
//! Only part of the workflow when the descriptor's account policy is
//! `dedicated`; the `daemon` policy reuses the account the daemon installer
//! creates.

use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::probe;
use crate::retry::{ActionError, RetryPolicy};

pub fn step() -> Step {
    Step::new("service-account", create_account)
        .precondition(|ctx| {
            probe::user_exists(ctx.runner, &ctx.target.webui.user)
                && probe::group_exists(ctx.runner, &ctx.target.webui.group)
        })
        .retry(RetryPolicy::new(2, Duration::from_secs(2)).terminal_by_default())
}

fn create_account(ctx: &StepContext) -> Result<(), ActionError> {
    let user = &ctx.target.webui.user;
    let group = &ctx.target.webui.group;
    let home = ctx.target.data_dir.display().to_string();

    if !probe::group_exists(ctx.runner, group) {
        let out = ctx.runner.run("groupadd", &["--system", group]);
        if !out.success() {
            return Err(ActionError::from_output(
                &format!("groupadd {}", group),
                &out,
            ));
        }
    }

    if !probe::user_exists(ctx.runner, user) {
        let out = ctx.runner.run(
            "useradd",
            &[
                "--system",
                "--gid",
                group,
                "--home-dir",
                &home,
                "--no-create-home",
                "--shell",
                "/usr/sbin/nologin",
                user,
            ],
        );
        if !out.success() {
            return Err(ActionError::from_output(&format!("useradd {}", user), &out));
        }
    }

    ctx.reporter
        .info(format!("created system account {}:{}", user, group));
    Ok(())
}
