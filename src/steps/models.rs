//! Model pulls, one retry scope per model
//!
//! Each model goes through the retry policy individually, so one model that
//! keeps failing never aborts its siblings. The step itself is
//! warn-and-continue: a partial pull is worth reporting, not worth stopping
//! the run for.

use std::time::Duration;

use crate::engine::{Step, StepContext};
use crate::progress::PullProgress;
use crate::retry::{ActionError, RetryPolicy, run_with_retry};

fn pull_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(5))
}

pub fn step() -> Step {
    Step::new("model-pulls", pull_all)
        .precondition(|ctx| {
            let listing = list_output(ctx);
            ctx.target
                .models
                .iter()
                .all(|m| listed(&listing, m))
        })
        // per-model retries happen inside the action
        .retry(RetryPolicy::once())
        .warn_and_continue()
}

fn pull_all(ctx: &StepContext) -> Result<(), ActionError> {
    let models = &ctx.target.models;
    if models.is_empty() {
        return Ok(());
    }

    let listing = list_output(ctx);
    let progress = PullProgress::new(models.len() as u64);
    let mut failed: Vec<String> = Vec::new();

    for model in models {
        progress.start_model(model);
        if listed(&listing, model) {
            ctx.reporter
                .info(format!("model '{}' already present", model));
            progress.finish_model();
            continue;
        }

        let result = run_with_retry(
            &pull_policy(),
            ctx.reporter,
            &format!("pull of model '{}'", model),
            || {
                // Pulls run as the daemon account so models land in its store
                let out = ctx.runner.run_as(
                    &ctx.target.daemon.user,
                    &ctx.target.daemon.binary,
                    &["pull", model],
                );
                if out.success() {
                    Ok(())
                } else {
                    Err(ActionError::from_output(
                        &format!("pull of model '{}'", model),
                        &out,
                    ))
                }
            },
        );

        match result {
            Ok(()) => ctx.reporter.info(format!("model '{}' pulled", model)),
            Err(err) => {
                ctx.reporter.warning(format!(
                    "model '{}' failed, continuing with the rest: {}",
                    model, err.diagnostic
                ));
                failed.push(model.clone());
            }
        }
        progress.finish_model();
    }
    progress.finish();

    if failed.is_empty() {
        Ok(())
    } else {
        Err(ActionError::new(format!(
            "{} of {} models failed to pull: {}",
            failed.len(),
            models.len(),
            failed.join(", ")
        )))
    }
}

fn list_output(ctx: &StepContext) -> String {
    ctx.runner
        .run(&ctx.target.daemon.binary, &["list"])
        .stdout
}

/// Does a `list` output line name this model, with or without a tag
fn listed(listing: &str, model: &str) -> bool {
    listing.lines().any(|line| {
        line.split_whitespace()
            .next()
            .is_some_and(|name| name == model || name.strip_prefix(model).is_some_and(|rest| rest.starts_with(':')))
    })
}
