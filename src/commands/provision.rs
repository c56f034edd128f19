//! Provision command implementation
//!
//! The full workflow run:
//! 1. Locate and load the target descriptor
//! 2. Detect the distro and reject unsupported hosts before any mutation
//! 3. Confirm with the operator (unless --yes)
//! 4. Run the step sequencer to its terminal state
//! 5. Surface the failing step verbatim on a fatal abort

use console::Style;

use crate::cli::ProvisionArgs;
use crate::engine::{self, RunStatus, StepContext, StepStatus};
use crate::error::{Result, step_aborted};
use crate::exec::Runner;
use crate::report::Reporter;
use crate::scratch;
use crate::steps;
use crate::target::{InstallationTarget, distro};

pub fn run(args: ProvisionArgs) -> Result<()> {
    let path = InstallationTarget::locate(args.config.as_deref())?;
    let target = InstallationTarget::load(&path)?;
    let host = distro::detect()?;
    let family = distro::ensure_supported(&host)?;

    let runner = Runner::new();
    let reporter = Reporter::new();
    let ctx = StepContext {
        target: &target,
        family,
        runner: &runner,
        reporter: &reporter,
    };
    let workflow = steps::workflow(&target);

    if args.dry_run {
        println!(
            "Plan for {} {} ({} steps, descriptor {}):",
            host.id,
            host.version_id,
            workflow.len(),
            path.display()
        );
        super::check::print_plan(&engine::plan(&workflow, &ctx));
        return Ok(());
    }

    if !args.yes {
        let prompt = format!(
            "Provision {} {} ({} steps)? This modifies system state.",
            host.id,
            host.version_id,
            workflow.len()
        );
        let proceed = inquire::Confirm::new(&prompt).with_default(false).prompt()?;
        if !proceed {
            reporter.info("nothing done, operator declined");
            return Ok(());
        }
    }

    scratch::install_interrupt_cleanup();
    reporter.info(format!(
        "provisioning {} {} with descriptor {}",
        host.id,
        host.version_id,
        path.display()
    ));

    let report = engine::run(&workflow, &ctx);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match report.status {
        RunStatus::CompletedFully => {
            print_summary(&report.records);
            Ok(())
        }
        RunStatus::Aborted { step, reason } => Err(step_aborted(step, reason)),
    }
}

fn print_summary(records: &[engine::StepRecord]) {
    let count = |status: StepStatus| records.iter().filter(|r| r.status == status).count();
    let skipped = count(StepStatus::Skipped);
    let succeeded = count(StepStatus::Succeeded) + count(StepStatus::SucceededViaFallback);
    let tolerated = count(StepStatus::FailedRecoverable);

    let mut line = format!(
        "Provisioning complete: {} changed, {} already satisfied",
        succeeded, skipped
    );
    if tolerated > 0 {
        line.push_str(&format!(", {} failed non-fatally", tolerated));
    }
    println!("{}", Style::new().bold().green().apply_to(line));
}
