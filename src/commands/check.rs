//! Check command implementation
//!
//! Read-only: evaluates every step's precondition against the live host and
//! reports which steps a provision run would actually execute.

use console::Style;

use crate::cli::CheckArgs;
use crate::engine::{self, PlanEntry, StepContext};
use crate::error::Result;
use crate::exec::Runner;
use crate::report::Reporter;
use crate::steps;
use crate::target::{InstallationTarget, distro};

pub fn run(args: CheckArgs) -> Result<()> {
    let path = InstallationTarget::locate(args.config.as_deref())?;
    let target = InstallationTarget::load(&path)?;
    let host = distro::detect()?;
    let family = distro::ensure_supported(&host)?;

    let runner = Runner::new();
    let reporter = Reporter::silent();
    let ctx = StepContext {
        target: &target,
        family,
        runner: &runner,
        reporter: &reporter,
    };

    let workflow = steps::workflow(&target);
    let entries = engine::plan(&workflow, &ctx);

    println!(
        "Host {} {} against descriptor {}:",
        host.id,
        host.version_id,
        path.display()
    );
    print_plan(&entries);

    let satisfied = entries.iter().filter(|e| e.satisfied).count();
    println!(
        "{}",
        Style::new().bold().apply_to(format!(
            "{} of {} steps already satisfied",
            satisfied,
            entries.len()
        ))
    );

    Ok(())
}

pub(crate) fn print_plan(entries: &[PlanEntry]) {
    for entry in entries {
        if entry.satisfied {
            println!(
                "  {} {} {}",
                Style::new().green().apply_to("✓"),
                entry.step,
                Style::new().dim().apply_to("(satisfied)")
            );
        } else {
            println!(
                "  {} {} {}",
                Style::new().yellow().apply_to("•"),
                entry.step,
                Style::new().dim().apply_to("(would run)")
            );
        }
    }
}
