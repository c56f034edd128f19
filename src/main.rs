//! hostprep - idempotent provisioning for model-serving hosts
//!
//! A command line tool that installs and wires together a model-serving
//! daemon and a web console on a supported Linux host: service accounts,
//! prerequisite packages, model pulls, the systemd unit, and the external
//! port redirect. Safe to re-run; converged hosts are left untouched.

use clap::Parser;

mod cli;
mod commands;
mod engine;
mod error;
mod exec;
mod probe;
mod progress;
mod report;
mod retry;
mod scratch;
mod steps;
mod target;

use cli::{Cli, Commands};
use error::{HostprepError, Result};

/// Check that the process runs with superuser privilege
fn check_superuser() -> Result<()> {
    let out = exec::Runner::new().run("id", &["-u"]);
    if out.stdout.trim() != "0" {
        return Err(HostprepError::SuperuserRequired);
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Only a mutating provision run needs root; check, completions, and
    // dry runs work for any user
    let needs_root = matches!(&cli.command, Commands::Provision(args) if !args.dry_run);

    if needs_root {
        if let Err(e) = check_superuser() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Provision(args) => commands::provision::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
