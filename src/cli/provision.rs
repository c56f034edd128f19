use clap::Parser;
use std::path::PathBuf;

/// Arguments for the provision command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Provision with the default descriptor search:\n    hostprep provision\n\n\
                   Preview without touching the host:\n    hostprep provision --dry-run\n\n\
                   Unattended run with a machine-readable report:\n    hostprep provision --yes --json")]
pub struct ProvisionArgs {
    /// Target descriptor (defaults to ./hostprep.yaml, then user config, then /etc/hostprep)
    #[arg(long, short = 'c', value_name = "FILE", env = "HOSTPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Evaluate preconditions and show the plan without acting
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
