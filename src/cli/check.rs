use clap::Parser;
use std::path::PathBuf;

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Target descriptor (defaults to ./hostprep.yaml, then user config, then /etc/hostprep)
    #[arg(long, short = 'c', value_name = "FILE", env = "HOSTPREP_CONFIG")]
    pub config: Option<PathBuf>,
}
