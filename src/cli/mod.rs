//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - provision: Provision command arguments
//! - check: Check command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod check;
pub mod completions;
pub mod provision;

pub use check::CheckArgs;
pub use completions::CompletionsArgs;
pub use provision::ProvisionArgs;

/// hostprep - idempotent provisioning for model-serving hosts
///
/// Installs and wires together a model-serving daemon and a web console on a
/// supported Linux host, safely re-runnable at any time.
#[derive(Parser, Debug)]
#[command(
    name = "hostprep",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Idempotent provisioning for self-hosted model-serving hosts",
    long_about = "hostprep provisions a Linux host with a model-serving daemon and a web \
                  console: service accounts, prerequisite packages, model pulls, the systemd \
                  unit, and the external port redirect. Every step checks the host first, so \
                  re-running a converged host changes nothing.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  hostprep provision                     \x1b[90m# Provision using ./hostprep.yaml\x1b[0m\n   \
                  hostprep provision --dry-run           \x1b[90m# Show what would run, change nothing\x1b[0m\n   \
                  hostprep provision -c host.yaml --yes  \x1b[90m# Non-interactive with explicit descriptor\x1b[0m\n   \
                  hostprep check                         \x1b[90m# Report which steps are already satisfied\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the host against a target descriptor
    Provision(ProvisionArgs),

    /// Report which steps are already satisfied, without acting
    Check(CheckArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parsing_provision() {
        let cli = Cli::try_parse_from(["hostprep", "provision"]).unwrap();
        match cli.command {
            Commands::Provision(args) => {
                assert_eq!(args.config, None);
                assert!(!args.dry_run);
                assert!(!args.yes);
                assert!(!args.json);
            }
            _ => panic!("Expected Provision command"),
        }
    }

    #[test]
    fn test_cli_parsing_provision_with_options() {
        let cli = Cli::try_parse_from([
            "hostprep",
            "provision",
            "-c",
            "/etc/hostprep/host.yaml",
            "--dry-run",
            "--yes",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Provision(args) => {
                assert_eq!(args.config, Some(PathBuf::from("/etc/hostprep/host.yaml")));
                assert!(args.dry_run);
                assert!(args.yes);
                assert!(args.json);
            }
            _ => panic!("Expected Provision command"),
        }
    }

    #[test]
    fn test_cli_parsing_check() {
        let cli = Cli::try_parse_from(["hostprep", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["hostprep", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["hostprep", "completions", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "zsh");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
