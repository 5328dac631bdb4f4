//! Top-level subcommands.

use clap::Subcommand;

use crate::config_commands::ConfigCommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Check which GPU the runtime provides (advisory, always exits 0)
    CheckGpu {
        /// Model name expected in the utility's report
        #[arg(long)]
        expected_model: Option<String>,
        /// GPU management utility to query
        #[arg(long)]
        utility: Option<String>,
    },
    /// Check the external tools provisioning needs
    CheckDeps,
    /// Print the provisioning steps without running them
    Plan {
        /// Print the steps as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the GPU and run every provisioning step
    Run,
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}
