//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the GPU runtime provisioner.
///
/// Global options override the config file and `PROVISION_*` variables for
/// this invocation only.
#[derive(Parser)]
#[command(name = "provision")]
#[command(about = "Check the GPU runtime and provision a conda environment")]
#[command(version)]
pub struct Cli {
    /// Config file to load instead of the per-user default
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Repository to clone before provisioning
    #[arg(long = "repo", global = true, value_name = "URL")]
    pub repo: Option<String>,

    /// Install prefix for the package manager
    #[arg(long = "prefix", global = true, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Name of the environment to create
    #[arg(long = "env-name", global = true, value_name = "NAME")]
    pub env_name: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
