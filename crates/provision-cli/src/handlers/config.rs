//! Config command handler.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use provision_core::{ProvisionConfig, default_config_path};

use crate::bootstrap::CliConfig;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
///
/// `show` prints the effective configuration, after env and flag overrides.
/// `init` writes the defaults to `--config` or the per-user location.
pub fn execute(cli_config: &CliConfig, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let config = cli_config.resolve(|key| std::env::var(key).ok())?;
            let rendered =
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{rendered}");
            Ok(())
        }
        ConfigCommand::Init { force } => {
            let path = target_path(cli_config)?;
            init_config(&path, force)?;
            println!("✓ Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

fn target_path(cli_config: &CliConfig) -> Result<PathBuf, CliError> {
    cli_config
        .config_path
        .clone()
        .or_else(default_config_path)
        .ok_or_else(|| {
            CliError::Config("No config directory on this system; pass --config".to_string())
        })
}

/// Write the default configuration to `path`.
pub fn init_config(path: &Path, force: bool) -> Result<(), CliError> {
    ProvisionConfig::default().save(path, force)?;
    Ok(())
}
