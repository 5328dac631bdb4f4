//! Check GPU handler.
//!
//! Advisory only: the classification is printed and the command succeeds
//! whatever the host provides.

use anyhow::Result;
use provision_core::{GpuStatus, Provisioner, validate_gpu_check};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::ConsoleEventSink;

/// Execute the check-gpu command.
///
/// `expected_model` and `utility` override the configured values for this
/// invocation.
pub fn execute(
    ctx: &CliContext,
    expected_model: Option<String>,
    utility: Option<String>,
) -> Result<GpuStatus> {
    let mut config = ctx.config.clone();
    if let Some(model) = expected_model {
        config.gpu.expected_model = model;
    }
    if let Some(utility) = utility {
        config.gpu.utility = utility;
    }
    // Only the GPU settings matter here.
    validate_gpu_check(&config.gpu).map_err(|e| CliError::Arguments(e.to_string()))?;

    let status =
        Provisioner::new(&config, &ctx.probe, &ctx.runner, &ConsoleEventSink).check_gpu(&ctx.plan);
    Ok(status)
}
