//! Run handler: GPU check followed by every provisioning step.

use anyhow::Result;
use provision_core::{ProvisionReport, Provisioner, StepState};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{ConsoleEventSink, GREEN, RESET};

/// Execute the run command.
pub fn execute(ctx: &CliContext) -> Result<ProvisionReport> {
    let provisioner = Provisioner::new(&ctx.config, &ctx.probe, &ctx.runner, &ConsoleEventSink);
    let report = provisioner.run(&ctx.plan).map_err(CliError::from)?;

    let ran = report.ran().count();
    let skipped = report
        .steps
        .iter()
        .filter(|s| s.state == StepState::Skipped)
        .count();
    println!("\n{GREEN}✓ Provisioning complete{RESET} ({ran} ran, {skipped} skipped)");
    Ok(report)
}
