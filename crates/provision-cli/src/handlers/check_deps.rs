//! Check tools handler.
//!
//! Lists the external tools the plan invokes, resolved on the plan's search
//! path, and fails when a required one is missing.

use anyhow::Result;
use provision_core::Dependency;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{BLUE, BOLD, GREEN, RED, RESET, print_dependency};

/// Execute the check-deps command.
///
/// Returns an error if any required tool is missing.
pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("{BOLD}{BLUE}Checking provisioning tools...{RESET}\n");
    println!(
        "{}{:<20} {:<15} {:<50}{}",
        BOLD, "TOOL", "STATUS", "NOTES", RESET
    );
    println!("{}", "=".repeat(85));

    let dependencies = ctx.probe.check_tools(&ctx.config, &ctx.plan);
    for dep in &dependencies {
        print_dependency(dep);
    }

    println!("{}", "=".repeat(85));

    let missing = missing_required(&dependencies);
    if missing.is_empty() {
        let total = dependencies.iter().filter(|d| d.required).count();
        println!("{GREEN}✓ All required tools are installed!{RESET} ({total}/{total})");
        return Ok(());
    }

    println!("{RED}✗ Missing required tools:{RESET}");
    for dep in dependencies
        .iter()
        .filter(|d| d.required && d.is_missing())
    {
        match &dep.install_hint {
            Some(hint) => println!("  {} ({hint})", dep.name),
            None => println!("  {}", dep.name),
        }
    }
    Err(CliError::MissingTools(missing).into())
}

fn missing_required(dependencies: &[Dependency]) -> Vec<String> {
    dependencies
        .iter()
        .filter(|d| d.required && d.is_missing())
        .map(|d| d.name.clone())
        .collect()
}
