//! Plan handler: a dry run that prints what `run` would execute.

use anyhow::{Context, Result};

use crate::bootstrap::CliContext;
use crate::presentation::print_plan;

/// Execute the plan command.
pub fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(&ctx.plan.steps)
            .context("Failed to serialize the plan")?;
        println!("{rendered}");
    } else {
        println!("Search path: {}\n", ctx.plan.context.search_path);
        print_plan(&ctx.plan);
    }
    Ok(())
}
