//! Table output for `check-deps` and `plan`.

use provision_core::{Dependency, DependencyStatus, ProvisionPlan, StepKind, dry_run};

use super::{BOLD, DIM, GREEN, RED, RESET, YELLOW};

/// Print a single dependency row in the status table.
pub fn print_dependency(dep: &Dependency) {
    println!("{}", dependency_row(dep));
}

fn dependency_row(dep: &Dependency) -> String {
    let status_str = match &dep.status {
        DependencyStatus::Present { version } => {
            if version.is_empty() {
                format!("{GREEN}✓ installed{RESET}")
            } else {
                format!("{GREEN}✓ v{version}{RESET}")
            }
        }
        DependencyStatus::Missing => {
            if dep.required {
                format!("{RED}✗ missing{RESET}")
            } else {
                format!("{YELLOW}○ missing{RESET}")
            }
        }
    };

    let req_indicator = if dep.required {
        format!("{RED}*{RESET}")
    } else {
        " ".to_string()
    };

    format!(
        "{}{:<19} {:<25} {}",
        req_indicator, dep.name, status_str, dep.description
    )
}

/// Print the steps of `plan` with their command lines.
pub fn print_plan(plan: &ProvisionPlan) {
    for (index, (step, (kind, lines))) in plan.steps.iter().zip(dry_run(plan)).enumerate() {
        println!("{BOLD}{}. {kind}{RESET}", index + 1);
        println!("   {}", step.description);
        for line in lines {
            println!("   $ {line}");
        }
        if let Some(skip) = &step.skip_when {
            println!("   {DIM}skipped when {skip}{RESET}");
        }
    }
    if !plan.steps.iter().any(|s| s.kind == StepKind::CloneRepository) {
        println!("{DIM}No repository configured; pass --repo to clone one.{RESET}");
    }
}
