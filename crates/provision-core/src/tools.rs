//! External tool requirements.
//!
//! The preflight check lists the programs a plan invokes. Which programs are
//! needed is derived from the plan itself, so a plan without a clone step
//! does not ask for `git`.

use crate::gpu::GpuCheck;
use crate::plan::ProvisionPlan;

/// Represents the status of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyStatus {
    /// Tool is on the search path.
    Present { version: String },
    /// Tool is missing.
    Missing,
}

/// Information about an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Executable name (e.g., "git", "curl").
    pub name: String,
    /// Current status of the tool.
    pub status: DependencyStatus,
    /// What the tool is used for.
    pub description: String,
    /// Whether provisioning needs it before it starts.
    pub required: bool,
    /// Installation instructions or hints.
    pub install_hint: Option<String>,
}

impl Dependency {
    /// Create a new required dependency.
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DependencyStatus::Missing,
            description: description.into(),
            required: true,
            install_hint: None,
        }
    }

    /// Create a new optional dependency.
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    /// Set installation hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = Some(hint.into());
        self
    }

    /// Set the status of this dependency.
    #[must_use]
    pub fn with_status(mut self, status: DependencyStatus) -> Self {
        self.status = status;
        self
    }

    pub const fn is_missing(&self) -> bool {
        matches!(self.status, DependencyStatus::Missing)
    }
}

/// Programs invoked by `plan`, in first-use order, plus the GPU utility.
///
/// `conda` is optional because the bootstrap step installs it.
pub fn tool_requirements(plan: &ProvisionPlan, gpu: &GpuCheck) -> Vec<Dependency> {
    let mut seen: Vec<&str> = Vec::new();
    for step in &plan.steps {
        for command in &step.commands {
            if !seen.contains(&command.program.as_str()) {
                seen.push(&command.program);
            }
        }
    }

    let mut deps: Vec<Dependency> = seen.into_iter().map(describe_tool).collect();
    deps.push(
        Dependency::optional(gpu.utility.clone(), "GPU detection (advisory)")
            .with_hint("Enable a GPU accelerator in the runtime settings"),
    );
    deps
}

fn describe_tool(program: &str) -> Dependency {
    match program {
        "git" => Dependency::required("git", "Clones the course repository")
            .with_hint("apt install git"),
        "curl" => Dependency::required("curl", "Downloads the package manager installer")
            .with_hint("apt install curl"),
        "bash" => Dependency::required("bash", "Runs the package manager installer")
            .with_hint("apt install bash"),
        "conda" => Dependency::optional("conda", "Creates the environment and installs libraries")
            .with_hint("Installed by the bootstrap step of `provision run`"),
        other => Dependency::required(other, "Invoked by a provisioning step"),
    }
}
