//! System probe implementation for provision-runtime.
//!
//! This module provides the `DefaultSystemProbe` which implements
//! `GpuProbePort` from provision-core. It performs active system probing
//! via PATH lookup and command execution.

mod commands;
mod gpu;

use std::path::{Path, PathBuf};

use provision_core::{
    Dependency, DependencyStatus, GpuProbePort, ProbeError, ProvisionConfig, ProvisionPlan,
    SearchPath, tool_requirements,
};

pub use commands::{get_command_version, locate, parse_version, probe_version};
pub use gpu::read_device_report;

/// Default implementation of `GpuProbePort`.
///
/// Construct it in the CLI's main.rs and pass it to handlers that need
/// host information.
///
/// # Example
///
/// ```ignore
/// use provision_runtime::DefaultSystemProbe;
/// use provision_core::{GpuCheck, SearchPath, probe_gpu};
///
/// let probe = DefaultSystemProbe::new();
/// let status = probe_gpu(&probe, &GpuCheck::default(), &SearchPath::from_env());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSystemProbe;

impl DefaultSystemProbe {
    /// Create a new default system probe.
    pub const fn new() -> Self {
        Self
    }

    /// Check every tool `plan` invokes against the plan's search path.
    pub fn check_tools(&self, config: &ProvisionConfig, plan: &ProvisionPlan) -> Vec<Dependency> {
        let search_path = &plan.context.search_path;
        tool_requirements(plan, &config.gpu)
            .into_iter()
            .map(|dep| {
                let status = probe_version(&dep.name, search_path)
                    .map_or(DependencyStatus::Missing, |version| {
                        DependencyStatus::Present { version }
                    });
                dep.with_status(status)
            })
            .collect()
    }
}

impl GpuProbePort for DefaultSystemProbe {
    fn locate_utility(&self, utility: &str, search_path: &SearchPath) -> Option<PathBuf> {
        locate(utility, search_path)
    }

    fn device_report(&self, utility: &Path) -> Result<String, ProbeError> {
        read_device_report(utility)
    }
}
