//! Core domain types and ports for provision.
//!
//! This crate holds everything that does not spawn processes: GPU
//! classification, the scoped search path, configuration, the provisioning
//! plan, and the services that drive the ports. OS adapters live in
//! `provision-runtime`; the CLI wires them together.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod gpu;
pub mod marker;
pub mod plan;
pub mod ports;
pub mod search_path;
pub mod services;
pub mod tools;

// Re-export commonly used types for convenience
pub use config::{
    ConfigError, EnvironmentConfig, LibrariesConfig, PackageManagerConfig, ProvisionConfig,
    RepositoryConfig, ToolsConfig, default_config_path, validate_config, validate_gpu_check,
};
pub use gpu::{GpuCheck, GpuStatus};
pub use marker::EnvMarker;
pub use plan::{ExecContext, ProvisionPlan, SkipWhen, Step, StepCommand, StepKind};
pub use ports::{
    GpuProbePort, NoopEventSink, ProbeError, ProvisionEvent, ProvisionEventSink, StepError,
    StepRunnerPort,
};
pub use search_path::{SearchPath, SearchPathError};
pub use services::{
    ProvisionError, ProvisionReport, Provisioner, StepOutcome, StepState, dry_run, probe_gpu,
};
pub use tools::{Dependency, DependencyStatus, tool_requirements};
