//! Core services built on the ports.

pub mod prober;
pub mod provisioner;

pub use prober::probe_gpu;
pub use provisioner::{
    ProvisionError, ProvisionReport, Provisioner, StepOutcome, StepState, dry_run,
};
