//! Process runtime and OS-level concerns for provision.
//!
//! Implements the ports from `provision-core` against the real host:
//! [`DefaultSystemProbe`] for GPU and tool detection and
//! [`ProcessStepRunner`] for executing provisioning commands.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

mod runner;
pub mod system;

pub use runner::ProcessStepRunner;
pub use system::DefaultSystemProbe;
