//! GPU probe port.
//!
//! Abstracts the two host queries the runtime prober needs: locating the
//! GPU management utility and reading its device report.
//!
//! # Design Notes
//!
//! - Core owns the trait and the classification logic
//! - Runtime owns the implementation (PATH lookup and `Command::new`)
//! - CLI injects the probe via main.rs

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::search_path::SearchPath;

/// Errors that can occur while querying the GPU utility.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The utility could not be started.
    #[error("Failed to run {utility}: {reason}")]
    Spawn { utility: PathBuf, reason: String },

    /// The utility ran but reported failure.
    #[error("{utility} exited with status {code:?}")]
    Failed { utility: PathBuf, code: Option<i32> },
}

/// Port for querying GPU presence on the host.
#[cfg_attr(test, mockall::automock)]
pub trait GpuProbePort: Send + Sync {
    /// Locate `utility` on `search_path`. `None` when it is not installed.
    fn locate_utility(&self, utility: &str, search_path: &SearchPath) -> Option<PathBuf>;

    /// Run the located utility and return its textual device report.
    fn device_report(&self, utility: &Path) -> Result<String, ProbeError>;
}
