//! GPU utility invocation.
//!
//! Runs the vendor utility with no arguments and returns its standard
//! output as the device report.

use std::path::Path;
use std::process::Command;

use provision_core::ProbeError;

/// Run `utility` and capture its report.
pub fn read_device_report(utility: &Path) -> Result<String, ProbeError> {
    let output = Command::new(utility)
        .output()
        .map_err(|e| ProbeError::Spawn {
            utility: utility.to_path_buf(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            utility: utility.to_path_buf(),
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
