//! Runtime prober.
//!
//! Locates the GPU utility, reads its device report and classifies the host.
//! The outcome is advisory: it never fails and never stops provisioning.

use tracing::{debug, warn};

use crate::gpu::{GpuCheck, GpuStatus};
use crate::ports::GpuProbePort;
use crate::search_path::SearchPath;

/// Classify the host's accelerator.
///
/// A utility that is found but fails to report counts as present with an
/// empty report, so the host classifies as [`GpuStatus::PresentOther`].
pub fn probe_gpu(
    probe: &dyn GpuProbePort,
    check: &GpuCheck,
    search_path: &SearchPath,
) -> GpuStatus {
    let Some(utility) = probe.locate_utility(&check.utility, search_path) else {
        debug!(utility = %check.utility, "GPU utility not found on search path");
        return GpuStatus::Absent;
    };

    debug!(utility = %utility.display(), "Querying GPU utility");
    let report = probe.device_report(&utility).unwrap_or_else(|e| {
        warn!("GPU utility did not produce a report: {e}");
        String::new()
    });

    GpuStatus::classify(Some(&report), &check.expected_model)
}
