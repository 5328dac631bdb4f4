//! Integration tests for the runtime prober through the public API.
//!
//! Uses a hand-written probe so the scenarios read like the host states
//! they describe.

use std::path::{Path, PathBuf};

use provision_core::{
    GpuCheck, GpuProbePort, GpuStatus, ProbeError, SearchPath, probe_gpu,
};

/// A host whose GPU utility is either missing or prints a fixed report.
struct FakeHost {
    report: Option<&'static str>,
}

impl GpuProbePort for FakeHost {
    fn locate_utility(&self, utility: &str, _search_path: &SearchPath) -> Option<PathBuf> {
        self.report.map(|_| PathBuf::from("/usr/bin").join(utility))
    }

    fn device_report(&self, _utility: &Path) -> Result<String, ProbeError> {
        Ok(self.report.unwrap_or_default().to_string())
    }
}

fn classify(host: &FakeHost) -> (GpuStatus, String) {
    let check = GpuCheck::default();
    let status = probe_gpu(host, &check, &SearchPath::from_env());
    (status, status.message(&check.expected_model))
}

#[test]
fn test_scenario_utility_absent() {
    let (status, output) = classify(&FakeHost { report: None });

    assert_eq!(status, GpuStatus::Absent);
    assert_eq!(output, GpuStatus::Absent.message("A100"));
    assert!(!output.contains('✅'));
}

#[test]
fn test_scenario_matching_report() {
    let (status, output) = classify(&FakeHost {
        report: Some("GPU 0: NVIDIA A100-SXM4-40GB (UUID: GPU-1234)"),
    });

    assert_eq!(status, GpuStatus::PresentMatching);
    assert_eq!(output, "✅ A100 GPU detected.");
    assert!(!output.contains('⚠'));
}

#[test]
fn test_scenario_other_model() {
    let (status, output) = classify(&FakeHost {
        report: Some("GPU 0: Tesla T4 (UUID: GPU-5678)"),
    });

    assert_eq!(status, GpuStatus::PresentOther);
    assert!(output.starts_with('⚠'));
    assert!(output.contains("A100"));
}

#[test]
fn test_unchanged_host_is_stable() {
    let host = FakeHost {
        report: Some("NVIDIA L4"),
    };
    assert_eq!(classify(&host), classify(&host));
}
