//! GPU classification types.
//!
//! The runtime prober reduces the host's accelerator state to one of three
//! outcomes. Classification is a plain substring check against the device
//! report printed by the vendor utility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default GPU management utility queried on the search path.
pub const DEFAULT_GPU_UTILITY: &str = "nvidia-smi";

/// Default model identifier expected in the device report.
pub const DEFAULT_EXPECTED_MODEL: &str = "A100";

/// Accelerator state of the current host.
///
/// Computed once per run and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpuStatus {
    /// The GPU utility is not on the search path.
    Absent,
    /// The device report names the expected model.
    PresentMatching,
    /// A GPU utility answered, but the expected model is not in its report.
    PresentOther,
}

impl GpuStatus {
    /// Classify a device report.
    ///
    /// `None` means the utility could not be located. The match is a
    /// case-sensitive containment check.
    pub fn classify(report: Option<&str>, expected_model: &str) -> Self {
        match report {
            None => Self::Absent,
            Some(text) if text.contains(expected_model) => Self::PresentMatching,
            Some(_) => Self::PresentOther,
        }
    }

    /// The single line printed for this status.
    pub fn message(self, expected_model: &str) -> String {
        match self {
            Self::Absent => "⚠️ No GPU detected. Enable a GPU accelerator in the runtime settings (Runtime > Change runtime type).".to_string(),
            Self::PresentMatching => format!("✅ {expected_model} GPU detected."),
            Self::PresentOther => format!(
                "⚠️ A GPU is active, but it is not an {expected_model}. Switch the runtime accelerator to {expected_model} if available."
            ),
        }
    }
}

impl fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::PresentMatching => "present_matching",
            Self::PresentOther => "present_other",
        };
        f.write_str(s)
    }
}

/// What the prober looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuCheck {
    /// Executable name of the GPU management utility.
    pub utility: String,
    /// Substring that identifies the expected model in the device report.
    pub expected_model: String,
}

impl Default for GpuCheck {
    fn default() -> Self {
        Self {
            utility: DEFAULT_GPU_UTILITY.to_string(),
            expected_model: DEFAULT_EXPECTED_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A100_REPORT: &str = "\
+-----------------------------------------------------------------------------+
| NVIDIA-SMI 535.104.05   Driver Version: 535.104.05   CUDA Version: 12.2     |
|   0  NVIDIA A100-SXM4-40GB          Off | 00000000:00:04.0 Off |          0 |
+-----------------------------------------------------------------------------+";

    const T4_REPORT: &str = "\
|   0  Tesla T4                       Off | 00000000:00:04.0 Off |          0 |";

    #[test]
    fn test_classify_absent() {
        assert_eq!(GpuStatus::classify(None, "A100"), GpuStatus::Absent);
    }

    #[test]
    fn test_classify_matching() {
        assert_eq!(
            GpuStatus::classify(Some(A100_REPORT), "A100"),
            GpuStatus::PresentMatching
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            GpuStatus::classify(Some(T4_REPORT), "A100"),
            GpuStatus::PresentOther
        );
        assert_eq!(GpuStatus::classify(Some(""), "A100"), GpuStatus::PresentOther);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(
            GpuStatus::classify(Some("nvidia a100"), "A100"),
            GpuStatus::PresentOther
        );
    }

    #[test]
    fn test_messages_are_distinct() {
        let absent = GpuStatus::Absent.message("A100");
        let matching = GpuStatus::PresentMatching.message("A100");
        let other = GpuStatus::PresentOther.message("A100");

        assert!(absent.contains("No GPU detected"));
        assert_eq!(matching, "✅ A100 GPU detected.");
        assert!(other.contains("not an A100"));
        assert!(!matching.contains('⚠'));
    }

    #[test]
    fn test_display_uses_snake_case() {
        assert_eq!(GpuStatus::PresentOther.to_string(), "present_other");
        assert_eq!(
            serde_json::to_string(&GpuStatus::PresentMatching).unwrap(),
            "\"present_matching\""
        );
    }
}
