//! Environment marker.
//!
//! After libraries and tools install successfully a small JSON file is
//! written inside the environment. On the next run a matching marker lets
//! the install steps be skipped.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProvisionConfig;

/// Marker file name inside the environment directory.
pub const ENV_MARKER_NAME: &str = ".provision-env.json";

/// Record of what was installed into an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvMarker {
    pub tool_version: String,
    pub python_version: String,
    pub libraries: Vec<String>,
    pub tools: Vec<String>,
    pub installed_at: DateTime<Utc>,
}

impl EnvMarker {
    /// Marker describing the current configuration.
    pub fn current(config: &ProvisionConfig) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            python_version: config.environment.python_version.clone(),
            libraries: config.libraries.packages.clone(),
            tools: config.tools.packages.clone(),
            installed_at: Utc::now(),
        }
    }

    /// Whether this marker describes the same installation as `config`.
    ///
    /// `installed_at` is ignored.
    pub fn matches(&self, config: &ProvisionConfig) -> bool {
        self.tool_version == env!("CARGO_PKG_VERSION")
            && self.python_version == config.environment.python_version
            && self.libraries == config.libraries.packages
            && self.tools == config.tools.packages
    }

    /// Marker location for the configured environment.
    pub fn path_for(config: &ProvisionConfig) -> PathBuf {
        config
            .package_manager
            .env_dir(&config.environment.name)
            .join(ENV_MARKER_NAME)
    }

    /// Read a marker. A missing or unreadable marker is `None`.
    pub fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Whether a fresh marker for `config` exists on disk.
    pub fn is_fresh(config: &ProvisionConfig) -> bool {
        Self::read(&Self::path_for(config)).is_some_and(|m| m.matches(config))
    }
}
