//! Provisioning configuration.
//!
//! Configuration comes from three layers, later layers winning:
//! 1. built-in defaults ([`ProvisionConfig::default`])
//! 2. an optional JSON file (`--config` or `<config_dir>/provision/config.json`)
//! 3. `PROVISION_*` environment variables
//!
//! All fields carry `#[serde(default)]` so partial files are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gpu::GpuCheck;

/// Default Miniconda installer for x86_64 Linux runtimes.
pub const DEFAULT_INSTALLER_URL: &str =
    "https://repo.anaconda.com/miniconda/Miniconda3-latest-Linux-x86_64.sh";

/// Where the installer script is downloaded to.
pub const DEFAULT_INSTALLER_PATH: &str = "/tmp/miniconda.sh";

/// Install prefix for the package manager.
pub const DEFAULT_PREFIX: &str = "/usr/local/miniconda";

pub const DEFAULT_ENV_NAME: &str = "ml";
pub const DEFAULT_PYTHON_VERSION: &str = "3.10";

/// Dataset cache directory exported to every step.
pub const DEFAULT_CACHE_DIR: &str = "/content/new_hf_cache";

/// Config file name inside the per-user config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable names recognised as overrides.
pub mod env_keys {
    pub const EXPECTED_GPU: &str = "PROVISION_EXPECTED_GPU";
    pub const GPU_UTILITY: &str = "PROVISION_GPU_UTILITY";
    pub const REPO_URL: &str = "PROVISION_REPO_URL";
    pub const CONDA_PREFIX: &str = "PROVISION_CONDA_PREFIX";
    pub const ENV_NAME: &str = "PROVISION_ENV_NAME";
    pub const CACHE_DIR: &str = "PROVISION_CACHE_DIR";
}

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write config file {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Config file already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("Environment name cannot be empty")]
    EmptyEnvironmentName,

    #[error("Environment name must not contain whitespace or path separators, got {0:?}")]
    InvalidEnvironmentName(String),

    #[error("Python version cannot be empty")]
    EmptyPythonVersion,

    #[error("Package manager prefix must be an absolute path, got {0}")]
    RelativePrefix(PathBuf),

    #[error("Expected GPU model cannot be empty")]
    EmptyExpectedModel,

    #[error("GPU utility name cannot be empty")]
    EmptyUtility,

    #[error("Repository URL cannot be empty")]
    EmptyRepositoryUrl,

    #[error("Empty package name in {0}")]
    EmptyPackageName(&'static str),
}

/// External repository to clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Clone URL.
    pub url: String,
    /// Checkout directory. Defaults to the last URL segment without `.git`.
    #[serde(default)]
    pub destination: Option<PathBuf>,
    /// Branch or tag to check out.
    #[serde(default)]
    pub branch: Option<String>,
    /// Clone with `--depth 1`.
    #[serde(default)]
    pub shallow: bool,
}

impl RepositoryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
            branch: None,
            shallow: false,
        }
    }

    /// Effective checkout directory.
    pub fn effective_destination(&self) -> PathBuf {
        if let Some(dest) = &self.destination {
            return dest.clone();
        }
        let trimmed = self.url.trim_end_matches('/');
        let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
        let name = last.strip_suffix(".git").unwrap_or(last);
        if name.is_empty() {
            PathBuf::from("repository")
        } else {
            PathBuf::from(name)
        }
    }
}

/// Package-manager bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// URL of the installer shell script.
    pub installer_url: String,
    /// Local path the installer is downloaded to.
    pub installer_path: PathBuf,
    /// Installation prefix. `<prefix>/bin` is prefixed onto the search path.
    pub prefix: PathBuf,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            installer_url: DEFAULT_INSTALLER_URL.to_string(),
            installer_path: PathBuf::from(DEFAULT_INSTALLER_PATH),
            prefix: PathBuf::from(DEFAULT_PREFIX),
        }
    }
}

impl PackageManagerConfig {
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Path of the `conda` executable once bootstrapped.
    pub fn conda_path(&self) -> PathBuf {
        self.bin_dir().join("conda")
    }

    /// Root directory of a named environment.
    pub fn env_dir(&self, name: &str) -> PathBuf {
        self.prefix.join("envs").join(name)
    }
}

/// Python environment to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub python_version: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ENV_NAME.to_string(),
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
        }
    }
}

/// Deep-learning libraries installed through the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrariesConfig {
    pub channels: Vec<String>,
    pub packages: Vec<String>,
}

impl Default for LibrariesConfig {
    fn default() -> Self {
        Self {
            channels: vec!["pytorch".to_string(), "nvidia".to_string()],
            packages: vec![
                "pytorch".to_string(),
                "torchvision".to_string(),
                "torchaudio".to_string(),
                "pytorch-cuda=12.1".to_string(),
            ],
        }
    }
}

/// Extra tooling installed with the language package installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub packages: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            packages: vec!["datasets".to_string(), "transformers".to_string()],
        }
    }
}

/// Complete provisioning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    pub gpu: GpuCheck,
    pub repository: Option<RepositoryConfig>,
    pub package_manager: PackageManagerConfig,
    pub environment: EnvironmentConfig,
    pub libraries: LibrariesConfig,
    pub tools: ToolsConfig,
    /// Dataset cache directory created before the steps run.
    pub cache_dir: Option<PathBuf>,
    /// Skip steps whose results are already present.
    pub skip_existing: bool,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            gpu: GpuCheck::default(),
            repository: None,
            package_manager: PackageManagerConfig::default(),
            environment: EnvironmentConfig::default(),
            libraries: LibrariesConfig::default(),
            tools: ToolsConfig::default(),
            cache_dir: Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            skip_existing: true,
        }
    }
}

/// Per-user default location of the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("provision").join(CONFIG_FILE_NAME))
}

impl ProvisionConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load from an explicit path, or from the default location when present.
    ///
    /// An explicit path must exist. A missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Write this config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<(), ConfigError> {
        if path.exists() && !overwrite {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let write_err = |e: &dyn std::fmt::Display| ConfigError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(&e))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| write_err(&e))?;
        fs::write(path, content + "\n").map_err(|e| write_err(&e))
    }

    /// Apply `PROVISION_*` overrides from `lookup`, usually the process
    /// environment.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get(env_keys::EXPECTED_GPU) {
            self.gpu.expected_model = model;
        }
        if let Some(utility) = get(env_keys::GPU_UTILITY) {
            self.gpu.utility = utility;
        }
        if let Some(url) = get(env_keys::REPO_URL) {
            self.set_repository_url(url);
        }
        if let Some(prefix) = get(env_keys::CONDA_PREFIX) {
            self.package_manager.prefix = PathBuf::from(prefix);
        }
        if let Some(name) = get(env_keys::ENV_NAME) {
            self.environment.name = name;
        }
        if let Some(dir) = get(env_keys::CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Set the repository URL, keeping other repository settings.
    pub fn set_repository_url(&mut self, url: String) {
        match &mut self.repository {
            Some(repo) => repo.url = url,
            None => self.repository = Some(RepositoryConfig::new(url)),
        }
    }
}

/// Validate the GPU check alone.
///
/// The advisory check only needs these two values, so it does not fail on
/// problems elsewhere in the config.
pub fn validate_gpu_check(gpu: &GpuCheck) -> Result<(), ConfigError> {
    if gpu.expected_model.trim().is_empty() {
        return Err(ConfigError::EmptyExpectedModel);
    }
    if gpu.utility.trim().is_empty() {
        return Err(ConfigError::EmptyUtility);
    }
    Ok(())
}

/// Validate configuration values.
pub fn validate_config(config: &ProvisionConfig) -> Result<(), ConfigError> {
    validate_gpu_check(&config.gpu)?;

    let name = &config.environment.name;
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyEnvironmentName);
    }
    if name.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(ConfigError::InvalidEnvironmentName(name.clone()));
    }
    if config.environment.python_version.trim().is_empty() {
        return Err(ConfigError::EmptyPythonVersion);
    }

    if !config.package_manager.prefix.is_absolute() {
        return Err(ConfigError::RelativePrefix(
            config.package_manager.prefix.clone(),
        ));
    }

    if let Some(repo) = &config.repository {
        if repo.url.trim().is_empty() {
            return Err(ConfigError::EmptyRepositoryUrl);
        }
    }

    if config.libraries.packages.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::EmptyPackageName("libraries"));
    }
    if config.libraries.channels.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigError::EmptyPackageName("library channels"));
    }
    if config.tools.packages.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::EmptyPackageName("tools"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProvisionConfig::default();
        assert!(validate_config(&config).is_ok());
        assert!(config.skip_existing);
        assert!(config.repository.is_none());
        assert_eq!(config.gpu.expected_model, "A100");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ProvisionConfig =
            serde_json::from_str(r#"{"environment": {"name": "course"}}"#).unwrap();
        assert_eq!(config.environment.name, "course");
        assert_eq!(config.environment.python_version, DEFAULT_PYTHON_VERSION);
        assert_eq!(config.package_manager, PackageManagerConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let mut config = ProvisionConfig::default();
        config.set_repository_url("https://github.com/example/course.git".to_string());
        config.save(&path, false).unwrap();

        let loaded = ProvisionConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_refuses_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        ProvisionConfig::default().save(&path, false).unwrap();

        let err = ProvisionConfig::default().save(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
        assert!(ProvisionConfig::default().save(&path, true).is_ok());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let err = ProvisionConfig::load(Some(Path::new("/nonexistent/provision.json")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ProvisionConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env_keys::EXPECTED_GPU, "T4"),
            (env_keys::REPO_URL, "https://github.com/example/labs"),
            (env_keys::CONDA_PREFIX, "/opt/conda"),
            (env_keys::ENV_NAME, ""),
        ]);

        let mut config = ProvisionConfig::default();
        config.apply_overrides_from(|k| vars.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.gpu.expected_model, "T4");
        assert_eq!(config.package_manager.prefix, PathBuf::from("/opt/conda"));
        assert_eq!(config.environment.name, DEFAULT_ENV_NAME);
        assert_eq!(
            config.repository.unwrap().url,
            "https://github.com/example/labs"
        );
    }

    #[test]
    fn test_repo_override_keeps_branch() {
        let mut config = ProvisionConfig::default();
        config.repository = Some(RepositoryConfig {
            branch: Some("main".to_string()),
            ..RepositoryConfig::new("https://old")
        });
        config.set_repository_url("https://new".to_string());

        let repo = config.repository.unwrap();
        assert_eq!(repo.url, "https://new");
        assert_eq!(repo.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_effective_destination() {
        let repo = RepositoryConfig::new("https://github.com/example/course.git");
        assert_eq!(repo.effective_destination(), PathBuf::from("course"));

        let repo = RepositoryConfig::new("git@github.com:example/labs/");
        assert_eq!(repo.effective_destination(), PathBuf::from("labs"));

        let mut repo = RepositoryConfig::new("https://github.com/example/course");
        repo.destination = Some(PathBuf::from("/content/course"));
        assert_eq!(repo.effective_destination(), PathBuf::from("/content/course"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ProvisionConfig::default();
        config.environment.name = "  ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::EmptyEnvironmentName)
        ));

        let mut config = ProvisionConfig::default();
        config.environment.name = "my env".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidEnvironmentName(_))
        ));

        let mut config = ProvisionConfig::default();
        config.package_manager.prefix = PathBuf::from("miniconda");
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::RelativePrefix(_))
        ));

        let mut config = ProvisionConfig::default();
        config.gpu.expected_model = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::EmptyExpectedModel)
        ));

        let mut config = ProvisionConfig::default();
        config.tools.packages.push(String::new());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::EmptyPackageName("tools"))
        ));
    }

    #[test]
    fn test_gpu_check_ignores_other_sections() {
        let mut config = ProvisionConfig::default();
        config.package_manager.prefix = PathBuf::from("relative");
        config.environment.name = String::new();
        assert!(validate_gpu_check(&config.gpu).is_ok());

        config.gpu.utility = " ".to_string();
        assert!(matches!(
            validate_gpu_check(&config.gpu),
            Err(ConfigError::EmptyUtility)
        ));
    }

    #[test]
    fn test_package_manager_paths() {
        let pm = PackageManagerConfig::default();
        assert_eq!(pm.bin_dir(), PathBuf::from("/usr/local/miniconda/bin"));
        assert_eq!(pm.conda_path(), PathBuf::from("/usr/local/miniconda/bin/conda"));
        assert_eq!(pm.env_dir("ml"), PathBuf::from("/usr/local/miniconda/envs/ml"));
    }
}
