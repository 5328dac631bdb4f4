//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. Config layers are resolved here, the plan is built
//! from the process `PATH`, and the runtime adapters are instantiated.

use std::io::IsTerminal;
use std::path::PathBuf;

use provision_core::{ProvisionConfig, ProvisionPlan, SearchPath, validate_config};
use provision_runtime::{DefaultSystemProbe, ProcessStepRunner};
use tracing::{debug, warn};

use crate::error::CliError;
use crate::parser::Cli;

/// Per-invocation overrides taken from the global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit config file.
    pub config_path: Option<PathBuf>,
    pub repo: Option<String>,
    pub prefix: Option<PathBuf>,
    pub env_name: Option<String>,
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            repo: cli.repo.clone(),
            prefix: cli.prefix.clone(),
            env_name: cli.env_name.clone(),
        }
    }

    /// Resolve the effective configuration.
    ///
    /// Layers, later winning: file, `lookup` (the `PROVISION_*` variables),
    /// then the CLI flags. The result is validated.
    pub fn resolve<F>(&self, lookup: F) -> Result<ProvisionConfig, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ProvisionConfig::load(self.config_path.as_deref())?;
        self.apply(&mut config, lookup);
        validate_config(&config)?;
        Ok(config)
    }

    /// Resolve without failing on config problems.
    ///
    /// An unreadable file falls back to defaults and nothing is validated.
    /// Used by the advisory GPU check, which must not fail because of
    /// settings it does not read.
    pub fn resolve_lenient<F>(&self, lookup: F) -> ProvisionConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ProvisionConfig::load(self.config_path.as_deref()).unwrap_or_else(|e| {
            warn!("Ignoring config file: {e}");
            ProvisionConfig::default()
        });
        self.apply(&mut config, lookup);
        config
    }

    fn apply<F>(&self, config: &mut ProvisionConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        config.apply_overrides_from(lookup);

        if let Some(url) = &self.repo {
            config.set_repository_url(url.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.package_manager.prefix.clone_from(prefix);
        }
        if let Some(name) = &self.env_name {
            config.environment.name.clone_from(name);
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub config: ProvisionConfig,
    pub plan: ProvisionPlan,
    pub probe: DefaultSystemProbe,
    pub runner: ProcessStepRunner,
}

/// Compose the CLI context from the process environment.
pub fn bootstrap(cli_config: &CliConfig) -> Result<CliContext, CliError> {
    let config = cli_config.resolve(|key| std::env::var(key).ok())?;
    Ok(compose(config, &SearchPath::from_env()))
}

/// Compose the context for the advisory GPU check. Never fails.
pub fn bootstrap_lenient(cli_config: &CliConfig) -> CliContext {
    let config = cli_config.resolve_lenient(|key| std::env::var(key).ok());
    compose(config, &SearchPath::from_env())
}

/// Build the context for `config` on top of `base_path`.
pub fn compose(config: ProvisionConfig, base_path: &SearchPath) -> CliContext {
    let plan = ProvisionPlan::from_config(&config, base_path);
    debug!(
        steps = plan.steps.len(),
        search_path = %plan.context.search_path,
        "Built provisioning plan"
    );

    CliContext {
        config,
        plan,
        probe: DefaultSystemProbe::new(),
        // Spinner only on a terminal. Output is printed either way.
        runner: ProcessStepRunner::new().quiet(!std::io::stderr().is_terminal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provision_core::{ConfigError, StepKind};
    use std::fs;
    use tempfile::TempDir;

    fn empty_file(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("config.json");
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_flags_override_env_and_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"environment": {"name": "from-file"}}"#).unwrap();

        let cli = CliConfig {
            config_path: Some(path),
            env_name: Some("from-flag".to_string()),
            ..CliConfig::default()
        };
        let config = cli
            .resolve(|key| (key == "PROVISION_ENV_NAME").then(|| "from-env".to_string()))
            .unwrap();
        assert_eq!(config.environment.name, "from-flag");
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let cli = CliConfig {
            config_path: Some(empty_file(&temp)),
            ..CliConfig::default()
        };
        let config = cli
            .resolve(|key| (key == "PROVISION_EXPECTED_GPU").then(|| "H100".to_string()))
            .unwrap();
        assert_eq!(config.gpu.expected_model, "H100");
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let temp = TempDir::new().unwrap();
        let cli = CliConfig {
            config_path: Some(empty_file(&temp)),
            prefix: Some(PathBuf::from("relative/conda")),
            ..CliConfig::default()
        };
        let err = cli.resolve(|_| None).unwrap_err();
        assert_eq!(err.exit_code(), 78);
        assert_eq!(
            err.to_string(),
            format!(
                "Configuration error: {}",
                ConfigError::RelativePrefix(PathBuf::from("relative/conda"))
            )
        );
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = CliConfig {
            config_path: Some(PathBuf::from("/nonexistent/provision.json")),
            ..CliConfig::default()
        };
        assert!(matches!(cli.resolve(|_| None), Err(CliError::Config(_))));
    }

    #[test]
    fn test_lenient_resolve_tolerates_unrelated_problems() {
        let cli = CliConfig {
            config_path: Some(PathBuf::from("/nonexistent/provision.json")),
            ..CliConfig::default()
        };
        let config = cli.resolve_lenient(|key| match key {
            "PROVISION_CONDA_PREFIX" => Some("relative".to_string()),
            "PROVISION_EXPECTED_GPU" => Some("H100".to_string()),
            _ => None,
        });
        assert_eq!(config.gpu.expected_model, "H100");
        assert_eq!(config.package_manager.prefix, PathBuf::from("relative"));
    }

    #[test]
    fn test_repo_flag_adds_clone_step() {
        let temp = TempDir::new().unwrap();
        let cli = CliConfig {
            config_path: Some(empty_file(&temp)),
            repo: Some("https://example.com/course.git".to_string()),
            ..CliConfig::default()
        };
        let config = cli.resolve(|_| None).unwrap();
        let ctx = compose(config, &SearchPath::default());
        assert_eq!(ctx.plan.steps[0].kind, StepKind::CloneRepository);
    }
}
