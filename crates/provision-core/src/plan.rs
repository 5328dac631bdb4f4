//! Provisioning plan.
//!
//! A [`ProvisionPlan`] is the fixed, ordered list of external invocations
//! derived from a [`ProvisionConfig`]. Building a plan has no side effects;
//! executing it is the provisioner's job.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::ProvisionConfig;
use crate::search_path::SearchPath;

/// Dataset cache variable set for every step.
pub const DATASETS_CACHE_VAR: &str = "HF_DATASETS_CACHE";
/// Dataset logging variable set for every step.
pub const DATASETS_VERBOSITY_VAR: &str = "DATASETS_VERBOSITY";

/// The kinds of provisioning steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    CloneRepository,
    BootstrapPackageManager,
    CreateEnvironment,
    InstallLibraries,
    InstallTools,
}

impl StepKind {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CloneRepository => "clone repository",
            Self::BootstrapPackageManager => "bootstrap package manager",
            Self::CreateEnvironment => "create environment",
            Self::InstallLibraries => "install libraries",
            Self::InstallTools => "install tools",
        }
    }

    /// Whether this step writes into the environment the marker describes.
    pub const fn installs_packages(self) -> bool {
        matches!(self, Self::InstallLibraries | Self::InstallTools)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One external invocation with a fixed argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl StepCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for display and dry runs.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().map(|a| quote(a.as_str())));
        parts.join(" ")
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@+,".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Condition under which a step is considered already done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipWhen {
    /// The path exists on disk.
    PathExists(PathBuf),
    /// The environment marker matches the current configuration.
    EnvironmentReady,
}

impl fmt::Display for SkipWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathExists(path) => write!(f, "{} exists", path.display()),
            Self::EnvironmentReady => f.write_str("environment marker is fresh"),
        }
    }
}

/// A provisioning step: one or more commands run in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub description: String,
    pub commands: Vec<StepCommand>,
    pub skip_when: Option<SkipWhen>,
}

/// Execution context shared by every step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecContext {
    /// Search path used both to resolve programs and as the child `PATH`.
    pub search_path: SearchPath,
    /// Extra environment variables for child processes.
    pub env: Vec<(String, OsString)>,
}

/// Ordered list of steps plus the context they run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub steps: Vec<Step>,
    pub context: ExecContext,
    /// Directory created before any step runs.
    pub cache_dir: Option<PathBuf>,
    /// Whether skip conditions are honoured.
    pub skip_existing: bool,
}

impl ProvisionPlan {
    /// Build the plan for `config`.
    ///
    /// `base_path` is the search path before the package manager exists. The
    /// package manager's `bin` directory is prefixed onto it for every step.
    pub fn from_config(config: &ProvisionConfig, base_path: &SearchPath) -> Self {
        let pm = &config.package_manager;
        let env_name = &config.environment.name;
        let mut steps = Vec::with_capacity(5);

        if let Some(repo) = &config.repository {
            let destination = repo.effective_destination();
            let mut clone = StepCommand::new("git").arg("clone");
            if let Some(branch) = &repo.branch {
                clone = clone.arg("--branch").arg(branch);
            }
            if repo.shallow {
                clone = clone.args(["--depth", "1"]);
            }
            clone = clone.arg(&repo.url).arg(destination.to_string_lossy());

            steps.push(Step {
                kind: StepKind::CloneRepository,
                description: format!("Clone {} into {}", repo.url, destination.display()),
                commands: vec![clone],
                skip_when: Some(SkipWhen::PathExists(destination.join(".git"))),
            });
        }

        steps.push(Step {
            kind: StepKind::BootstrapPackageManager,
            description: format!("Install package manager into {}", pm.prefix.display()),
            commands: vec![
                StepCommand::new("curl")
                    .arg("-fsSL")
                    .arg("-o")
                    .arg(pm.installer_path.to_string_lossy())
                    .arg(&pm.installer_url),
                StepCommand::new("bash")
                    .arg(pm.installer_path.to_string_lossy())
                    .args(["-b", "-u", "-p"])
                    .arg(pm.prefix.to_string_lossy()),
            ],
            skip_when: Some(SkipWhen::PathExists(pm.conda_path())),
        });

        steps.push(Step {
            kind: StepKind::CreateEnvironment,
            description: format!(
                "Create environment {env_name} (python {})",
                config.environment.python_version
            ),
            commands: vec![
                StepCommand::new("conda")
                    .args(["create", "-y", "-q", "-n"])
                    .arg(env_name)
                    .arg(format!("python={}", config.environment.python_version)),
            ],
            skip_when: Some(SkipWhen::PathExists(
                pm.env_dir(env_name).join("bin").join("python"),
            )),
        });

        if !config.libraries.packages.is_empty() {
            let mut install = StepCommand::new("conda")
                .args(["install", "-y", "-q", "-n"])
                .arg(env_name);
            for channel in &config.libraries.channels {
                install = install.arg("-c").arg(channel);
            }
            install = install.args(&config.libraries.packages);

            steps.push(Step {
                kind: StepKind::InstallLibraries,
                description: format!("Install {}", config.libraries.packages.join(", ")),
                commands: vec![install],
                skip_when: Some(SkipWhen::EnvironmentReady),
            });
        }

        if !config.tools.packages.is_empty() {
            steps.push(Step {
                kind: StepKind::InstallTools,
                description: format!("Install {}", config.tools.packages.join(", ")),
                commands: vec![
                    StepCommand::new("conda")
                        .args(["run", "-n"])
                        .arg(env_name)
                        .args(["python", "-m", "pip", "install", "--upgrade"])
                        .args(&config.tools.packages),
                ],
                skip_when: Some(SkipWhen::EnvironmentReady),
            });
        }

        let mut env = Vec::new();
        if let Some(cache) = &config.cache_dir {
            env.push((DATASETS_CACHE_VAR.to_string(), cache.clone().into_os_string()));
            env.push((DATASETS_VERBOSITY_VAR.to_string(), OsString::from("error")));
        }

        Self {
            steps,
            context: ExecContext {
                search_path: base_path.prefixed(pm.bin_dir()),
                env,
            },
            cache_dir: config.cache_dir.clone(),
            skip_existing: config.skip_existing,
        }
    }

    pub fn step(&self, kind: StepKind) -> Option<&Step> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Rendered command lines, one entry per step.
    pub fn render(&self) -> Vec<(StepKind, Vec<String>)> {
        self.steps
            .iter()
            .map(|s| (s.kind, s.commands.iter().map(StepCommand::command_line).collect()))
            .collect()
    }
}
