//! Provisioning service.
//!
//! Runs a [`ProvisionPlan`] against the injected ports: GPU check first
//! (advisory), then every step in order. The first failing command halts
//! the run.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ProvisionConfig;
use crate::gpu::GpuStatus;
use crate::marker::EnvMarker;
use crate::plan::{ProvisionPlan, SkipWhen, Step, StepKind};
use crate::ports::{GpuProbePort, ProvisionEvent, ProvisionEventSink, StepError, StepRunnerPort};
use crate::services::prober::probe_gpu;

/// Errors that stop a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to create cache directory {path}: {reason}")]
    CacheDir { path: PathBuf, reason: String },

    #[error("Step '{kind}' failed: {source}")]
    Step {
        kind: StepKind,
        #[source]
        source: StepError,
    },

    #[error("Failed to write environment marker {path}: {reason}")]
    Marker { path: PathBuf, reason: String },
}

/// Whether a step ran or was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Ran,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub kind: StepKind,
    pub state: StepState,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub gpu: GpuStatus,
    pub steps: Vec<StepOutcome>,
}

impl ProvisionReport {
    pub fn ran(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.steps
            .iter()
            .filter(|s| s.state == StepState::Ran)
            .map(|s| s.kind)
    }
}

/// Orchestrates a provisioning run.
pub struct Provisioner<'a> {
    config: &'a ProvisionConfig,
    probe: &'a dyn GpuProbePort,
    runner: &'a dyn StepRunnerPort,
    events: &'a dyn ProvisionEventSink,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &'a ProvisionConfig,
        probe: &'a dyn GpuProbePort,
        runner: &'a dyn StepRunnerPort,
        events: &'a dyn ProvisionEventSink,
    ) -> Self {
        Self {
            config,
            probe,
            runner,
            events,
        }
    }

    /// Run the GPU check alone and report it.
    pub fn check_gpu(&self, plan: &ProvisionPlan) -> GpuStatus {
        let status = probe_gpu(self.probe, &self.config.gpu, &plan.context.search_path);
        self.events.emit(&ProvisionEvent::GpuChecked {
            status,
            message: status.message(&self.config.gpu.expected_model),
        });
        status
    }

    /// Execute `plan`.
    pub fn run(&self, plan: &ProvisionPlan) -> Result<ProvisionReport, ProvisionError> {
        let gpu = self.check_gpu(plan);
        info!(%gpu, "GPU check complete");

        if let Some(cache) = &plan.cache_dir {
            fs::create_dir_all(cache).map_err(|e| ProvisionError::CacheDir {
                path: cache.clone(),
                reason: e.to_string(),
            })?;
        }

        // Evaluated before any step: installs earlier in this run must not
        // make later ones look fresh. A recreated environment has none of
        // the marker's packages, so it clears the flag.
        let mut env_ready = plan.skip_existing && EnvMarker::is_fresh(self.config);

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            let state = if let Some(reason) = Self::skip_reason(plan, step, env_ready) {
                debug!(kind = %step.kind, %reason, "Skipping step");
                self.events.emit(&ProvisionEvent::StepSkipped {
                    kind: step.kind,
                    reason: reason.clone(),
                });
                StepState::Skipped
            } else {
                self.run_step(plan, step)?;
                if step.kind == StepKind::CreateEnvironment {
                    env_ready = false;
                }
                StepState::Ran
            };
            steps.push(StepOutcome {
                kind: step.kind,
                state,
            });
        }

        let report = ProvisionReport { gpu, steps };
        if report.ran().any(StepKind::installs_packages) {
            self.write_marker()?;
        }
        Ok(report)
    }

    fn skip_reason<'s>(
        plan: &ProvisionPlan,
        step: &'s Step,
        env_ready: bool,
    ) -> Option<&'s SkipWhen> {
        if !plan.skip_existing {
            return None;
        }
        let condition = step.skip_when.as_ref()?;
        let holds = match condition {
            SkipWhen::PathExists(path) => path.exists(),
            SkipWhen::EnvironmentReady => env_ready,
        };
        holds.then_some(condition)
    }

    fn run_step(&self, plan: &ProvisionPlan, step: &Step) -> Result<(), ProvisionError> {
        info!(kind = %step.kind, "{}", step.description);
        self.events.emit(&ProvisionEvent::StepStarted {
            kind: step.kind,
            description: step.description.clone(),
        });

        for command in &step.commands {
            self.events.emit(&ProvisionEvent::CommandStarted {
                kind: step.kind,
                command: command.clone(),
            });
            self.runner
                .run(command, &plan.context)
                .map_err(|source| ProvisionError::Step {
                    kind: step.kind,
                    source,
                })?;
        }

        self.events
            .emit(&ProvisionEvent::StepFinished { kind: step.kind });
        Ok(())
    }

    fn write_marker(&self) -> Result<(), ProvisionError> {
        let path = EnvMarker::path_for(self.config);
        EnvMarker::current(self.config)
            .write(&path)
            .map_err(|e| ProvisionError::Marker {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!("Wrote environment marker {}", path.display());
        Ok(())
    }
}

/// Rendered command lines for a dry run, grouped by step.
pub fn dry_run(plan: &ProvisionPlan) -> Vec<(StepKind, Vec<String>)> {
    plan.render()
}
