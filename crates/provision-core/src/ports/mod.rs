//! Port definitions implemented by adapters.

mod event_sink;
mod gpu_probe;
mod step_runner;

pub use event_sink::{NoopEventSink, ProvisionEvent, ProvisionEventSink};
pub use gpu_probe::{GpuProbePort, ProbeError};
pub use step_runner::{StepError, StepRunnerPort};

#[cfg(test)]
pub use gpu_probe::MockGpuProbePort;
