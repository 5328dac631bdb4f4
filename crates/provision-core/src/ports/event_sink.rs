//! Provisioning event sink.
//!
//! Services in core do no terminal I/O. Progress is reported as
//! [`ProvisionEvent`]s and adapters decide how to present them.

use crate::gpu::GpuStatus;
use crate::plan::{SkipWhen, StepCommand, StepKind};

/// Something that happened during a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    /// The runtime prober classified the host.
    GpuChecked { status: GpuStatus, message: String },
    /// A step is about to run.
    StepStarted { kind: StepKind, description: String },
    /// A command of the current step is about to run.
    CommandStarted { kind: StepKind, command: StepCommand },
    /// A step was skipped because its result already exists.
    StepSkipped { kind: StepKind, reason: SkipWhen },
    /// A step finished successfully.
    StepFinished { kind: StepKind },
}

/// Receiver for provisioning events.
pub trait ProvisionEventSink {
    fn emit(&self, event: &ProvisionEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl ProvisionEventSink for NoopEventSink {
    fn emit(&self, _event: &ProvisionEvent) {}
}
