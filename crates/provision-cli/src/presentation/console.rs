//! Event sink that writes provisioning progress to the terminal.

use provision_core::{ProvisionEvent, ProvisionEventSink};

use super::{BLUE, BOLD, DIM, GREEN, RESET, YELLOW};

/// Prints provisioning events to stdout.
///
/// The GPU message is printed verbatim and alone on its line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleEventSink;

impl ConsoleEventSink {
    /// Render `event` as the line printed for it.
    pub fn render(event: &ProvisionEvent) -> String {
        match event {
            ProvisionEvent::GpuChecked { message, .. } => message.clone(),
            ProvisionEvent::StepStarted { kind, description } => {
                format!("{BOLD}{BLUE}==> {kind}{RESET} {description}")
            }
            ProvisionEvent::CommandStarted { command, .. } => {
                format!("{DIM}$ {}{RESET}", command.command_line())
            }
            ProvisionEvent::StepSkipped { kind, reason } => {
                format!("{YELLOW}○ {kind} skipped ({reason}){RESET}")
            }
            ProvisionEvent::StepFinished { kind } => format!("{GREEN}✓ {kind}{RESET}"),
        }
    }
}

impl ProvisionEventSink for ConsoleEventSink {
    fn emit(&self, event: &ProvisionEvent) {
        println!("{}", Self::render(event));
    }
}
