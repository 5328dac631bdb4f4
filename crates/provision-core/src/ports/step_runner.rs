//! Step runner port.
//!
//! Executes a single external command with a fixed argument list inside an
//! [`ExecContext`]. Implementations must not retry and must not touch the
//! process-global environment.

use thiserror::Error;

use crate::plan::{ExecContext, StepCommand};
use crate::search_path::SearchPathError;

/// Errors produced when an external command does not succeed.
#[derive(Debug, Error)]
pub enum StepError {
    /// The program is not on the step's search path.
    #[error("{program} not found on the search path")]
    ProgramNotFound { program: String },

    /// The program could not be started.
    #[error("Failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The program exited unsuccessfully.
    #[error("{program} exited with status {}", describe_code(.code))]
    Failed { program: String, code: Option<i32> },

    /// The search path could not be handed to the child.
    #[error(transparent)]
    SearchPath(#[from] SearchPathError),
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Port for executing provisioning commands.
pub trait StepRunnerPort {
    /// Run `command` to completion.
    fn run(&self, command: &StepCommand, context: &ExecContext) -> Result<(), StepError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_includes_code() {
        let err = StepError::Failed {
            program: "conda".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "conda exited with status 1");
    }

    #[test]
    fn test_failed_display_without_code() {
        let err = StepError::Failed {
            program: "bash".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "bash exited with status signal");
    }
}
