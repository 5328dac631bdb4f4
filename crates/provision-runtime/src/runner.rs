//! Process runner for provisioning commands.
//!
//! Each command is resolved on the plan's search path and spawned with that
//! search path as its `PATH`. Output from the child is forwarded line by line
//! above a spinner so the raw tool output stays visible.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use provision_core::{ExecContext, StepCommand, StepError, StepRunnerPort};
use tracing::debug;

use crate::system::locate;

/// Runs provisioning commands as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessStepRunner {
    /// Hide the spinner. Output lines are still forwarded.
    quiet: bool,
}

impl ProcessStepRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn spinner(&self, command: &StepCommand) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(command.command_line());
        pb
    }
}

impl StepRunnerPort for ProcessStepRunner {
    fn run(&self, command: &StepCommand, context: &ExecContext) -> Result<(), StepError> {
        let program = locate(&command.program, &context.search_path).ok_or_else(|| {
            StepError::ProgramNotFound {
                program: command.program.clone(),
            }
        })?;
        let path_value = context.search_path.to_os_string()?;

        debug!(program = %program.display(), "Running {}", command.command_line());

        let mut cmd = Command::new(&program);
        cmd.args(&command.args)
            .env("PATH", path_value)
            .envs(context.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| StepError::Spawn {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;

        let pb = self.spinner(command);
        let (tx, rx) = mpsc::channel();

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, tx);
        } else {
            drop(tx);
        }

        // Disconnects once both readers hit EOF.
        loop {
            match rx.recv_timeout(Duration::from_millis(100)) {
                // A hidden bar drops println output, e.g. when stderr is not a tty.
                Ok(line) if pb.is_hidden() => println!("{line}"),
                Ok(line) => pb.println(line),
                Err(mpsc::RecvTimeoutError::Timeout) => pb.tick(),
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        let status = child.wait().map_err(|e| StepError::Spawn {
            program: command.program.clone(),
            reason: e.to_string(),
        })?;
        pb.finish_and_clear();

        if status.success() {
            Ok(())
        } else {
            Err(StepError::Failed {
                program: command.program.clone(),
                code: status.code(),
            })
        }
    }
}

/// Forward `stream` line by line until EOF.
///
/// The pipe is always drained, even when a line is not UTF-8 or the
/// receiver is gone, so the child never writes into a closed pipe.
fn forward_lines<R: Read + Send + 'static>(stream: R, tx: mpsc::Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut forwarding = true;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if forwarding {
                let line = String::from_utf8_lossy(&buf);
                forwarding = tx
                    .send(line.trim_end_matches(['\n', '\r']).to_string())
                    .is_ok();
            }
        }
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use provision_core::SearchPath;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn context(dirs: &[&std::path::Path]) -> ExecContext {
        ExecContext {
            search_path: SearchPath::new(dirs.iter().map(|d| d.to_path_buf())),
            env: vec![("PROVISION_TEST_VAR".to_string(), "scoped".into())],
        }
    }

    fn write_script(dir: &std::path::Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_missing_program() {
        let temp = TempDir::new().unwrap();
        let runner = ProcessStepRunner::new().quiet(true);
        let err = runner
            .run(&StepCommand::new("nope"), &context(&[temp.path()]))
            .unwrap_err();
        assert!(matches!(err, StepError::ProgramNotFound { .. }));
    }

    #[test]
    fn test_success_and_failure_codes() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "ok", "exit 0");
        write_script(temp.path(), "bad", "echo broken >&2\nexit 3");
        let runner = ProcessStepRunner::new().quiet(true);
        let ctx = context(&[temp.path()]);

        assert!(runner.run(&StepCommand::new("ok"), &ctx).is_ok());
        let err = runner.run(&StepCommand::new("bad"), &ctx).unwrap_err();
        assert!(matches!(err, StepError::Failed { code: Some(3), .. }));
    }

    #[test]
    fn test_non_utf8_output_does_not_break_the_pipe() {
        let temp = TempDir::new().unwrap();
        write_script(
            temp.path(),
            "noisy",
            "printf '\\377\\n'\nhead -c 262144 /dev/zero | tr '\\0' a\necho done\nexit 0",
        );
        let runner = ProcessStepRunner::new().quiet(true);
        let ctx = ExecContext {
            search_path: SearchPath::from_env().prefixed(temp.path()),
            env: Vec::new(),
        };

        assert!(runner.run(&StepCommand::new("noisy"), &ctx).is_ok());
    }

    #[test]
    fn test_forward_lines_replaces_invalid_utf8() {
        let (tx, rx) = mpsc::channel();
        forward_lines(&b"caf\xe9\r\nsecond"[..], tx);
        let lines: Vec<String> = rx.iter().collect();
        assert_eq!(lines, vec!["caf\u{fffd}".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_child_sees_scoped_path_and_env() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out.txt");
        write_script(
            temp.path(),
            "record",
            &format!(
                "/bin/echo \"$PATH|$PROVISION_TEST_VAR|$1\" > '{}'",
                out.display()
            ),
        );
        let runner = ProcessStepRunner::new().quiet(true);

        runner
            .run(
                &StepCommand::new("record").arg("first arg"),
                &context(&[temp.path()]),
            )
            .unwrap();

        let recorded = fs::read_to_string(&out).unwrap();
        assert_eq!(
            recorded.trim(),
            format!("{}|scoped|first arg", temp.path().display())
        );
    }
}
