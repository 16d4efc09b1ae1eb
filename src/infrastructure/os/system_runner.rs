use std::process::Command;
use std::sync::mpsc;
use std::time::Duration;

use tracing::debug;

use crate::domain::ports::command::{command_line, CommandError, CommandOutput, CommandRunner};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs external commands via `std::process::Command` with a bounded
/// execution time, so a hung device cannot hang the whole pass.
///
/// The child is waited on from a helper thread and the result is received
/// through a channel; stdout/stderr pipes are owned by `output()` and
/// released when the process exits. On timeout the child is abandoned.
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let rendered = command_line(program, args);
        debug!("running command: {rendered}");

        let mut command = Command::new(program);
        command.args(args);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // The receiver may have timed out and dropped; ignore send errors.
            let _ = tx.send(command.output());
        });

        match rx.recv_timeout(self.timeout) {
            Ok(Ok(output)) => Ok(CommandOutput {
                success: output.status.success(),
                code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(source)) => Err(CommandError::Spawn {
                command: rendered,
                source,
            }),
            Err(_) => Err(CommandError::TimedOut {
                command: rendered,
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}
