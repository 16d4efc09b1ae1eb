use thiserror::Error;

/// Failure to run an external command to a usable completion.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("`{command}` timed out after {seconds}s")]
    TimedOut { command: String, seconds: u64 },
}

/// Captured result of one external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful invocation with the given stdout.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed invocation with the given exit code and stderr.
    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Converts a non-zero exit into `CommandError::Failed`, carrying the
    /// rendered command line and the captured stderr.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Failed` when the command exited non-zero.
    pub fn require_success(self, command: &str) -> Result<Self, CommandError> {
        if self.success {
            Ok(self)
        } else {
            Err(CommandError::Failed {
                command: command.to_owned(),
                code: self.code,
                stderr: self.stderr.trim_end().to_owned(),
            })
        }
    }
}

/// Single command-execution capability every probe goes through, so tests
/// can substitute a scripted fake for the real system tools.
pub trait CommandRunner: Send + Sync {
    /// Runs the program to completion and captures its output. A non-zero
    /// exit is reported through `CommandOutput`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Spawn` when the process cannot be started and
    /// `CommandError::TimedOut` when it outlives the runner's bound.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// Renders a program and its arguments as a single display line for logs
/// and error messages.
#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
