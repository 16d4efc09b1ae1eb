use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::ports::command::{command_line, CommandError, CommandOutput, CommandRunner};

/// Canned response for one scripted command line.
#[derive(Debug, Clone)]
enum Scripted {
    Output(CommandOutput),
    TimedOut { seconds: u64 },
}

/// Scripted command runner for testing purposes.
///
/// Responses are keyed by the rendered command line; every invocation is
/// recorded so tests can assert which commands ran (and, for inactive
/// devices, which ones did not). An unscripted command fails like a missing
/// binary would.
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scripts a response for the given command line.
    #[must_use]
    pub fn with_output(self, command: &str, output: CommandOutput) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(command.to_owned(), Scripted::Output(output));
        self
    }

    /// Scripts a timeout for the given command line.
    #[must_use]
    pub fn with_timeout(self, command: &str, seconds: u64) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(command.to_owned(), Scripted::TimedOut { seconds });
        self
    }

    /// Every command line run so far, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// True when a command line starting with the given prefix was run.
    #[must_use]
    pub fn invoked(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let rendered = command_line(program, args);
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(rendered.clone());

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&rendered)
            .cloned();

        match scripted {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::TimedOut { seconds }) => Err(CommandError::TimedOut {
                command: rendered,
                seconds,
            }),
            None => Err(CommandError::Spawn {
                command: rendered,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "command not scripted"),
            }),
        }
    }
}
