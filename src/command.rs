//! External command execution
//!
//! Every handler reaches kvas (and a few system tools) through the
//! `CommandRunner` trait so tests can substitute canned output.

use crate::config::CommandConfig;
use crate::error::CommandError;
use crate::parser::normalize::strip_ansi;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Combined stdout+stderr of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Output with ANSI sequences stripped and surrounding whitespace trimmed
    pub text: String,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Describe a failed run, `None` on success
    pub fn failure(&self) -> Option<String> {
        match self.code {
            Some(0) => None,
            Some(code) => Some(format!("exit status {}", code)),
            None => Some("terminated by signal".to_string()),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a shell command line and capture its output.
    ///
    /// Only a failure to obtain output is an `Err`; a non-zero exit is
    /// reported through `CommandOutput::code`.
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError>;
}

/// Runs commands through `<shell> -c`
pub struct ShellRunner {
    shell: String,
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(config: &CommandConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
        tracing::debug!("Running: {}", command);

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(CommandError::Spawn {
                    command: command.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(CommandError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                })
            }
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let result = CommandOutput {
            text: strip_ansi(&combined),
            code: output.status.code(),
        };
        if !result.success() {
            tracing::debug!("`{}` exited with {:?}", command, result.code);
        }
        Ok(result)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by exact command line
    #[derive(Default)]
    pub struct FakeRunner {
        responses: HashMap<String, Result<CommandOutput, String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_output(mut self, command: &str, text: &str, code: i32) -> Self {
            self.responses.insert(
                command.to_string(),
                Ok(CommandOutput {
                    text: text.to_string(),
                    code: Some(code),
                }),
            );
            self
        }

        /// Make `command` fail to spawn
        pub fn with_spawn_error(mut self, command: &str, message: &str) -> Self {
            self.responses
                .insert(command.to_string(), Err(message.to_string()));
            self
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, command: &str) -> Result<CommandOutput, CommandError> {
            self.calls.lock().unwrap().push(command.to_string());
            match self.responses.get(command) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(message)) => Err(CommandError::Spawn {
                    command: command.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, message.clone()),
                }),
                None => Ok(CommandOutput {
                    text: format!("sh: {}: not found", command),
                    code: Some(127),
                }),
            }
        }
    }
}
