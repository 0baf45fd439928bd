//! # runner: print, then (maybe) execute, an external command
//!
//! Every external invocation goes through [`run_command`], which renders the
//! command as a copy-pasteable shell line on stdout, skips it under dry-run,
//! and otherwise hands it to a [`CommandExecutor`].
//!
//! ## Mocking & Testing
//! - [`CommandExecutor`] is annotated for `mockall`, so orchestration code can
//!   be tested without spawning anything.
//! - [`SystemExecutor`] is the real implementation; the child inherits the
//!   parent's stdio so the tool's own diagnostics reach the user as-is.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, error, info, warn};

use crate::error::DeployError;

/// Ordered command tokens, program first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    tokens: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.tokens.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    pub fn args_slice(&self) -> &[String] {
        &self.tokens[1..]
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Value following `flag`, if the flag is present.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.tokens
            .iter()
            .position(|t| t == flag)
            .and_then(|i| self.tokens.get(i + 1))
            .map(String::as_str)
    }
}

/// Tokens joined by spaces, each POSIX-quoted where needed.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            // Only NUL bytes are unquotable; print those raw.
            let quoted = shlex::try_quote(token).unwrap_or_else(|_| token.as_str().into());
            f.write_str(&quoted)?;
        }
        Ok(())
    }
}

/// How an executed command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Succeeded,
    Failed { code: i32 },
}

/// Runs a command to completion.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Spawn the command and wait for it to exit. Only launch failures are errors;
    /// a non-zero exit is reported through [`CommandStatus::Failed`].
    async fn execute(&self, command: &CommandLine) -> Result<CommandStatus, DeployError>;
}

/// Executes commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn execute(&self, command: &CommandLine) -> Result<CommandStatus, DeployError> {
        let status = tokio::process::Command::new(command.program())
            .args(command.args_slice())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| {
                error!(error = ?e, program = command.program(), "Failed to launch process");
                DeployError::Spawn {
                    program: command.program().to_string(),
                    source: e,
                }
            })?;

        if status.success() {
            return Ok(CommandStatus::Succeeded);
        }
        match status.code() {
            Some(code) => Ok(CommandStatus::Failed { code }),
            None => {
                warn!(program = command.program(), ?status, "Process terminated by signal");
                Ok(CommandStatus::Failed { code: 1 })
            }
        }
    }
}

/// Print `command`, then execute it unless `dry_run` is set.
///
/// A non-zero exit becomes [`DeployError::CommandFailed`] carrying the
/// child's exit code; callers propagate it and stop.
pub async fn run_command<E>(
    executor: &E,
    command: &CommandLine,
    dry_run: bool,
) -> Result<(), DeployError>
where
    E: CommandExecutor + ?Sized,
{
    println!("→ {command}");
    if dry_run {
        debug!(command = %command, "Dry run, command not executed");
        return Ok(());
    }

    match executor.execute(command).await? {
        CommandStatus::Succeeded => {
            info!(command = %command, "Command succeeded");
            Ok(())
        }
        CommandStatus::Failed { code } => {
            error!(command = %command, code, "Command exited with non-zero code");
            Err(DeployError::CommandFailed {
                command: command.to_string(),
                code,
            })
        }
    }
}
