use std::fmt;
use std::path::PathBuf;

/// Exit code used when the external CLI cannot be launched at all.
pub const EXIT_SPAWN_FAILED: i32 = 127;

/// Everything that can stop a deploy run.
///
/// Each variant maps to the process exit code via [`DeployError::exit_code`];
/// `main` is the only place that turns it into an actual exit.
#[derive(Debug)]
pub enum DeployError {
    /// The local build output directory does not exist.
    MissingSource(PathBuf),
    /// The external program could not be started.
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// The external program ran and exited unsuccessfully.
    CommandFailed { command: String, code: i32 },
}

impl DeployError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DeployError::MissingSource(_) => 1,
            DeployError::Spawn { .. } => EXIT_SPAWN_FAILED,
            DeployError::CommandFailed { code, .. } => *code,
        }
    }
}

impl fmt::Display for DeployError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::MissingSource(path) => {
                write!(f, "dist folder not found: {}", path.display())
            }
            DeployError::Spawn { program, source } => {
                write!(f, "failed to launch `{program}`: {source}")
            }
            DeployError::CommandFailed { command, code } => {
                write!(f, "command exited with code {code}: {command}")
            }
        }
    }
}

impl std::error::Error for DeployError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeployError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
