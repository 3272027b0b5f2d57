//! Error mapping guide:
//! - Builder-side problems (bad flag value, removing a missing token) fail fast
//!   before any process is spawned.
//! - Spawn failures and timeouts are errors; a runtime that ran and exited
//!   non-zero is NOT an error — it comes back as a `CommandOutput` with
//!   `failed()` true.
//! - Map io::ErrorKind::NotFound to exit code 127; all others to 1.

use std::fmt;
use std::io;
use std::time::Duration;

/// Failure raised by an option builder before execution.
#[derive(Debug, PartialEq, Eq)]
pub enum OptionError {
    /// `remove` was asked for a token the set does not contain.
    TokenNotFound(String),
    /// A named flag method received a value outside its documented range.
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::TokenNotFound(tok) => {
                write!(f, "option token not found: {tok}")
            }
            OptionError::InvalidValue {
                flag,
                value,
                reason,
            } => {
                write!(f, "invalid value {value:?} for {flag}: {reason}")
            }
        }
    }
}

impl std::error::Error for OptionError {}

/// Failure raised by the command executor.
///
/// Distinguishes "the runtime binary could not be started" from "the runtime
/// ran and reported failure": only the former surfaces here. Non-zero exits
/// travel back inside [`crate::CommandOutput`].
#[derive(Debug)]
pub enum ExecError {
    /// The child process could not be spawned (binary absent, not executable).
    Spawn { program: String, source: io::Error },
    /// Waiting on or reading from the child failed after a successful spawn.
    Wait(io::Error),
    /// The child outlived the configured timeout and was killed.
    Timeout { program: String, timeout: Duration },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Spawn { program, source } => {
                write!(f, "failed to spawn {program}: {source}")
            }
            ExecError::Wait(e) => write!(f, "failed waiting for child process: {e}"),
            ExecError::Timeout { program, timeout } => {
                write!(f, "{program} timed out after {timeout:?} and was killed")
            }
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Spawn { source, .. } => Some(source),
            ExecError::Wait(e) => Some(e),
            ExecError::Timeout { .. } => None,
        }
    }
}

impl ExecError {
    /// True when the underlying cause is a missing binary.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExecError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

/// Convert ExecError to exit code (parity with io::Error mapping).
pub fn exit_code_for_exec_error(e: &ExecError) -> u8 {
    match e {
        ExecError::Spawn { source, .. } => exit_code_for_io_error(source),
        ExecError::Wait(ioe) => exit_code_for_io_error(ioe),
        ExecError::Timeout { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        let nf = io::Error::new(io::ErrorKind::NotFound, "nope");
        assert_eq!(exit_code_for_io_error(&nf), 127);
        let perm = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        assert_eq!(exit_code_for_io_error(&perm), 1);
    }

    #[test]
    fn test_spawn_not_found_detection() {
        let e = ExecError::Spawn {
            program: "apptainer".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "nope"),
        };
        assert!(e.is_not_found());
        assert_eq!(exit_code_for_exec_error(&e), 127);

        let t = ExecError::Timeout {
            program: "apptainer".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(!t.is_not_found());
        assert_eq!(exit_code_for_exec_error(&t), 1);
    }
}
