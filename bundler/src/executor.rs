//! Abstraction for running external commands.
//!
//! The bundler shells out to the CMake toolchain; routing every invocation
//! through [`CommandExecutor`] lets tests script command outcomes without
//! spawning processes.

use crate::error::Result;
use camino::Utf8Path;
use std::process::{Command, Output};

/// Runs external commands and captures their output.
pub trait CommandExecutor {
    /// Run a command with arguments, optionally in a working directory, and
    /// return the captured output.
    ///
    /// The call blocks until the child process exits; there is no timeout or
    /// cancellation.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning or running the
    /// command. A nonzero exit status is not an error at this layer; callers
    /// inspect `Output::status`.
    fn run(&self, cmd: &str, args: &[&str], cwd: Option<&Utf8Path>) -> Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str], cwd: Option<&Utf8Path>) -> Result<Output> {
        let mut command = Command::new(cmd);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        Ok(command.output()?)
    }
}

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(all(any(test, feature = "test-support"), unix))]
#[must_use]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    std::process::ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(all(any(test, feature = "test-support"), windows))]
#[must_use]
pub fn exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    std::process::ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[cfg(any(test, feature = "test-support"))]
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[cfg(any(test, feature = "test-support"))]
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g. `cmake`).
    pub cmd: &'static str,
    /// The arguments the command must be invoked with.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

/// A stub implementation of [`CommandExecutor`] for testing.
///
/// Replays scripted responses in order and fails with
/// [`StubMismatch`](crate::error::BundlerError::StubMismatch) when an
/// invocation does not match the next expectation.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct StubExecutor {
    expected: std::cell::RefCell<std::collections::VecDeque<ExpectedCall>>,
}

#[cfg(any(test, feature = "test-support"))]
impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: std::cell::RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

#[cfg(any(test, feature = "test-support"))]
impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str], _cwd: Option<&Utf8Path>) -> Result<Output> {
        use crate::error::BundlerError;

        let mut expected = self.expected.borrow_mut();
        let Some(call) = expected.pop_front() else {
            return Err(BundlerError::StubMismatch {
                message: format!("unexpected invocation of {cmd} {args:?}"),
            });
        };

        if call.cmd != cmd || call.args.iter().map(String::as_str).ne(args.iter().copied()) {
            return Err(BundlerError::StubMismatch {
                message: format!(
                    "expected {} {:?}, got {cmd} {args:?}",
                    call.cmd, call.args
                ),
            });
        }

        call.result
    }
}
