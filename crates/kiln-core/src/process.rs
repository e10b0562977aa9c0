//! External process execution.
//!
//! The compiler is an opaque subprocess. Everything the pipeline needs from
//! it goes through [`ProcessRunner`], so scheduling and aggregation can be
//! exercised with a fake runner that never spawns anything.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Whether the process exited successfully.
    pub success: bool,

    /// Exit code, `None` if terminated by a signal.
    pub code: Option<i32>,

    /// Combined stdout and stderr.
    pub output: String,
}

impl ProcessOutput {
    /// A successful run with the given output.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            output: output.into(),
        }
    }

    /// A failed run with the given exit code and output.
    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            output: output.into(),
        }
    }
}

/// Runs an external program and captures its output.
///
/// `Err` means the program could not be started. A program that started and
/// exited non-zero is `Ok` with `success == false`. Arguments are passed
/// through untouched, so paths that are not valid UTF-8 survive.
pub trait ProcessRunner: Send + Sync {
    fn execute(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput>;

    /// Check that `program` can be run before any work is scheduled.
    fn locate(&self, _program: &str) -> Result<()> {
        Ok(())
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Arc<T> {
    fn execute(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
        (**self).execute(program, args)
    }

    fn locate(&self, program: &str) -> Result<()> {
        (**self).locate(program)
    }
}

/// Runner backed by real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutput> {
        let output = Command::new(program).args(args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            output: combined,
        })
    }

    fn locate(&self, program: &str) -> Result<()> {
        let path = resolve_program(program)?;
        tracing::debug!(program, path = %path.display(), "resolved compiler");
        Ok(())
    }
}

/// Locate the compiler program.
///
/// Bare names are looked up in `PATH`; anything containing a path separator
/// is taken as-is and only checked for existence.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    if program.contains(['/', std::path::MAIN_SEPARATOR]) {
        let path = PathBuf::from(program);
        if path.exists() {
            return Ok(path);
        }
        return Err(Error::Config(format!("compiler not found: {}", path.display())));
    }

    which::which(program)
        .map_err(|_| Error::Config(format!("compiler `{}` not found in PATH", program)))
}

/// Render a program and its arguments as a single command line for display.
///
/// Lossy: non-UTF-8 bytes are replaced. Never feed the result back to a
/// process.
pub fn command_line(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        let arg = arg.to_string_lossy();
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg);
            line.push('"');
        } else {
            line.push_str(&arg);
        }
    }
    line
}
