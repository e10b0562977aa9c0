//! Error types for kiln-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for kiln-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kiln-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Build configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Walking the source tree failed.
    #[error("failed to walk source tree {}: {source}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A discovered file could not be expressed relative to the source root.
    #[error("failed to get relative path for {} under {}", path.display(), root.display())]
    PathResolution { path: PathBuf, root: PathBuf },

    /// An output directory could not be created.
    #[error("failed to create directory {}: {source}", dir.display())]
    DirectoryCreation {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiler failed on a single source file.
    #[error("compilation of {} failed: {source}", source_path.display())]
    Compile {
        source_path: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// At least one task in a compile batch failed.
    ///
    /// `failures` is never empty; its first entry is the representative error.
    #[error("{} of {total} compile tasks failed; first failure: {}", failures.len(), first_message(failures))]
    Batch { failures: Vec<Error>, total: usize },

    /// Linking failed after a fully successful compile batch.
    #[error("linking {} failed: {source}", binary.display())]
    Link {
        binary: PathBuf,
        #[source]
        source: ProcessError,
    },

    /// The worker thread pool could not be started.
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

/// Failure of an external compiler or linker process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started at all.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("`{program}` exited with {}\n{output}", exit_description(*code))]
    Failed {
        program: String,
        code: Option<i32>,
        output: String,
    },
}

impl ProcessError {
    /// Combined stdout/stderr captured from the process, if it ran.
    pub fn output(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { output, .. } => output,
        }
    }
}

impl Error {
    /// The representative error of a batch, or `self` for any other variant.
    pub fn first_failure(&self) -> &Error {
        match self {
            Self::Batch { failures, .. } => failures.first().unwrap_or(self),
            _ => self,
        }
    }

    /// Source file a task-level error originated from, if any.
    pub fn source_path(&self) -> Option<&PathBuf> {
        match self {
            Self::PathResolution { path, .. } => Some(path),
            Self::Compile { source_path, .. } => Some(source_path),
            Self::Batch { failures, .. } => failures.first().and_then(Error::source_path),
            _ => None,
        }
    }

    /// Render the error followed by a recovery hint where one applies.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n\nhint: {}", self, hint),
            None => self.to_string(),
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self.first_failure() {
            Self::Discovery { .. } => Some("check that --src points to a readable directory"),
            Self::DirectoryCreation { .. } => Some("check permissions on the --out directory"),
            Self::Compile {
                source: ProcessError::Spawn { .. },
                ..
            }
            | Self::Link {
                source: ProcessError::Spawn { .. },
                ..
            } => Some("make sure the compiler given by --cc is installed and on PATH"),
            Self::Config(_) => Some("run with --help to see accepted values"),
            _ => None,
        }
    }
}

fn first_message(failures: &[Error]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none recorded>".to_string())
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}
