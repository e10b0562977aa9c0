//! Build configuration.
//!
//! `BuildConfig` is constructed by the CLI layer and handed to the core
//! read-only. Everything the pipeline needs to know about a build lives here.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default compiler program.
pub const DEFAULT_COMPILER: &str = "gcc";

/// Default compiler flags: common warnings, treated as errors.
pub const DEFAULT_FLAGS: &str = "-Wall -Werror";

/// Default number of concurrent compile jobs.
pub const DEFAULT_JOBS: usize = 4;

/// Source file suffix, matched case-insensitively.
pub const SOURCE_EXTENSION: &str = "c";

/// Object file suffix.
pub const OBJECT_EXTENSION: &str = "o";

/// Configuration for one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Root of the source tree to discover files in.
    pub source_root: PathBuf,

    /// Root of the output tree for objects and the final binary.
    pub output_root: PathBuf,

    /// Extra include directories, passed as `-I` in order.
    pub include_dirs: Vec<PathBuf>,

    /// Whitespace-separated compiler flags (reused when linking).
    pub flags: String,

    /// File name of the linked binary, placed under `output_root`.
    pub binary_name: String,

    /// Maximum number of compiler processes running at once.
    pub jobs: usize,

    /// Print per-task commands.
    pub verbose: bool,

    /// Compiler program used for both compiling and linking.
    pub compiler: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            output_root: PathBuf::from("build"),
            include_dirs: Vec::new(),
            flags: DEFAULT_FLAGS.to_string(),
            binary_name: "program".to_string(),
            jobs: DEFAULT_JOBS,
            verbose: false,
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }
}

impl BuildConfig {
    /// Create a config for the given source and output roots, other fields default.
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Parse a comma-separated include list, dropping empty entries.
    pub fn parse_include_list(list: &str) -> Vec<PathBuf> {
        list.split(',')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    /// Check the invariants the core relies on.
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }
        if self.binary_name.trim().is_empty() {
            return Err(Error::Config("binary name must not be empty".to_string()));
        }
        if self.binary_name.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "binary name must be a file name, got {:?}",
                self.binary_name
            )));
        }
        if self.compiler.trim().is_empty() {
            return Err(Error::Config("compiler must not be empty".to_string()));
        }
        Ok(())
    }

    /// Compiler flags split on whitespace.
    pub fn flag_tokens(&self) -> Vec<String> {
        self.flags.split_whitespace().map(str::to_string).collect()
    }

    /// Path of the final linked binary.
    pub fn binary_path(&self) -> PathBuf {
        self.output_root.join(&self.binary_name)
    }
}
