//! Compile task planning.
//!
//! Turns one discovered source file into a [`CompileTask`]: the object path
//! that mirrors the file's position under the source root, and the argument
//! vector for the compiler.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BuildConfig, OBJECT_EXTENSION};
use crate::error::{Error, Result};
use crate::process::command_line;

/// A single source file ready to be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTask {
    /// Source file as discovered.
    pub source: PathBuf,

    /// Object file the compiler writes.
    pub object: PathBuf,

    /// Full compiler argument vector. Paths are kept as raw OS strings.
    pub args: Vec<OsString>,
}

impl CompileTask {
    /// Command line for display, e.g. in verbose output.
    pub fn command_line(&self, program: &str) -> String {
        command_line(program, &self.args)
    }
}

/// Derives compile tasks from source paths.
///
/// Flag tokens and include arguments are computed once and shared by every
/// task the planner produces.
pub struct TaskPlanner<'a> {
    config: &'a BuildConfig,
    flag_tokens: Vec<OsString>,
    include_args: Vec<OsString>,
}

impl<'a> TaskPlanner<'a> {
    /// Create a planner for the given configuration.
    pub fn new(config: &'a BuildConfig) -> Self {
        let mut include_args: Vec<OsString> = config
            .include_dirs
            .iter()
            .map(|dir| include_arg(dir))
            .collect();
        include_args.push(include_arg(&config.source_root));

        Self {
            config,
            flag_tokens: config.flag_tokens().into_iter().map(OsString::from).collect(),
            include_args,
        }
    }

    /// Compiler program the planned tasks are meant for.
    pub fn program(&self) -> &str {
        &self.config.compiler
    }

    /// Plan the compile task for `source`, creating its object directory.
    pub fn plan(&self, source: &Path) -> Result<CompileTask> {
        let object = object_path(source, &self.config.source_root, &self.config.output_root)?;

        if let Some(dir) = object.parent() {
            fs::create_dir_all(dir).map_err(|e| Error::DirectoryCreation {
                dir: dir.to_path_buf(),
                source: e,
            })?;
        }

        let source_dir = source.parent().unwrap_or(Path::new(""));

        let mut args = Vec::with_capacity(4 + self.flag_tokens.len() + self.include_args.len() + 1);
        args.push(OsString::from("-c"));
        args.push(source.as_os_str().to_owned());
        args.push(OsString::from("-o"));
        args.push(object.as_os_str().to_owned());
        args.extend(self.flag_tokens.iter().cloned());
        args.extend(self.include_args.iter().cloned());
        args.push(include_arg(source_dir));

        Ok(CompileTask {
            source: source.to_path_buf(),
            object,
            args,
        })
    }
}

/// Derive the object path for `source`.
///
/// `src/a/b.c` under source root `src` and output root `build` becomes
/// `build/a/b.o`. When the source root is the file itself, the object lands
/// directly under the output root. Pure; touches no filesystem state.
pub fn object_path(source: &Path, source_root: &Path, output_root: &Path) -> Result<PathBuf> {
    let resolution_error = || Error::PathResolution {
        path: source.to_path_buf(),
        root: source_root.to_path_buf(),
    };

    let relative = source
        .strip_prefix(source_root)
        .map_err(|_| resolution_error())?;
    let name = source.file_name().ok_or_else(resolution_error)?;
    let dir = relative.parent().unwrap_or(Path::new(""));

    Ok(output_root.join(dir).join(name).with_extension(OBJECT_EXTENSION))
}

fn include_arg(dir: &Path) -> OsString {
    let mut arg = OsString::from("-I");
    arg.push(dir);
    arg
}
