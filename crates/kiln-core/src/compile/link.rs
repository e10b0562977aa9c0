//! Linker stage.
//!
//! Links every artifact of a fully successful batch into the final binary.
//! The compiler flag string is applied again at link time.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::error::{Error, ProcessError, Result};
use crate::process::{ProcessRunner, command_line};

/// Links object files into the output binary.
pub struct Linker<'a> {
    config: &'a BuildConfig,
}

impl<'a> Linker<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Path of the binary this linker produces.
    pub fn binary_path(&self) -> PathBuf {
        self.config.binary_path()
    }

    /// Linker argument vector: output, artifacts, then the compile flags.
    pub fn args(&self, artifacts: &[PathBuf]) -> Vec<OsString> {
        let mut args = Vec::with_capacity(2 + artifacts.len());
        args.push(OsString::from("-o"));
        args.push(self.binary_path().into_os_string());
        args.extend(artifacts.iter().map(|a| a.as_os_str().to_owned()));
        args.extend(self.config.flag_tokens().into_iter().map(OsString::from));
        args
    }

    /// Command line for display.
    pub fn command_line(&self, artifacts: &[PathBuf]) -> String {
        command_line(&self.config.compiler, &self.args(artifacts))
    }

    /// Run the linker. Returns the path of the produced binary.
    pub fn link(&self, artifacts: &[PathBuf], runner: &dyn ProcessRunner) -> Result<PathBuf> {
        let binary = self.binary_path();
        let program = self.config.compiler.as_str();

        tracing::info!(
            binary = %binary.display(),
            objects = artifacts.len(),
            "linking"
        );

        let output = runner.execute(program, &self.args(artifacts)).map_err(|e| {
            link_error(
                &binary,
                ProcessError::Spawn {
                    program: program.to_string(),
                    source: e,
                },
            )
        })?;

        if !output.success {
            return Err(link_error(
                &binary,
                ProcessError::Failed {
                    program: program.to_string(),
                    code: output.code,
                    output: output.output,
                },
            ));
        }

        Ok(binary)
    }
}

fn link_error(binary: &Path, source: ProcessError) -> Error {
    Error::Link {
        binary: binary.to_path_buf(),
        source,
    }
}
