//! End-to-end build pipeline.
//!
//! Wires discovery, the compile batch and the linker together:
//!
//! ```text
//! source root ──► find_sources ──► WorkerPool ──► Linker ──► binary
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::compile::{BuildCallback, Linker, NoopCallback, TaskPlanner, WorkerPool};
use crate::config::BuildConfig;
use crate::discover::find_sources;
use crate::error::{Error, Result};
use crate::process::{ProcessRunner, SystemRunner};

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// The linked binary.
    pub binary: PathBuf,

    /// Object files that went into the binary, in completion order.
    pub artifacts: Vec<PathBuf>,

    /// Number of source files compiled.
    pub compiled: usize,

    /// Wall-clock time for the whole build.
    pub elapsed: Duration,
}

/// Runs a full build for one configuration.
pub struct Builder {
    config: BuildConfig,
    runner: Box<dyn ProcessRunner>,
    callback: Option<Arc<dyn BuildCallback>>,
}

impl Builder {
    /// Create a builder that runs real subprocesses.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            runner: Box::new(SystemRunner),
            callback: None,
        })
    }

    /// Replace the process runner.
    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Set the progress callback.
    pub fn set_callback(&mut self, callback: impl BuildCallback + 'static) {
        self.callback = Some(Arc::new(callback));
    }

    /// The configuration this builder runs with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the build.
    ///
    /// Returns `Ok(None)` when the source tree holds no source files; the
    /// compiler is not invoked in that case. The linker only runs if every
    /// compile task succeeded.
    pub fn run(&self) -> Result<Option<BuildSummary>> {
        let start = Instant::now();
        let callback: &dyn BuildCallback = self.callback.as_deref().unwrap_or(&NoopCallback);

        fs::create_dir_all(&self.config.output_root).map_err(|e| Error::DirectoryCreation {
            dir: self.config.output_root.clone(),
            source: e,
        })?;

        let sources = find_sources(&self.config.source_root)?;
        callback.on_sources_discovered(sources.len());

        if sources.is_empty() {
            tracing::info!(
                root = %self.config.source_root.display(),
                "no source files found, nothing to build"
            );
            return Ok(None);
        }

        self.runner.locate(&self.config.compiler)?;

        let pool = WorkerPool::new(self.config.jobs, sources.len())?;
        let planner = TaskPlanner::new(&self.config);
        let artifacts = pool.run(&sources, &planner, self.runner.as_ref(), callback)?;

        let linker = Linker::new(&self.config);
        callback.on_link_started(&linker.binary_path(), &linker.command_line(&artifacts));
        let binary = linker.link(&artifacts, self.runner.as_ref())?;
        callback.on_link_completed(&binary);

        let elapsed = start.elapsed();
        tracing::info!(
            binary = %binary.display(),
            compiled = sources.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "build finished"
        );

        Ok(Some(BuildSummary {
            binary,
            artifacts,
            compiled: sources.len(),
            elapsed,
        }))
    }
}
