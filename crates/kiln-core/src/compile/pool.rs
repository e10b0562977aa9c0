//! Bounded worker pool for compile batches.
//!
//! Runs every compile task of a batch on a dedicated Rayon thread pool with
//! one thread per admission slot. A slot is held from planning until the
//! compiler process exits, so no more than `jobs` compilers ever run at
//! once. The pool never starts more threads than there are tasks. Tasks are
//! independent and always run to completion; a failure never cancels its
//! siblings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use super::aggregate::{ResultAggregator, TaskResult};
use super::context::BuildCallback;
use super::task::TaskPlanner;
use crate::error::{Error, ProcessError, Result};
use crate::process::ProcessRunner;

/// Executes compile tasks with bounded concurrency.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    jobs: usize,
}

impl WorkerPool {
    /// Create a pool for `tasks` compilations, at most `jobs` at a time.
    ///
    /// Only `min(jobs, tasks)` threads are started, so a large `jobs` value
    /// costs nothing for a small batch.
    pub fn new(jobs: usize, tasks: usize) -> Result<Self> {
        if jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".to_string()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.min(tasks).max(1))
            .thread_name(|i| format!("kiln-worker-{}", i))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        Ok(Self { pool, jobs })
    }

    /// Number of worker threads, i.e. admission slots actually available.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compile every source and return the artifacts in completion order.
    ///
    /// Waits for all tasks. If any failed, returns [`Error::Batch`] holding
    /// every failure, the first recorded one first.
    pub fn run(
        &self,
        sources: &[PathBuf],
        planner: &TaskPlanner<'_>,
        runner: &dyn ProcessRunner,
        callback: &dyn BuildCallback,
    ) -> Result<Vec<PathBuf>> {
        let start = Instant::now();
        let aggregator = ResultAggregator::new(sources.len());

        self.pool.install(|| {
            sources
                .par_iter()
                .with_max_len(1)
                .for_each(|source| {
                    let result = compile_one(source, planner, runner, callback);
                    if let Err(ref error) = result {
                        tracing::warn!(
                            source = %source.display(),
                            "compile task failed: {}",
                            error
                        );
                        callback.on_task_failed(source, error);
                    }
                    aggregator.record(result);
                });
        });

        let outcome = aggregator.finish();
        match &outcome {
            Ok(artifacts) => tracing::info!(
                tasks = sources.len(),
                artifacts = artifacts.len(),
                jobs = self.jobs,
                threads = self.threads(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "compile batch succeeded"
            ),
            Err(error) => tracing::info!(
                tasks = sources.len(),
                jobs = self.jobs,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "compile batch failed: {}",
                error
            ),
        }
        outcome
    }
}

/// Plan and compile a single source file.
fn compile_one(
    source: &Path,
    planner: &TaskPlanner<'_>,
    runner: &dyn ProcessRunner,
    callback: &dyn BuildCallback,
) -> TaskResult {
    let task = planner.plan(source)?;
    let program = planner.program();

    callback.on_task_started(&task, program);
    tracing::debug!(
        source = %task.source.display(),
        object = %task.object.display(),
        "compiling"
    );

    let start = Instant::now();
    let output = runner
        .execute(program, &task.args)
        .map_err(|e| Error::Compile {
            source_path: task.source.clone(),
            source: ProcessError::Spawn {
                program: program.to_string(),
                source: e,
            },
        })?;

    if !output.success {
        return Err(Error::Compile {
            source_path: task.source,
            source: ProcessError::Failed {
                program: program.to_string(),
                code: output.code,
                output: output.output,
            },
        });
    }

    tracing::debug!(
        source = %task.source.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "compiled"
    );
    callback.on_task_completed(&task);

    Ok(task.object)
}
